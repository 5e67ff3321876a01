use crate::error::{QueueError, Result};
use crate::store::ListStore;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// An in-process [`ListStore`] with Redis list semantics.
///
/// Lists that become empty are dropped, just as Redis drops the key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl MemoryStore {
    /// An empty store with no lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a list, head first.
    pub async fn items(&self, key: &str) -> Vec<Vec<u8>> {
        let lists = self.lists.lock().await;
        lists
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn resolve(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then_some(resolved as usize)
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<u64> {
        let lists = self.lists.lock().await;
        Ok(lists.get(key).map_or(0, |list| list.len() as u64))
    }

    async fn push_tail(&self, key: &str, values: &[Vec<u8>]) -> Result<u64> {
        if values.is_empty() {
            return Err(QueueError::Store(
                "ERR wrong number of arguments for 'rpush' command".to_string(),
            ));
        }
        let mut lists = self.lists.lock().await;
        let list = lists.entry(key.to_string()).or_default();
        list.extend(values.iter().cloned());
        Ok(list.len() as u64)
    }

    async fn pop_head(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut lists = self.lists.lock().await;
        let Some(list) = lists.get_mut(key) else {
            return Ok(None);
        };
        let popped = list.pop_front();
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(popped)
    }

    async fn index(&self, key: &str, index: i64) -> Result<Option<Vec<u8>>> {
        let lists = self.lists.lock().await;
        Ok(lists
            .get(key)
            .and_then(|list| resolve(list.len(), index).map(|i| list[i].clone())))
    }

    async fn set_index(&self, key: &str, index: i64, value: &[u8]) -> Result<()> {
        let mut lists = self.lists.lock().await;
        let list = lists
            .get_mut(key)
            .ok_or_else(|| QueueError::Store("ERR no such key".to_string()))?;
        let i = resolve(list.len(), index)
            .ok_or_else(|| QueueError::Store("ERR index out of range".to_string()))?;
        list[i] = value.to_vec();
        Ok(())
    }

    async fn remove(&self, key: &str, count: i64, value: &[u8]) -> Result<u64> {
        let mut lists = self.lists.lock().await;
        let Some(list) = lists.get_mut(key) else {
            return Ok(0);
        };

        let limit = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs() as usize
        };
        let matches: Vec<usize> = if count < 0 {
            (0..list.len()).rev().filter(|&i| list[i] == value).take(limit).collect()
        } else {
            (0..list.len()).filter(|&i| list[i] == value).take(limit).collect()
        };

        let mut removed = 0;
        let mut position = 0;
        list.retain(|_| {
            let keep = !matches.contains(&position);
            position += 1;
            if !keep {
                removed += 1;
            }
            keep
        });
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(removed)
    }

    async fn count_matching(&self, key: &str, value: &[u8]) -> Result<u64> {
        let lists = self.lists.lock().await;
        Ok(lists.get(key).map_or(0, |list| {
            list.iter().filter(|item| item.as_slice() == value).count() as u64
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut lists = self.lists.lock().await;
        Ok(lists.remove(key).is_some())
    }
}
