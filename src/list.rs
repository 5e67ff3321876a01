//! Byte-level list algorithms shared by both queue variants.

use crate::{
    encoding::index_marker,
    error::{QueueError, Result},
    store::ListStore,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct TaskList {
    name: String,
    store: Arc<dyn ListStore>,
}

impl TaskList {
    pub(crate) fn new(name: impl Into<String>, store: Arc<dyn ListStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn store(&self) -> &Arc<dyn ListStore> {
        &self.store
    }

    pub(crate) async fn size(&self) -> u64 {
        match self.store.len(&self.name).await {
            Ok(size) => size,
            Err(e) => {
                debug!(queue = %self.name, error = %e, "size lookup failed, reporting 0");
                0
            }
        }
    }

    /// Appends already-encoded items in one atomic push.
    pub(crate) async fn append(&self, items: Vec<Vec<u8>>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let added = self.store.push_tail(&self.name, &items).await?;
        if added == 0 {
            return Err(QueueError::NotAdded {
                queue: self.name.clone(),
                count: items.len(),
            });
        }
        Ok(())
    }

    pub(crate) async fn pop(&self) -> Result<Option<Vec<u8>>> {
        self.store.pop_head(&self.name).await
    }

    pub(crate) async fn get(&self, index: i64) -> Result<Option<Vec<u8>>> {
        self.store.index(&self.name, index).await
    }

    pub(crate) async fn set(&self, index: i64, value: &[u8]) -> Result<()> {
        self.store.set_index(&self.name, index, value).await
    }

    /// Removes every element equal to `value`.
    pub(crate) async fn remove(&self, value: &[u8]) -> Result<u64> {
        self.store.remove(&self.name, 0, value).await
    }

    pub(crate) async fn contains(&self, value: &[u8]) -> Result<bool> {
        Ok(self.store.count_matching(&self.name, value).await? > 0)
    }

    pub(crate) async fn clear(&self) -> Result<()> {
        self.store.delete(&self.name).await?;
        Ok(())
    }

    /// Removes exactly the element at `index`.
    ///
    /// The store can only delete by value, so the element is first overwritten
    /// in place with its base64 form and then that marker is removed once. The
    /// two steps are separate commands: a concurrent pop or push on the same
    /// list between them can shift indices. If another element already equals
    /// the marker text, the first of the two in list order is the one removed.
    pub(crate) async fn remove_index(&self, index: i64) -> Result<()> {
        let value = self
            .store
            .index(&self.name, index)
            .await?
            .ok_or_else(|| QueueError::IndexOutOfRange {
                queue: self.name.clone(),
                index,
            })?;

        let marker = index_marker(&value);
        self.store.set_index(&self.name, index, &marker).await?;

        let removed = self.store.remove(&self.name, 1, &marker).await?;
        if removed == 0 {
            return Err(QueueError::RemoveUnconfirmed {
                queue: self.name.clone(),
                index,
            });
        }
        Ok(())
    }
}
