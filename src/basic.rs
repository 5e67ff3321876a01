use crate::{
    config::Config,
    encoding::Raw,
    error::Result,
    list::TaskList,
    store::{ListStore, RedisStore},
};
use std::sync::Arc;
use tracing::debug;

/// A FIFO queue of plain strings stored in one Redis list.
///
/// Items go in at the tail and come out at the head. Strings are stored as
/// their UTF-8 bytes with no encoding step.
///
/// # Examples
///
/// ```no_run
/// use redis_task_queue::{BasicQueue, Config};
///
/// #[tokio::main]
/// async fn main() -> Result<(), redis_task_queue::QueueError> {
///     let queue = BasicQueue::connect("emails", Config::default()).await?;
///
///     queue.add(["first", "second"]).await?;
///     assert_eq!(queue.pop().await.as_deref(), Some("first"));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BasicQueue {
    list: TaskList,
}

impl BasicQueue {
    /// Connects to Redis and returns a handle on the list called `name`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the server does not answer a
    /// liveness check within the configured timeout.
    pub async fn connect(name: impl Into<String>, config: Config) -> Result<Self> {
        let store = RedisStore::connect(&config).await?;
        Ok(Self::with_store(name, Arc::new(store)))
    }

    /// Builds a queue over an existing store handle.
    pub fn with_store(name: impl Into<String>, store: Arc<dyn ListStore>) -> Self {
        Self {
            list: TaskList::new(name, store),
        }
    }

    /// The key of the underlying list.
    pub fn name(&self) -> &str {
        self.list.name()
    }

    /// The store handle, shared with any clones of this queue.
    pub fn store(&self) -> &Arc<dyn ListStore> {
        self.list.store()
    }

    /// Number of queued items. Store errors, including an absent key, report 0.
    pub async fn size(&self) -> u64 {
        self.list.size().await
    }

    /// Removes and returns the head item.
    ///
    /// Returns `None` when the queue is empty and also when the store call
    /// fails; the error is logged, not returned.
    pub async fn pop(&self) -> Option<String> {
        match self.list.pop().await {
            Ok(popped) => popped.map(Raw::decode),
            Err(e) => {
                debug!(queue = %self.name(), error = %e, "pop failed, reporting empty");
                None
            }
        }
    }

    /// Appends `items` at the tail in the order given, atomically.
    ///
    /// An empty input is a no-op.
    ///
    /// # Errors
    ///
    /// * [`QueueError::NotAdded`](crate::QueueError::NotAdded) if the store
    ///   reports that nothing was written
    /// * transport errors from the store
    pub async fn add<I, S>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let encoded = items
            .into_iter()
            .map(|item| Raw::encode(item.as_ref()))
            .collect();
        self.list.append(encoded).await
    }

    /// Removes every occurrence of `item`. Missing items are not an error.
    pub async fn remove(&self, item: &str) -> Result<()> {
        self.list.remove(&Raw::encode(item)).await?;
        Ok(())
    }

    /// Deletes the whole list.
    pub async fn clear(&self) -> Result<()> {
        self.list.clear().await
    }

    /// Reads the item at `index` without removing it.
    ///
    /// An index past either end yields an empty string, which cannot be told
    /// apart from a stored empty string.
    pub async fn get(&self, index: i64) -> Result<String> {
        Ok(self
            .list
            .get(index)
            .await?
            .map(Raw::decode)
            .unwrap_or_default())
    }

    /// Removes exactly the item at `index`.
    ///
    /// Not safe against concurrent writers on the same queue; see the crate
    /// docs.
    ///
    /// # Errors
    ///
    /// * [`QueueError::IndexOutOfRange`](crate::QueueError::IndexOutOfRange)
    /// * [`QueueError::RemoveUnconfirmed`](crate::QueueError::RemoveUnconfirmed)
    ///   if the item was rewritten but its removal was not confirmed
    pub async fn remove_index(&self, index: i64) -> Result<()> {
        self.list.remove_index(index).await
    }
}
