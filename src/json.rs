use crate::{
    config::Config,
    encoding::Json,
    error::{QueueError, Result},
    list::TaskList,
    store::{ListStore, RedisStore},
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A FIFO queue of JSON documents stored in one Redis list.
///
/// Each item is stored as its own JSON encoding and decoded into whatever
/// shape the reader asks for. Because comparisons are byte-for-byte,
/// [`remove`](Self::remove) and [`has`](Self::has) only match when the value
/// serializes exactly as it was stored, field order and number formatting
/// included.
///
/// # Decode failures
///
/// When a popped item does not decode into the requested type and retry is
/// enabled (the default), the untouched bytes are pushed back onto the tail
/// and the call succeeds, leaving the target unchanged. With retry disabled
/// the decode error is returned and the item is gone.
///
/// # Examples
///
/// ```no_run
/// use redis_task_queue::{Config, JsonQueue};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct Resize {
///     image: String,
///     width: u32,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), redis_task_queue::QueueError> {
///     let queue = JsonQueue::connect("resize", Config::default()).await?;
///     queue.add([Resize { image: "cat.png".into(), width: 640 }]).await?;
///
///     let mut next = Resize::default();
///     queue.pop(&mut next).await?;
///     println!("resizing {} to {}px", next.image, next.width);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct JsonQueue {
    list: TaskList,
    retry: bool,
}

impl JsonQueue {
    /// Connects to Redis and returns a handle on the list called `name`.
    ///
    /// `config.no_retry` turns off requeueing of undecodable items.
    pub async fn connect(name: impl Into<String>, config: Config) -> Result<Self> {
        let store = RedisStore::connect(&config).await?;
        Ok(Self::with_store(name, Arc::new(store)).retry_on_decode_failure(!config.no_retry))
    }

    /// Builds a queue over an existing store handle, with retry enabled.
    pub fn with_store(name: impl Into<String>, store: Arc<dyn ListStore>) -> Self {
        Self {
            list: TaskList::new(name, store),
            retry: true,
        }
    }

    /// Sets whether items that fail to decode are put back instead of dropped.
    ///
    /// Enabled by default for [`JsonQueue::with_store`]; [`JsonQueue::connect`]
    /// sets it to `!config.no_retry`. A failed `pop` requeues at the tail, a
    /// failed `get` rewrites the item at its index.
    pub fn retry_on_decode_failure(mut self, enabled: bool) -> Self {
        self.retry = enabled;
        self
    }

    /// Whether undecodable items are put back.
    pub fn retries_on_decode_failure(&self) -> bool {
        self.retry
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

    /// Whether at least one stored item equals the encoding of `value`.
    ///
    /// Best-effort: encode and store failures both answer `false`.
    pub async fn has<T: Serialize + ?Sized>(&self, value: &T) -> bool {
        let encoded = match Json::encode(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                debug!(queue = %self.name(), error = %e, "membership check could not encode value");
                return false;
            }
        };
        match self.list.contains(&encoded).await {
            Ok(found) => found,
            Err(e) => {
                debug!(queue = %self.name(), error = %e, "membership check failed");
                false
            }
        }
    }

    /// Appends each item as its own element, in order, in one atomic push.
    ///
    /// Every item is encoded before anything is written, so an encode failure
    /// leaves the queue untouched. An empty input is a no-op.
    ///
    /// # Errors
    ///
    /// * [`QueueError::Serialization`] if any item cannot be encoded
    /// * [`QueueError::NotAdded`] if the store reports nothing was written
    pub async fn add<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let encoded = items
            .into_iter()
            .map(|item| Json::encode(&item))
            .collect::<Result<Vec<_>>>()?;
        self.list.append(encoded).await
    }

    /// Removes the head item and decodes it into `target`.
    ///
    /// An empty queue is a quiet no-op: `Ok(())` with `target` untouched. Check
    /// [`size`](Self::size) first if the two cases must be told apart.
    ///
    /// # Errors
    ///
    /// * [`QueueError::Decode`] when the item does not fit `T` and retry is off
    /// * [`QueueError::RequeueFailed`] when retry is on but the item could not
    ///   be put back
    /// * transport errors from the store
    pub async fn pop<T: DeserializeOwned>(&self, target: &mut T) -> Result<()> {
        let Some(popped) = self.list.pop().await? else {
            return Ok(());
        };

        match Json::decode(&popped) {
            Ok(value) => {
                *target = value;
                Ok(())
            }
            Err(e) if self.retry => {
                warn!(queue = %self.name(), error = %e, "popped task did not decode, re-adding at tail");
                self.list
                    .append(vec![popped])
                    .await
                    .map_err(|e| self.requeue_failed(e))
            }
            Err(e) => {
                warn!(queue = %self.name(), error = %e, "popped task did not decode and was dropped");
                Err(e)
            }
        }
    }

    /// Removes and returns the head item without decoding it.
    pub async fn pop_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.list.pop().await
    }

    /// Removes every item whose encoding equals that of `value`.
    pub async fn remove<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let encoded = Json::encode(value)?;
        self.list.remove(&encoded).await?;
        Ok(())
    }

    /// Deletes the whole list.
    pub async fn clear(&self) -> Result<()> {
        self.list.clear().await
    }

    /// Decodes the item at `index` into `target` without removing it.
    ///
    /// On a decode failure with retry enabled the item is written back at the
    /// same index, so its position is kept, and the call succeeds.
    ///
    /// # Errors
    ///
    /// * [`QueueError::IndexOutOfRange`] if nothing is stored at `index`
    /// * [`QueueError::Decode`] when the item does not fit `T` and retry is off
    /// * [`QueueError::RequeueFailed`] if the in-place rewrite fails
    pub async fn get<T: DeserializeOwned>(&self, index: i64, target: &mut T) -> Result<()> {
        let value = self
            .list
            .get(index)
            .await?
            .ok_or_else(|| QueueError::IndexOutOfRange {
                queue: self.name().to_string(),
                index,
            })?;

        match Json::decode(&value) {
            Ok(decoded) => {
                *target = decoded;
                Ok(())
            }
            Err(e) if self.retry => {
                warn!(queue = %self.name(), index, error = %e, "task did not decode, rewriting in place");
                self.list
                    .set(index, &value)
                    .await
                    .map_err(|e| self.requeue_failed(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Removes exactly the item at `index`.
    ///
    /// Not safe against concurrent writers on the same queue; see the crate
    /// docs.
    pub async fn remove_index(&self, index: i64) -> Result<()> {
        self.list.remove_index(index).await
    }

    fn requeue_failed(&self, cause: QueueError) -> QueueError {
        QueueError::RequeueFailed {
            queue: self.name().to_string(),
            reason: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::{Deserialize, Deserializer};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Value {
        string: String,
        number: i64,
        bool: bool,
    }

    /// Serializes normally but never decodes.
    #[derive(Debug, Serialize)]
    struct RetryValue {
        value: String,
    }

    impl<'de> Deserialize<'de> for RetryValue {
        fn deserialize<D: Deserializer<'de>>(_: D) -> std::result::Result<Self, D::Error> {
            Err(serde::de::Error::custom("wrong"))
        }
    }

    fn queue(store: &Arc<MemoryStore>) -> JsonQueue {
        JsonQueue::with_store("json", store.clone())
    }

    fn value(n: i64) -> Value {
        Value {
            string: format!("string{}", n),
            number: n,
            bool: n % 2 == 1,
        }
    }

    #[tokio::test]
    async fn test_add_and_pop_in_order() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(1), value(2)]).await.unwrap();
        queue.add([value(3)]).await.unwrap();

        let mut popped = Value::default();
        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, value(1));
        assert_eq!(queue.size().await, 2);

        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, value(2));
        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, value(3));
        assert_eq!(queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_items_are_stored_individually() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add(["a", "b"]).await.unwrap();

        assert_eq!(
            store.items("json").await,
            vec![br#""a""#.to_vec(), br#""b""#.to_vec()]
        );
    }

    #[tokio::test]
    async fn test_pop_empty_leaves_target() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);

        let mut target = value(9);
        queue.pop(&mut target).await.unwrap();
        assert_eq!(target, value(9));
    }

    #[tokio::test]
    async fn test_pop_with_retry_requeues() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue
            .add([RetryValue {
                value: "value".to_string(),
            }])
            .await
            .unwrap();

        let mut popped: Option<RetryValue> = None;
        queue.pop(&mut popped).await.unwrap();
        assert!(popped.is_none());
        assert_eq!(queue.size().await, 1);
    }

    #[tokio::test]
    async fn test_retry_moves_item_to_tail() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([r#"not a value"#]).await.unwrap();
        queue.add([value(1)]).await.unwrap();

        let mut popped = Value::default();
        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, Value::default());

        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, value(1));

        let leftover = queue.pop_bytes().await.unwrap();
        assert_eq!(leftover, Some(br#""not a value""#.to_vec()));
    }

    #[tokio::test]
    async fn test_pop_without_retry_drops() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store).retry_on_decode_failure(false);
        assert!(!queue.retries_on_decode_failure());
        queue
            .add([RetryValue {
                value: "value".to_string(),
            }])
            .await
            .unwrap();

        let mut popped: Option<RetryValue> = None;
        let result = queue.pop(&mut popped).await;
        assert!(matches!(result, Err(QueueError::Decode(_))));
        assert_eq!(queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_has() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(1)]).await.unwrap();

        assert!(queue.has(&value(1)).await);
        assert!(!queue.has(&value(2)).await);
        assert!(!queue.has("string1").await);
    }

    #[tokio::test]
    async fn test_has_with_unencodable_value() {
        use std::collections::HashMap;

        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        let mut map = HashMap::new();
        map.insert(vec![1u8], "non-string keys cannot be JSON");
        assert!(!queue.has(&map).await);
        assert!(matches!(
            queue.add([map]).await,
            Err(QueueError::Serialization(_))
        ));
        assert_eq!(queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(1), value(2), value(1)]).await.unwrap();

        queue.remove(&value(1)).await.unwrap();
        assert_eq!(queue.size().await, 1);

        let mut popped = Value::default();
        queue.pop(&mut popped).await.unwrap();
        assert_eq!(popped, value(2));
    }

    #[tokio::test]
    async fn test_get() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(0), value(1)]).await.unwrap();

        let mut got = Value::default();
        queue.get(1, &mut got).await.unwrap();
        assert_eq!(got, value(1));
        assert_eq!(queue.size().await, 2);

        assert!(matches!(
            queue.get(2, &mut got).await,
            Err(QueueError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_decode_failure_keeps_position() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(0), value(1), value(2)]).await.unwrap();
        let before = store.items("json").await;

        let mut wrong: Option<RetryValue> = None;
        queue.get(1, &mut wrong).await.unwrap();
        assert!(wrong.is_none());
        assert_eq!(store.items("json").await, before);

        let strict = queue.clone().retry_on_decode_failure(false);
        assert!(matches!(
            strict.get(1, &mut wrong).await,
            Err(QueueError::Decode(_))
        ));
        assert_eq!(store.items("json").await, before);
    }

    #[tokio::test]
    async fn test_remove_index() {
        let store = Arc::new(MemoryStore::new());
        let queue = queue(&store);
        queue.add([value(0), value(1), value(0)]).await.unwrap();

        queue.remove_index(2).await.unwrap();
        assert_eq!(queue.size().await, 2);

        let mut got = Value::default();
        queue.get(0, &mut got).await.unwrap();
        assert_eq!(got, value(0));
        queue.get(1, &mut got).await.unwrap();
        assert_eq!(got, value(1));

        assert!(queue.remove_index(2).await.is_err());
        assert_eq!(queue.size().await, 2);
    }
}
