//! The remote ordered-list primitives a queue is built on.

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use crate::error::Result;
use async_trait::async_trait;

/// A server-side ordered list of byte strings, addressed by key.
///
/// Implementations must keep a single global order across all clients and
/// make each call atomic on its own. Indices follow Redis: `0` is the head and
/// negative values count back from the tail.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Liveness check.
    async fn ping(&self) -> Result<()>;

    /// Number of elements; an absent key is an empty list.
    async fn len(&self, key: &str) -> Result<u64>;

    /// Appends `values` at the tail in order and returns the list length
    /// afterwards. Zero means nothing was written.
    async fn push_tail(&self, key: &str, values: &[Vec<u8>]) -> Result<u64>;

    /// Removes and returns the head element.
    async fn pop_head(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Element at `index`, or `None` when out of range or the key is absent.
    async fn index(&self, key: &str, index: i64) -> Result<Option<Vec<u8>>>;

    /// Overwrites the element at `index`. Fails when out of range.
    async fn set_index(&self, key: &str, index: i64, value: &[u8]) -> Result<()>;

    /// Removes elements equal to `value` and returns how many went.
    ///
    /// `count > 0` removes up to `count` matches from the head, `count < 0`
    /// up to `|count|` from the tail, `0` removes every match.
    async fn remove(&self, key: &str, count: i64, value: &[u8]) -> Result<u64>;

    /// Number of elements equal to `value`.
    async fn count_matching(&self, key: &str, value: &[u8]) -> Result<u64>;

    /// Deletes the whole list. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;
}
