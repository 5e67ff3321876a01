//! # Redis Task Queue
//!
//! FIFO task queues backed by a single Redis list per queue. Producers and
//! consumers only need to agree on the queue name: Redis is the one source of
//! truth and the only coordination point.
//!
//! Two flavours share the same ordering and removal rules:
//!
//! - [`BasicQueue`] stores plain strings.
//! - [`JsonQueue`] stores JSON documents and decodes them into the caller's
//!   type, putting undecodable items back instead of losing them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redis_task_queue::{BasicQueue, ConfigBuilder};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new()
//!         .host("localhost:6379")
//!         .timeout(Duration::from_secs(3))
//!         .build();
//!     let queue = BasicQueue::connect("jobs", config).await?;
//!
//!     queue.add(["resize:cat.png", "resize:dog.png"]).await?;
//!     while let Some(task) = queue.pop().await {
//!         println!("working on {}", task);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Queues hold no in-process state beyond the store handle. Concurrent
//! `add` and `pop` calls are safe because each is a single atomic Redis
//! command. `remove_index` is not: it reads, rewrites and deletes in separate
//! commands, so callers removing by index under contention must serialize
//! access themselves.
//!
//! ## Errors
//!
//! Write paths return [`QueueError`]. A few reads are best-effort and map
//! failures to a neutral value instead: `size` reports 0, `has` reports
//! `false` and [`BasicQueue::pop`] reports `None`. The crate never retries a
//! store command; connection-level behaviour is left to the Redis driver and
//! the configured timeout.

pub mod basic;
pub mod config;
pub mod encoding;
pub mod error;
pub mod json;
mod list;
pub mod store;

pub use basic::BasicQueue;
pub use config::{Config, ConfigBuilder};
pub use error::{ErrorCategory, QueueError, Result};
pub use json::JsonQueue;
pub use store::{ListStore, MemoryStore, RedisStore};
