use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout error after {0}ms")]
    Timeout(u64),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid connection URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Index {index} does not exist in queue {queue}")]
    IndexOutOfRange { queue: String, index: i64 },

    #[error("Failed to add {count} task(s) to queue {queue}")]
    NotAdded { queue: String, count: usize },

    #[error("Failed to remove item {index} from queue {queue}")]
    RemoveUnconfirmed { queue: String, index: i64 },

    #[error("Failed to re-add task to queue {queue} after decode failure: {reason}")]
    RequeueFailed { queue: String, reason: String },
}

/// Broad classes of failure a queue operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The store could not be reached or rejected a command.
    Transport,
    /// A write did not do what was asked (nothing added, nothing removed, bad index).
    Logical,
    /// Stored bytes did not match the requested shape.
    Decode,
    /// The configuration was unusable; no queue command was sent.
    Config,
}

impl QueueError {
    /// Which of the four failure families this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            QueueError::Connection(_)
            | QueueError::Timeout(_)
            | QueueError::Redis(_)
            | QueueError::Store(_) => ErrorCategory::Transport,
            QueueError::IndexOutOfRange { .. }
            | QueueError::NotAdded { .. }
            | QueueError::RemoveUnconfirmed { .. }
            | QueueError::RequeueFailed { .. } => ErrorCategory::Logical,
            QueueError::Serialization(_) | QueueError::Decode(_) => ErrorCategory::Decode,
            QueueError::Validation(_) | QueueError::InvalidUri(_) => ErrorCategory::Config,
        }
    }

    /// Whether the failure is transient and the same call might succeed later.
    ///
    /// The queue never retries on its own; this is for callers that want to.
    pub fn is_retryable(&self) -> bool {
        match self {
            QueueError::Connection(_) | QueueError::Timeout(_) => true,
            QueueError::Redis(e) => {
                e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
