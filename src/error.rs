//! Error types and retry policies for jstream operations.

use std::time::Duration;

/// Main error type for jstream operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// A chunk size of zero was supplied to a parallel configuration or a
    /// chunking operation
    #[error("chunksize must be greater than or equal to 1, got {0}")]
    InvalidChunkSize(usize),
    /// Custom error with message
    #[error("stream error: {0}")]
    Custom(String),
}

/// Result type for jstream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Retry policy for [`crate::concurrent::retry`]
#[derive(Debug, Clone)]
pub enum RetryPolicy {
    /// No retries
    None,
    /// Immediate retry up to max_retries
    Immediate { max_retries: usize },
    /// Fixed delay between retries
    Fixed { max_retries: usize, delay: Duration },
    /// Exponential backoff
    Exponential {
        max_retries: usize,
        initial_delay: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    /// Number of retries allowed after the first try.
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Immediate { max_retries } => *max_retries,
            RetryPolicy::Fixed { max_retries, .. } => *max_retries,
            RetryPolicy::Exponential { max_retries, .. } => *max_retries,
        }
    }

    /// Delay to wait before retry number `attempt` (zero-based), or `None`
    /// when the policy retries immediately.
    pub fn backoff_delay(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryPolicy::None | RetryPolicy::Immediate { .. } => None,
            RetryPolicy::Fixed { delay, .. } => Some(*delay),
            RetryPolicy::Exponential {
                initial_delay,
                multiplier,
                ..
            } => {
                let delay_ms = initial_delay.as_millis() as f64 * multiplier.powi(attempt as i32);
                Some(Duration::from_millis(delay_ms as u64))
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Fixed {
            max_retries: 3,
            delay: Duration::from_millis(100),
        }
    }
}
