//! Small concurrency helpers: key-based locks and retry with backoff.

pub mod key_lock;
pub mod retry;

pub use key_lock::{KeyLockGuard, KeyLockManager};
pub use retry::retry_with_policy;
