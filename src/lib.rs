//! jstream - Java-inspired Stream pipelines for Rust
//!
//! This crate provides a lazily-evaluated [`Stream`] over an input sequence:
//! intermediate operations build an immutable chain of per-element steps,
//! and terminal operations drive the chain either sequentially in-process or
//! in parallel over the blocking worker pool of a caller-owned tokio
//! runtime, chunk by chunk, merging partial results through a
//! [`Collector`].
//!
//! ```
//! use jstream::Stream;
//!
//! # async fn example() {
//! let even_squares = Stream::of_iterable(1..=10)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * x)
//!     .to_list()
//!     .await;
//! assert_eq!(even_squares, vec![4, 16, 36, 64, 100]);
//! # }
//! ```

pub mod collectors;
pub mod concurrent;
pub mod error;
pub mod iterables;
pub mod pipeline;
pub mod stream;

pub use collectors::Collector;
pub use error::{RetryPolicy, StreamError, StreamResult};
pub use pipeline::{SimplePipeline, StepPipeline, StepResult};
pub use stream::{ParallelConfiguration, Stream, ValueStream};
