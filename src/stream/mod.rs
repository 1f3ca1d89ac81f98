//! Stream pipelines inspired by `java.util.stream`.
//!
//! A [`Stream`] composes a source-producing function, a
//! [`StepPipeline`](crate::pipeline::StepPipeline) of lazy per-element
//! stages and an optional [`ParallelConfiguration`]. Intermediate operations
//! only extend the pipeline or replace the source; nothing runs until a
//! terminal operation drives one of the execution engines.

pub mod constructors;
pub mod core;
pub mod execution;
pub mod terminal;

pub use self::core::Stream;
pub use self::execution::ParallelConfiguration;

use futures_core::stream::BoxStream;

/// A boxed, heap-allocated stream of values
pub type ValueStream<T> = BoxStream<'static, T>;
