//! Pipelines of single-input/single-output handlers.
//!
//! [`StepPipeline`] chains handlers that can stop the execution via a
//! continue flag, [`SimplePipeline`] chains plain transformations.

pub mod simple_pipeline;
pub mod step_pipeline;

pub use simple_pipeline::SimplePipeline;
pub use step_pipeline::{StepPipeline, StepResult};
