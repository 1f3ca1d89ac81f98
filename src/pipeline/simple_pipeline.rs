//! A pipeline with one plain transformation per step.

use std::sync::Arc;

/// An immutable chain of handlers `IN -> OUT` without a stop condition.
///
/// ```
/// use jstream::pipeline::SimplePipeline;
///
/// let pipeline = SimplePipeline::of(|v: i32| v + 1).add_handler(|v| v.to_string());
/// assert_eq!(pipeline.execute(41), "42");
/// ```
pub struct SimplePipeline<IN, OUT> {
    run: Arc<dyn Fn(IN) -> OUT + Send + Sync>,
}

impl<IN, OUT> Clone for SimplePipeline<IN, OUT> {
    fn clone(&self) -> Self {
        SimplePipeline {
            run: Arc::clone(&self.run),
        }
    }
}

impl<IN, OUT> SimplePipeline<IN, OUT>
where
    IN: 'static,
    OUT: 'static,
{
    /// Returns a one-step pipeline built from the given handler.
    pub fn of<F>(handler: F) -> Self
    where
        F: Fn(IN) -> OUT + Send + Sync + 'static,
    {
        SimplePipeline {
            run: Arc::new(handler),
        }
    }

    /// Adds a step to the pipeline and returns the new pipeline; the current
    /// one is left untouched.
    pub fn add_handler<N, F>(&self, handler: F) -> SimplePipeline<IN, N>
    where
        N: 'static,
        F: Fn(OUT) -> N + Send + Sync + 'static,
    {
        let prev = Arc::clone(&self.run);
        SimplePipeline {
            run: Arc::new(move |value| handler(prev(value))),
        }
    }

    /// Executes the pipeline on the given value.
    pub fn execute(&self, value: IN) -> OUT {
        (self.run)(value)
    }
}
