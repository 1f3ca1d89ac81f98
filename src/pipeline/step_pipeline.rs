//! A pipeline where each step can stop the execution.

use std::sync::Arc;

/// The result of one pipeline step.
///
/// `value` is the step output; `go_next` tells the pipeline whether the
/// following step must run. A handler that filters an element out returns
/// its value with `go_next = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult<T> {
    pub value: T,
    pub go_next: bool,
}

impl<T> StepResult<T> {
    /// A continuing result (`go_next = true`).
    pub fn of(value: T) -> Self {
        StepResult {
            value,
            go_next: true,
        }
    }

    /// A result with an explicit continue flag.
    pub fn new(value: T, go_next: bool) -> Self {
        StepResult { value, go_next }
    }
}

/// An immutable chain of handlers `IN -> StepResult<OUT>`.
///
/// Executing the pipeline threads a value through the handlers in order and
/// stops at the first handler that returns `go_next = false`. Extending a
/// pipeline with [`add_handler`](StepPipeline::add_handler) never mutates the
/// existing chain: the same pipeline can be branched into several extensions
/// without the branches observing each other.
///
/// # Examples
///
/// ```
/// use jstream::pipeline::{StepPipeline, StepResult};
///
/// let pipeline = StepPipeline::of(|v: i32| StepResult::of(v * 2))
///     .add_handler(|v: i32| StepResult::new(v, v > 4));
///
/// assert_eq!(pipeline.execute(3), Some(6));
/// assert_eq!(pipeline.execute(1), None); // stopped by the second step
/// ```
pub struct StepPipeline<IN, OUT> {
    run: Arc<dyn Fn(IN) -> Option<OUT> + Send + Sync>,
}

impl<IN, OUT> Clone for StepPipeline<IN, OUT> {
    fn clone(&self) -> Self {
        StepPipeline {
            run: Arc::clone(&self.run),
        }
    }
}

impl<IN, OUT> StepPipeline<IN, OUT>
where
    IN: 'static,
    OUT: 'static,
{
    /// Returns a one-step pipeline built from the given handler.
    pub fn of<F>(handler: F) -> Self
    where
        F: Fn(IN) -> StepResult<OUT> + Send + Sync + 'static,
    {
        StepPipeline {
            run: Arc::new(move |value| {
                let result = handler(value);
                if result.go_next {
                    Some(result.value)
                } else {
                    None
                }
            }),
        }
    }

    /// Returns a new pipeline whose last step, when it continues, feeds the
    /// given handler. The current pipeline is left untouched.
    pub fn add_handler<N, F>(&self, handler: F) -> StepPipeline<IN, N>
    where
        N: 'static,
        F: Fn(OUT) -> StepResult<N> + Send + Sync + 'static,
    {
        let prev = Arc::clone(&self.run);
        StepPipeline {
            run: Arc::new(move |value| {
                prev(value).and_then(|out| {
                    let result = handler(out);
                    if result.go_next {
                        Some(result.value)
                    } else {
                        None
                    }
                })
            }),
        }
    }

    /// Executes the pipeline on the given value.
    ///
    /// Returns `Some(out)` when the value went through every step and the
    /// last step returned `go_next = true` (the value is emitted), `None`
    /// when some step stopped the chain (the value is filtered out). A
    /// handler that panics propagates immediately; no step catches.
    pub fn execute(&self, value: IN) -> Option<OUT> {
        (self.run)(value)
    }
}
