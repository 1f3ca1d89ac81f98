//! Sequential and parallel stream execution engines.
//!
//! Both engines drive a [`StepPipeline`] over a source of values and fold
//! the emitted elements with a [`Collector`]. The parallel engine chops the
//! source into chunks, dispatches each chunk to the worker pool of a
//! [`ParallelConfiguration`] and merges the partial results in submission
//! order or in completion order.

use async_stream::stream;
use futures_util::stream::FuturesUnordered;
use futures_util::{pin_mut, StreamExt};
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

use crate::collectors::{self, Collector};
use crate::error::{StreamError, StreamResult};
use crate::iterables::chunked;
use crate::pipeline::StepPipeline;

use super::ValueStream;

/// Parallel execution configuration of a stream.
///
/// `executor` is the handle of a caller-owned tokio runtime; chunk tasks are
/// dispatched to its blocking worker pool. The stream never owns, sizes or
/// shuts the runtime down.
///
/// `chunksize` controls how many source values are submitted per task: it
/// trades latency-to-first-result against scheduling overhead, since a chunk
/// is always processed whole before its short-circuit signal is observed.
#[derive(Debug, Clone)]
pub struct ParallelConfiguration {
    executor: Handle,
    chunksize: usize,
}

impl ParallelConfiguration {
    /// Creates a configuration from an executor handle and a chunk size.
    ///
    /// Returns [`StreamError::InvalidChunkSize`] when `chunksize` is zero.
    pub fn new(executor: Handle, chunksize: usize) -> StreamResult<Self> {
        if chunksize < 1 {
            return Err(StreamError::InvalidChunkSize(chunksize));
        }
        Ok(ParallelConfiguration {
            executor,
            chunksize,
        })
    }

    /// The executor used for parallel execution.
    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    /// The number of source values submitted per worker task.
    pub fn chunksize(&self) -> usize {
        self.chunksize
    }
}

/// Lazily runs the pipeline over the source, yielding only the emitted
/// elements. One source value is processed per pull.
pub(crate) fn sync_generator<V, T>(
    values: ValueStream<V>,
    pipeline: StepPipeline<V, T>,
) -> ValueStream<T>
where
    V: Send + 'static,
    T: Send + 'static,
{
    stream! {
        pin_mut!(values);
        while let Some(value) = values.next().await {
            if let Some(result) = pipeline.execute(value) {
                yield result;
            }
        }
    }
    .boxed()
}

/// Drives the pipeline over the source in-process, folding emitted elements
/// with the collector.
///
/// Returns the folded result and a continue flag which is false only when
/// `stop_on_first_completed` short-circuited the run. Elements filtered out
/// by the pipeline are not emitted and do not trigger the stop condition.
pub(crate) async fn sync_execution<V, T, R>(
    values: ValueStream<V>,
    pipeline: &StepPipeline<V, T>,
    stop_on_first_completed: bool,
    collector: &Collector<T, R>,
) -> (R, bool)
where
    V: Send + 'static,
    T: Send + 'static,
{
    let mut results = collector.supply();
    let emitted = sync_generator(values, pipeline.clone());
    pin_mut!(emitted);
    while let Some(value) = emitted.next().await {
        results = collector.accumulate(results, value);
        if stop_on_first_completed {
            return (results, false);
        }
    }
    (results, true)
}

/// The worker-side body of one parallel chunk task: the sequential loop over
/// an owned chunk.
pub(crate) fn process_chunk<V, T, R>(
    chunk: Vec<V>,
    pipeline: &StepPipeline<V, T>,
    stop_on_first_completed: bool,
    collector: &Collector<T, R>,
) -> (R, bool)
where
    V: 'static,
    T: 'static,
{
    let mut results = collector.supply();
    for value in chunk {
        if let Some(result) = pipeline.execute(value) {
            results = collector.accumulate(results, result);
            if stop_on_first_completed {
                return (results, false);
            }
        }
    }
    (results, true)
}

/// Chunks the source and eagerly submits one blocking task per chunk.
async fn submit_chunks<V, T, R>(
    values: ValueStream<V>,
    pipeline: &StepPipeline<V, T>,
    config: &ParallelConfiguration,
    stop_on_first_completed: bool,
    collector: &Collector<T, R>,
) -> Vec<JoinHandle<(R, bool)>>
where
    V: Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
{
    let mut handles = Vec::new();
    let chunks = chunked(values, config.chunksize());
    pin_mut!(chunks);
    while let Some(chunk) = chunks.next().await {
        let pipeline = pipeline.clone();
        let collector = collector.clone();
        handles.push(config.executor().spawn_blocking(move || {
            process_chunk(chunk, &pipeline, stop_on_first_completed, &collector)
        }));
    }
    log::trace!("submitted {} parallel chunk tasks", handles.len());
    handles
}

/// Cancels every tracked chunk task on drop. Aborting a finished task is a
/// no-op, so a fully-consumed run drops through without effect.
struct AbortGuard {
    handles: Vec<AbortHandle>,
}

impl AbortGuard {
    fn new<R>(handles: &[JoinHandle<R>]) -> Self {
        AbortGuard {
            handles: handles.iter().map(JoinHandle::abort_handle).collect(),
        }
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        let outstanding = self
            .handles
            .iter()
            .filter(|handle| !handle.is_finished())
            .count();
        if outstanding > 0 {
            log::debug!("cancelling {} outstanding chunk tasks", outstanding);
        }
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Unwraps one chunk task outcome, resuming the chunk's panic on the caller
/// when the task failed.
fn into_chunk_result<R>(outcome: Result<R, JoinError>) -> R {
    match outcome {
        Ok(result) => result,
        Err(error) => {
            if error.is_panic() {
                std::panic::resume_unwind(error.into_panic());
            }
            panic!("parallel chunk task was cancelled before completion");
        }
    }
}

/// Runs the pipeline over the source on the configured worker pool.
///
/// Every chunk runs the sequential loop with the given collector, producing
/// a `(partial, continue)` pair; partials are merged with the collector's
/// combiner. A chunk that reports `continue = false` stops the fold and
/// cancels every chunk not yet folded. A chunk that panics cancels all
/// outstanding siblings and resumes the panic here — no partial result
/// escapes.
pub(crate) async fn parallel_execution<V, T, R>(
    values: ValueStream<V>,
    pipeline: StepPipeline<V, T>,
    config: ParallelConfiguration,
    ordered_execution: bool,
    stop_on_first_completed: bool,
    collector: Collector<T, R>,
) -> R
where
    V: Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
{
    let handles =
        submit_chunks(values, &pipeline, &config, stop_on_first_completed, &collector).await;
    if ordered_execution {
        ordered_parallel_execution(handles, &collector).await
    } else {
        unordered_parallel_execution(handles, &collector).await
    }
}

/// Awaits chunk results strictly in submission order.
async fn ordered_parallel_execution<T, R>(
    handles: Vec<JoinHandle<(R, bool)>>,
    collector: &Collector<T, R>,
) -> R {
    let guard = AbortGuard::new(&handles);
    let mut results = collector.supply();
    for handle in handles {
        let (partial, continue_processing) = into_chunk_result(handle.await);
        results = collector.combine(results, partial);
        if !continue_processing {
            break;
        }
    }
    drop(guard);
    results
}

/// Awaits chunk results first-completed-first-served.
async fn unordered_parallel_execution<T, R>(
    handles: Vec<JoinHandle<(R, bool)>>,
    collector: &Collector<T, R>,
) -> R {
    let guard = AbortGuard::new(&handles);
    let mut results = collector.supply();
    let mut pending: FuturesUnordered<_> = handles.into_iter().collect();
    while let Some(outcome) = pending.next().await {
        let (partial, continue_processing) = into_chunk_result(outcome);
        results = collector.combine(results, partial);
        if !continue_processing {
            break;
        }
    }
    drop(guard);
    results
}

/// The parallel form of [`sync_generator`]: submits every chunk task
/// (list-collecting, no short-circuit) on first poll, then yields buffered
/// chunk contents per the ordered/unordered contract. Dropping the generator
/// cancels outstanding chunk tasks.
pub(crate) fn parallel_generator<V, T>(
    values: ValueStream<V>,
    pipeline: StepPipeline<V, T>,
    config: ParallelConfiguration,
    ordered_execution: bool,
) -> ValueStream<T>
where
    V: Send + 'static,
    T: Send + 'static,
{
    stream! {
        let handles =
            submit_chunks(values, &pipeline, &config, false, &collectors::to_list()).await;
        let _guard = AbortGuard::new(&handles);
        if ordered_execution {
            for handle in handles {
                let (chunk_values, _) = into_chunk_result(handle.await);
                for value in chunk_values {
                    yield value;
                }
            }
        } else {
            let mut pending: FuturesUnordered<_> = handles.into_iter().collect();
            while let Some(outcome) = pending.next().await {
                let (chunk_values, _) = into_chunk_result(outcome);
                for value in chunk_values {
                    yield value;
                }
            }
        }
    }
    .boxed()
}
