//! The Stream value object and its lazy intermediate operations.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use async_stream::stream;
use futures_util::{pin_mut, StreamExt};

use crate::pipeline::{StepPipeline, StepResult};

use super::execution::ParallelConfiguration;
use super::ValueStream;

/// The source-producing function of a stream.
///
/// Terminal operations re-invoke it with the configuration in effect at
/// execution time, so operations that realize intermediate state
/// (`distinct`, `limit`, `sorted`, …) drive their upstream stream with the
/// downstream configuration.
pub(crate) type ValuesFn<S> =
    Arc<dyn Fn(Option<&ParallelConfiguration>, bool) -> ValueStream<S> + Send + Sync>;

pub(crate) fn root_pipeline<T: 'static>() -> StepPipeline<T, T> {
    StepPipeline::of(StepResult::of)
}

/// A lazily-evaluated stream of `T` values produced from a source of `S`
/// values threaded through a step pipeline.
///
/// `Stream` is an immutable value object: every operation — including the
/// configuration operations [`parallel`](Stream::parallel) and
/// [`ordered_execution`](Stream::ordered_execution) — returns a new stream
/// and shares the existing pipeline chain structurally. Two streams derived
/// from a common base never observe each other.
///
/// A stream may be executed by several terminal operations: each call
/// re-invokes the source function and re-runs the pipeline; results are
/// never cached.
///
/// # Examples
///
/// ```
/// use jstream::Stream;
///
/// # async fn example() {
/// let result = Stream::of([1, 2, 3, 4, 5])
///     .filter(|x| x % 2 == 0)
///     .map(|x| x.to_string())
///     .to_list()
///     .await;
/// assert_eq!(result, vec!["2".to_string(), "4".to_string()]);
/// # }
/// ```
pub struct Stream<S, T> {
    pub(crate) values_fn: ValuesFn<S>,
    pub(crate) pipeline: StepPipeline<S, T>,
    pub(crate) parallel_config: Option<ParallelConfiguration>,
    pub(crate) ordered_execution: bool,
}

impl<S, T> Clone for Stream<S, T> {
    fn clone(&self) -> Self {
        Stream {
            values_fn: Arc::clone(&self.values_fn),
            pipeline: self.pipeline.clone(),
            parallel_config: self.parallel_config.clone(),
            ordered_execution: self.ordered_execution,
        }
    }
}

impl<S, T> Stream<S, T>
where
    S: Send + 'static,
    T: Send + 'static,
{
    pub(crate) fn from_parts(
        values_fn: ValuesFn<S>,
        pipeline: StepPipeline<S, T>,
        parallel_config: Option<ParallelConfiguration>,
        ordered_execution: bool,
    ) -> Self {
        Stream {
            values_fn,
            pipeline,
            parallel_config,
            ordered_execution,
        }
    }

    fn with_pipeline<R: Send + 'static>(&self, pipeline: StepPipeline<S, R>) -> Stream<S, R> {
        Stream {
            values_fn: Arc::clone(&self.values_fn),
            pipeline,
            parallel_config: self.parallel_config.clone(),
            ordered_execution: self.ordered_execution,
        }
    }

    /// Returns a copy of this stream with the given configuration, used to
    /// re-drive an upstream stream with the configuration in effect at
    /// terminal-execution time.
    pub(crate) fn with_config(
        &self,
        parallel_config: Option<ParallelConfiguration>,
        ordered: bool,
    ) -> Self {
        Stream {
            values_fn: Arc::clone(&self.values_fn),
            pipeline: self.pipeline.clone(),
            parallel_config,
            ordered_execution: ordered,
        }
    }

    /// Returns a new stream produced from the given source function, copying
    /// this stream's configuration and starting a fresh pipeline.
    fn from_self_config<V: Send + 'static>(&self, values_fn: ValuesFn<V>) -> Stream<V, V> {
        Stream {
            values_fn,
            pipeline: root_pipeline(),
            parallel_config: self.parallel_config.clone(),
            ordered_execution: self.ordered_execution,
        }
    }

    // ================================
    // Configuration operations
    // ================================

    /// Returns this stream configured with the given parallel configuration.
    ///
    /// Passing `None` is equivalent to calling [`sequential`](Stream::sequential).
    pub fn parallel(&self, parallel_config: Option<ParallelConfiguration>) -> Self {
        let mut stream = self.clone();
        stream.parallel_config = parallel_config;
        stream
    }

    /// Returns this stream configured for sequential execution.
    pub fn sequential(&self) -> Self {
        self.parallel(None)
    }

    /// Returns whether a terminal operation would execute in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel_config.is_some()
    }

    /// Returns this stream configured to return values in encounter order.
    ///
    /// Has no effect on sequential streams, which always preserve order.
    pub fn ordered_execution(&self, ordered: bool) -> Self {
        if self.ordered_execution == ordered {
            return self.clone();
        }
        let mut stream = self.clone();
        stream.ordered_execution = ordered;
        stream
    }

    /// Returns this stream configured for unordered execution. Equivalent to
    /// `ordered_execution(false)`.
    pub fn unordered(&self) -> Self {
        self.ordered_execution(false)
    }

    // ================================
    // Pipeline-extending operations
    // ================================

    /// Returns a stream consisting of the results of applying `mapper` to
    /// the elements of this stream.
    pub fn map<R, F>(&self, mapper: F) -> Stream<S, R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.with_pipeline(
            self.pipeline
                .add_handler(move |value| StepResult::of(mapper(value))),
        )
    }

    /// Returns a stream consisting of the elements of this stream that match
    /// the given predicate.
    pub fn filter<P>(&self, predicate: P) -> Stream<S, T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.with_pipeline(self.pipeline.add_handler(move |value| {
            let keep = predicate(&value);
            StepResult::new(value, keep)
        }))
    }

    /// Returns a stream consisting of the elements of this stream,
    /// additionally performing the given action on each element as it is
    /// consumed.
    pub fn peek<C>(&self, consumer: C) -> Stream<S, T>
    where
        C: Fn(&T) + Send + Sync + 'static,
    {
        self.map(move |value| {
            consumer(&value);
            value
        })
    }

    // ================================
    // Source-replacing operations
    // ================================

    /// Returns a stream consisting of the results of replacing each element
    /// of this stream with the contents of the stream produced by `mapper`.
    ///
    /// Inner streams are materialized to lists in the encounter order of
    /// this stream's generator.
    pub fn flat_map<U, R, F>(&self, mapper: F) -> Stream<R, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Stream<U, R> + Send + Sync + 'static,
    {
        let base = self.clone();
        let mapper = Arc::new(mapper);
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let mapper = Arc::clone(&mapper);
                let inner_streams = base
                    .with_config(config.cloned(), ordered)
                    .map(move |value| mapper(value))
                    .to_generator();
                stream! {
                    pin_mut!(inner_streams);
                    while let Some(inner) = inner_streams.next().await {
                        for value in inner.to_list().await {
                            yield value;
                        }
                    }
                }
                .boxed()
            },
        ))
    }

    /// Returns a stream consisting of the distinct elements of this stream,
    /// first-seen wins. Keeps every seen value in memory.
    pub fn distinct(&self) -> Stream<T, T>
    where
        T: Eq + Hash + Clone,
    {
        let base = self.clone();
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let generator = base.with_config(config.cloned(), ordered).to_generator();
                stream! {
                    let mut existing = HashSet::new();
                    pin_mut!(generator);
                    while let Some(value) = generator.next().await {
                        if existing.insert(value.clone()) {
                            yield value;
                        }
                    }
                }
                .boxed()
            },
        ))
    }

    /// Returns a stream consisting of the elements of this stream sorted in
    /// natural order.
    pub fn sorted(&self) -> Stream<T, T>
    where
        T: Ord,
    {
        self.sorted_by(Ord::cmp)
    }

    /// Returns a stream consisting of the elements of this stream sorted
    /// with the given comparator. Forces ordered execution.
    pub fn sorted_by<F>(&self, comparator: F) -> Stream<T, T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let base = self.clone();
        let comparator = Arc::new(comparator);
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let source = base.with_config(config.cloned(), ordered);
                let comparator = Arc::clone(&comparator);
                stream! {
                    let mut values = source.to_list().await;
                    values.sort_by(|a, b| comparator(a, b));
                    for value in values {
                        yield value;
                    }
                }
                .boxed()
            },
        ))
        .ordered_execution(true)
    }

    /// Returns a stream truncated to at most `limit` elements. A limit of
    /// zero yields nothing.
    pub fn limit(&self, limit: usize) -> Stream<T, T> {
        let base = self.clone();
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let generator = base.with_config(config.cloned(), ordered).to_generator();
                stream! {
                    if limit > 0 {
                        let mut counter = 0usize;
                        pin_mut!(generator);
                        while let Some(value) = generator.next().await {
                            yield value;
                            counter += 1;
                            if counter >= limit {
                                break;
                            }
                        }
                    }
                }
                .boxed()
            },
        ))
    }

    /// Returns a stream consisting of the remaining elements of this stream
    /// after discarding its first `n` elements.
    pub fn skip(&self, n: usize) -> Stream<T, T> {
        let base = self.clone();
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let generator = base.with_config(config.cloned(), ordered).to_generator();
                stream! {
                    let mut counter = 0usize;
                    pin_mut!(generator);
                    while let Some(value) = generator.next().await {
                        if counter >= n {
                            yield value;
                        }
                        counter += 1;
                    }
                }
                .boxed()
            },
        ))
    }

    /// Returns, if this stream is ordered, the longest prefix of elements
    /// matching the given predicate. On an unordered parallel stream the
    /// "prefix" is a subset taken from whatever order chunks complete in.
    pub fn take_while<P>(&self, predicate: P) -> Stream<T, T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let base = self.clone();
        let predicate = Arc::new(predicate);
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let generator = base.with_config(config.cloned(), ordered).to_generator();
                let predicate = Arc::clone(&predicate);
                stream! {
                    pin_mut!(generator);
                    while let Some(value) = generator.next().await {
                        if !predicate(&value) {
                            break;
                        }
                        yield value;
                    }
                }
                .boxed()
            },
        ))
    }

    /// Returns the remaining elements of this stream after dropping the
    /// longest prefix of elements matching the given predicate (a subset for
    /// unordered parallel streams, as with [`take_while`](Stream::take_while)).
    pub fn drop_while<P>(&self, predicate: P) -> Stream<T, T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let base = self.clone();
        let predicate = Arc::new(predicate);
        self.from_self_config(Arc::new(
            move |config: Option<&ParallelConfiguration>, ordered| {
                let generator = base.with_config(config.cloned(), ordered).to_generator();
                let predicate = Arc::clone(&predicate);
                stream! {
                    let mut dropping = true;
                    pin_mut!(generator);
                    while let Some(value) = generator.next().await {
                        dropping = dropping && predicate(&value);
                        if !dropping {
                            yield value;
                        }
                    }
                }
                .boxed()
            },
        ))
    }
}
