//! Terminal stream operations.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::collectors::{self, Collector};

use super::core::Stream;
use super::execution::{parallel_execution, parallel_generator, sync_execution, sync_generator};
use super::ValueStream;

impl<S, T> Stream<S, T>
where
    S: Send + 'static,
    T: Send + 'static,
{
    /// Runs the configured execution engine over the source values.
    async fn execute<R>(&self, stop_on_first_completed: bool, collector: Collector<T, R>) -> R
    where
        R: Send + 'static,
    {
        let values = (self.values_fn)(self.parallel_config.as_ref(), self.ordered_execution);
        match &self.parallel_config {
            Some(config) => {
                parallel_execution(
                    values,
                    self.pipeline.clone(),
                    config.clone(),
                    self.ordered_execution,
                    stop_on_first_completed,
                    collector,
                )
                .await
            }
            None => {
                sync_execution(values, &self.pipeline, stop_on_first_completed, &collector)
                    .await
                    .0
            }
        }
    }

    /// Performs a reduction on the elements of this stream using the given
    /// collector.
    pub async fn collect<R>(&self, collector: Collector<T, R>) -> R
    where
        R: Send + 'static,
    {
        self.execute(false, collector).await
    }

    /// Performs a reduction described by the given supplier, accumulator and
    /// combiner. Sugar over [`collect`](Stream::collect).
    pub async fn collect_from<R>(
        &self,
        supplier: impl Fn() -> R + Send + Sync + 'static,
        accumulator: impl Fn(R, T) -> R + Send + Sync + 'static,
        combiner: impl Fn(R, R) -> R + Send + Sync + 'static,
    ) -> R
    where
        R: Send + 'static,
    {
        self.collect(collectors::of(supplier, accumulator, combiner))
            .await
    }

    /// Accumulates the elements of this stream into a `Vec`.
    pub async fn to_list(&self) -> Vec<T> {
        self.collect(collectors::to_list()).await
    }

    /// Accumulates the elements of this stream into a `HashMap` whose keys
    /// and values are produced by the given mapping functions.
    pub async fn to_map<K, V>(
        &self,
        key_mapper: impl Fn(&T) -> K + Send + Sync + 'static,
        value_mapper: impl Fn(T) -> V + Send + Sync + 'static,
    ) -> HashMap<K, V>
    where
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
    {
        self.collect(collectors::to_map(key_mapper, value_mapper))
            .await
    }

    /// Returns the count of elements in this stream.
    pub async fn count(&self) -> usize {
        self.collect(collectors::to_counter()).await
    }

    /// Performs a reduction using the given identity value and associative
    /// accumulation function.
    pub async fn reduce<F>(&self, identity: T, accumulator: F) -> T
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let accumulator = Arc::new(accumulator);
        let combiner = Arc::clone(&accumulator);
        self.collect(collectors::of(
            move || identity.clone(),
            move |a, b| accumulator(a, b),
            move |a, b| combiner(a, b),
        ))
        .await
    }

    /// Returns whether all elements of this stream match the given
    /// predicate; true for an empty stream.
    ///
    /// Every element is evaluated: this operation reduces rather than
    /// short-circuits.
    pub async fn all_match<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.map(move |value| predicate(&value))
            .reduce(true, |a, b| a && b)
            .await
    }

    /// Returns whether any element of this stream matches the given
    /// predicate; false for an empty stream. Short-circuits.
    pub async fn any_match<P>(&self, predicate: P) -> bool
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter(predicate).find_any().await.is_some()
    }

    /// Returns the first element of this stream, or `None` if the stream is
    /// empty.
    pub async fn find_first(&self) -> Option<T> {
        self.ordered_execution(true).find_any().await
    }

    /// Returns some element of this stream, or `None` if the stream is
    /// empty. Equivalent to [`find_first`](Stream::find_first) on ordered
    /// streams. Short-circuits.
    pub async fn find_any(&self) -> Option<T> {
        let mut results = self.execute(true, collectors::to_list()).await;
        if results.is_empty() {
            None
        } else {
            Some(results.swap_remove(0))
        }
    }

    /// Returns the minimum element of this stream in natural order.
    pub async fn min(&self) -> Option<T>
    where
        T: Ord,
    {
        self.min_by(Ord::cmp).await
    }

    /// Returns the minimum element of this stream according to the given
    /// comparator.
    pub async fn min_by<F>(&self, comparator: F) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.sorted_by(comparator).find_first().await
    }

    /// Returns the maximum element of this stream in natural order.
    pub async fn max(&self) -> Option<T>
    where
        T: Ord,
    {
        self.max_by(Ord::cmp).await
    }

    /// Returns the maximum element of this stream according to the given
    /// comparator. Reverses the comparator and delegates to
    /// [`min_by`](Stream::min_by).
    pub async fn max_by<F>(&self, comparator: F) -> Option<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.min_by(move |a, b| comparator(a, b).reverse()).await
    }

    /// Performs the given action for each element of this stream.
    pub async fn for_each<C>(&self, consumer: C)
    where
        C: Fn(&T) + Send + Sync + 'static,
    {
        self.peek(consumer).execute(false, collectors::to_none()).await
    }

    /// Returns a lazy, non-restartable stream of the processed values.
    ///
    /// On a sequential stream one source value is processed per pull. On a
    /// parallel stream all chunk tasks are submitted on the first pull and
    /// buffered results are yielded one by one, in submission order when the
    /// stream is ordered or in completion order otherwise. Dropping the
    /// generator cancels outstanding chunk tasks.
    pub fn to_generator(&self) -> ValueStream<T> {
        let values = (self.values_fn)(self.parallel_config.as_ref(), self.ordered_execution);
        match &self.parallel_config {
            Some(config) => parallel_generator(
                values,
                self.pipeline.clone(),
                config.clone(),
                self.ordered_execution,
            ),
            None => sync_generator(values, self.pipeline.clone()),
        }
    }
}
