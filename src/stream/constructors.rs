//! Stream constructors.

use std::sync::Arc;

use futures_util::StreamExt;

use super::core::{root_pipeline, Stream};
use super::execution::ParallelConfiguration;

impl<T> Stream<T, T>
where
    T: Send + 'static,
{
    /// Returns an empty sequential stream.
    pub fn empty() -> Self {
        Self::of_iterable(std::iter::empty::<T>())
    }

    /// Returns a sequential ordered stream whose elements are the given
    /// values.
    ///
    /// ```
    /// use jstream::Stream;
    ///
    /// # async fn example() {
    /// assert_eq!(Stream::of([1, 2, 3]).to_list().await, vec![1, 2, 3]);
    /// # }
    /// ```
    pub fn of<const N: usize>(values: [T; N]) -> Self
    where
        T: Clone + Sync,
    {
        Self::of_iterable(values)
    }

    /// Returns a sequential ordered stream whose elements are the values of
    /// the given iterable.
    ///
    /// The iterable is cloned on every terminal operation, which makes the
    /// stream re-executable.
    pub fn of_iterable<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Stream::from_parts(
            Arc::new(move |_config: Option<&ParallelConfiguration>, _ordered| {
                futures_util::stream::iter(iterable.clone()).boxed()
            }),
            root_pipeline(),
            None,
            false,
        )
    }
}
