//! Collectors describing terminal stream reductions, inspired by
//! `java.util.stream.Collectors`.
//!
//! A [`Collector`] bundles the three functions of a parallel-mergeable fold:
//! a `supplier` creating a fresh result container, an `accumulator` folding
//! one element into a container, and a `combiner` merging two partial
//! containers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// The supplier/accumulator/combiner reduction contract consumed by the
/// stream execution engines.
///
/// Collectors are cheaply clonable so that parallel chunk tasks can share
/// them.
pub struct Collector<T, R> {
    supplier: Arc<dyn Fn() -> R + Send + Sync>,
    accumulator: Arc<dyn Fn(R, T) -> R + Send + Sync>,
    combiner: Arc<dyn Fn(R, R) -> R + Send + Sync>,
}

impl<T, R> Clone for Collector<T, R> {
    fn clone(&self) -> Self {
        Collector {
            supplier: Arc::clone(&self.supplier),
            accumulator: Arc::clone(&self.accumulator),
            combiner: Arc::clone(&self.combiner),
        }
    }
}

impl<T, R> Collector<T, R> {
    /// Creates a new result container.
    pub fn supply(&self) -> R {
        (self.supplier)()
    }

    /// Folds one element into a result container.
    pub fn accumulate(&self, results: R, value: T) -> R {
        (self.accumulator)(results, value)
    }

    /// Merges two partial result containers.
    pub fn combine(&self, first: R, second: R) -> R {
        (self.combiner)(first, second)
    }
}

/// Returns a Collector built from the given supplier, accumulator and
/// combiner.
pub fn of<T, R>(
    supplier: impl Fn() -> R + Send + Sync + 'static,
    accumulator: impl Fn(R, T) -> R + Send + Sync + 'static,
    combiner: impl Fn(R, R) -> R + Send + Sync + 'static,
) -> Collector<T, R> {
    Collector {
        supplier: Arc::new(supplier),
        accumulator: Arc::new(accumulator),
        combiner: Arc::new(combiner),
    }
}

/// Returns a Collector that accumulates the input elements into a `Vec`.
pub fn to_list<T: 'static>() -> Collector<T, Vec<T>> {
    of(
        Vec::new,
        |mut list, value| {
            list.push(value);
            list
        },
        |mut first, mut second| {
            first.append(&mut second);
            first
        },
    )
}

/// Returns a Collector that accumulates elements into a `HashMap` whose keys
/// and values are produced by the given mapping functions.
///
/// When two elements map to the same key, the later one wins.
pub fn to_map<T, K, V>(
    key_mapper: impl Fn(&T) -> K + Send + Sync + 'static,
    value_mapper: impl Fn(T) -> V + Send + Sync + 'static,
) -> Collector<T, HashMap<K, V>>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    of(
        HashMap::new,
        move |mut map, value| {
            map.insert(key_mapper(&value), value_mapper(value));
            map
        },
        |mut first, second| {
            first.extend(second);
            first
        },
    )
}

/// Returns a Collector counting the input elements.
pub fn to_counter<T>() -> Collector<T, usize> {
    of(|| 0, |count, _| count + 1, |first, second| first + second)
}

/// Returns a Collector that discards every element. Used by side-effect-only
/// terminal operations.
pub fn to_none<T>() -> Collector<T, ()> {
    of(|| (), |_, _| (), |_, _| ())
}
