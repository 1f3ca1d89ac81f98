use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::stream::StreamExt;
use jstream::Stream;

#[tokio::test]
async fn test_of_collects_the_given_values() {
    assert_eq!(Stream::of([1, 2, 3]).to_list().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_of_iterable_collects_the_iterable_values() {
    assert_eq!(Stream::of_iterable(1..=4).to_list().await, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_empty_stream_laws() {
    let stream = Stream::<i32, i32>::empty();
    assert!(stream.to_list().await.is_empty());
    assert_eq!(stream.count().await, 0);
    assert!(stream.find_first().await.is_none());
    assert!(stream.find_any().await.is_none());
    assert!(stream.all_match(|_| false).await);
    assert!(!stream.any_match(|_| true).await);
    assert!(stream.max().await.is_none());
}

#[tokio::test]
async fn test_filter_then_map_scenario() {
    let result = Stream::of([1, 2, 3, 4, 5])
        .filter(|x| x % 2 == 0)
        .map(|x| x.to_string())
        .to_list()
        .await;
    assert_eq!(result, vec!["2".to_string(), "4".to_string()]);
}

#[tokio::test]
async fn test_filter_count_consistency() {
    let expected = (0..100).filter(|x| x % 3 == 0).count();
    let counted = Stream::of_iterable(0..100)
        .filter(|x| x % 3 == 0)
        .count()
        .await;
    assert_eq!(counted, expected);
}

#[tokio::test]
async fn test_map_preserves_encounter_order() {
    let result = Stream::of_iterable(0..10).map(|x| x * x).to_list().await;
    let expected: Vec<i32> = (0..10).map(|x| x * x).collect();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_to_map_uses_both_mappers() {
    let map = Stream::of(["a", "bb", "ccc"])
        .to_map(|s: &&str| s.len(), |s| s.to_string())
        .await;
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&2), Some(&"bb".to_string()));
}

#[tokio::test]
async fn test_reduce_sums_elements() {
    let total = Stream::of_iterable(1..=10).reduce(0, |a, b| a + b).await;
    assert_eq!(total, 55);
}

#[tokio::test]
async fn test_reduce_on_empty_stream_returns_identity() {
    let total = Stream::<i32, i32>::empty().reduce(41, |a, b| a + b).await;
    assert_eq!(total, 41);
}

#[tokio::test]
async fn test_collect_from_builds_an_inline_collector() {
    let concatenated = Stream::of(["a", "b", "c"])
        .collect_from(
            String::new,
            |mut acc, value| {
                acc.push_str(value);
                acc
            },
            |mut first, second| {
                first.push_str(&second);
                first
            },
        )
        .await;
    assert_eq!(concatenated, "abc");
}

#[tokio::test]
async fn test_all_match_evaluates_every_element() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let all_positive = Stream::of([1, -2, 3])
        .all_match(move |x| {
            seen.fetch_add(1, Ordering::SeqCst);
            *x > 0
        })
        .await;
    assert!(!all_positive);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_any_match_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let found = Stream::of([1, 2, 3, 4])
        .any_match(move |x| {
            seen.fetch_add(1, Ordering::SeqCst);
            *x >= 2
        })
        .await;
    assert!(found);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_find_first_returns_the_first_element() {
    assert_eq!(Stream::of_iterable(1..=100).find_first().await, Some(1));
}

#[tokio::test]
async fn test_find_any_on_a_sequential_stream_returns_the_first_match() {
    let result = Stream::of_iterable(1..=100)
        .filter(|x| x % 7 == 0)
        .find_any()
        .await;
    assert_eq!(result, Some(7));
}

#[tokio::test]
async fn test_limit_length_laws() {
    let values: Vec<i32> = (0..5).collect();
    for n in [0usize, 1, 3, 5, 10] {
        let limited = Stream::of_iterable(values.clone()).limit(n).to_list().await;
        assert_eq!(limited.len(), n.min(values.len()));
    }
    assert!(Stream::of([1, 2, 3]).limit(0).to_list().await.is_empty());
}

#[tokio::test]
async fn test_limit_stops_pulling_the_source() {
    let processed = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&processed);
    let result = Stream::of_iterable(1..=100)
        .peek(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .limit(3)
        .to_list()
        .await;
    assert_eq!(result, vec![1, 2, 3]);
    assert_eq!(processed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_skip_length_laws() {
    let values: Vec<i32> = (0..5).collect();
    for n in [0usize, 2, 5, 10] {
        let skipped = Stream::of_iterable(values.clone()).skip(n).to_list().await;
        assert_eq!(skipped.len(), values.len().saturating_sub(n));
    }
    assert_eq!(Stream::of([1, 2, 3]).skip(1).to_list().await, vec![2, 3]);
}

#[tokio::test]
async fn test_take_while_stops_at_the_first_mismatch() {
    let result = Stream::of([1, 2, 3, 4, 1])
        .take_while(|x| *x < 3)
        .to_list()
        .await;
    assert_eq!(result, vec![1, 2]);
}

#[tokio::test]
async fn test_drop_while_keeps_everything_after_the_first_mismatch() {
    let result = Stream::of([1, 2, 3, 4, 1])
        .drop_while(|x| *x < 3)
        .to_list()
        .await;
    assert_eq!(result, vec![3, 4, 1]);
}

#[tokio::test]
async fn test_distinct_keeps_first_seen_values() {
    let result = Stream::of([1, 2, 1, 3, 2]).distinct().to_list().await;
    assert_eq!(result, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_distinct_is_idempotent() {
    let stream = Stream::of([1, 2, 1, 3, 2, 3, 3]);
    assert_eq!(
        stream.distinct().distinct().to_list().await,
        stream.distinct().to_list().await
    );
}

#[tokio::test]
async fn test_sorted_natural_order() {
    let result = Stream::of([3, 1, 4, 1, 5]).sorted().to_list().await;
    assert_eq!(result, vec![1, 1, 3, 4, 5]);
}

#[tokio::test]
async fn test_sorted_by_custom_comparator() {
    let result = Stream::of([3, 1, 4, 1, 5])
        .sorted_by(|a, b| b.cmp(a))
        .to_list()
        .await;
    assert_eq!(result, vec![5, 4, 3, 1, 1]);
}

#[tokio::test]
async fn test_min_and_max() {
    let stream = Stream::of([3, 1, 4, 1, 5]);
    assert_eq!(stream.min().await, Some(1));
    assert_eq!(stream.max().await, Some(5));
}

#[tokio::test]
async fn test_max_matches_the_last_sorted_element() {
    let stream = Stream::of([9, 2, 7, 4]);
    let sorted = stream.sorted().to_list().await;
    assert_eq!(stream.max().await, sorted.last().copied());
}

#[tokio::test]
async fn test_min_max_by_comparator() {
    let stream = Stream::of(["aaa", "b", "cc"]);
    let shortest = stream.min_by(|a, b| a.len().cmp(&b.len())).await;
    let longest = stream.max_by(|a, b| a.len().cmp(&b.len())).await;
    assert_eq!(shortest, Some("b"));
    assert_eq!(longest, Some("aaa"));
}

#[tokio::test]
async fn test_for_each_visits_every_element() {
    let total = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&total);
    Stream::of_iterable(1usize..=4)
        .for_each(move |x| {
            sink.fetch_add(*x, Ordering::SeqCst);
        })
        .await;
    assert_eq!(total.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_peek_observes_without_changing_values() {
    let observed = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&observed);
    let result = Stream::of([1, 2, 3])
        .peek(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .to_list()
        .await;
    assert_eq!(result, vec![1, 2, 3]);
    assert_eq!(observed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_flat_map_flattens_in_encounter_order() {
    let result = Stream::of([1, 2, 3])
        .flat_map(|x| Stream::of_iterable(vec![x, x * 10]))
        .to_list()
        .await;
    assert_eq!(result, vec![1, 10, 2, 20, 3, 30]);
}

#[tokio::test]
async fn test_terminal_operations_can_be_repeated() {
    let stream = Stream::of([1, 2, 3]).map(|x| x + 1);
    assert_eq!(stream.to_list().await, vec![2, 3, 4]);
    assert_eq!(stream.to_list().await, vec![2, 3, 4]);
    assert_eq!(stream.count().await, 3);
}

#[tokio::test]
async fn test_derived_streams_do_not_observe_each_other() {
    let base = Stream::of([1, 2, 3]);
    let incremented = base.map(|x| x + 1);
    let doubled = base.map(|x| x * 2);
    assert_eq!(base.to_list().await, vec![1, 2, 3]);
    assert_eq!(incremented.to_list().await, vec![2, 3, 4]);
    assert_eq!(doubled.to_list().await, vec![2, 4, 6]);
}

#[tokio::test]
async fn test_sequential_generator_is_pull_lazy() {
    let processed = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&processed);
    let stream = Stream::of_iterable(1..=100).peek(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let mut generator = stream.to_generator();
    assert_eq!(generator.next().await, Some(1));
    assert_eq!(generator.next().await, Some(2));
    assert_eq!(processed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sequential_config_flags() {
    let stream = Stream::of([1, 2, 3]);
    assert!(!stream.is_parallel());
    assert!(!stream.sequential().is_parallel());
    let ordered = stream.ordered_execution(true);
    assert_eq!(ordered.to_list().await, vec![1, 2, 3]);
    assert_eq!(ordered.unordered().to_list().await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_sequential_handler_panic_propagates_to_the_terminal_caller() {
    let outcome = tokio::spawn(async {
        Stream::of([1, 2, 3])
            .map(|x| {
                if x == 2 {
                    panic!("element failure");
                }
                x
            })
            .to_list()
            .await
    })
    .await;
    assert!(outcome.is_err());
    assert!(outcome.unwrap_err().is_panic());
}

#[tokio::test]
async fn test_generators_see_independent_runs() {
    let stream = Stream::of([1, 2, 3]).map(|x| x * 2);
    let first: Vec<i32> = stream.to_generator().collect().await;
    let second: Vec<i32> = stream.to_generator().collect().await;
    assert_eq!(first, vec![2, 4, 6]);
    assert_eq!(first, second);
}
