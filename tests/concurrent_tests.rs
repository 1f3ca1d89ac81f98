use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jstream::concurrent::{retry_with_policy, KeyLockManager};
use jstream::RetryPolicy;
use tokio::time::{sleep, timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_key_critical_sections_never_overlap() {
    let manager = Arc::new(KeyLockManager::new());
    let in_critical = Arc::new(AtomicBool::new(false));
    let entered = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let in_critical = Arc::clone(&in_critical);
        let entered = Arc::clone(&entered);
        handles.push(tokio::spawn(async move {
            let _guard = manager.lock("shared".to_string()).await;
            assert!(
                !in_critical.swap(true, Ordering::SeqCst),
                "two tasks entered the same-key critical section"
            );
            entered.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(2)).await;
            in_critical.store(false, Ordering::SeqCst);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(entered.load(Ordering::SeqCst), 8);
    assert_eq!(manager.active_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_do_not_block_each_other() {
    let manager = Arc::new(KeyLockManager::new());
    let _first = manager.lock("a").await;
    let second = timeout(Duration::from_secs(1), manager.lock("b")).await;
    assert!(second.is_ok(), "locking a distinct key must not wait");
    assert_eq!(manager.active_keys(), 2);
}

#[tokio::test]
async fn test_try_lock_fails_while_the_key_is_held() {
    let manager = KeyLockManager::new();
    let guard = manager.lock(7u32).await;
    assert!(manager.try_lock(7u32).is_none());
    assert!(manager.try_lock(8u32).is_some());
    drop(guard);
    assert!(manager.try_lock(7u32).is_some());
}

#[tokio::test]
async fn test_released_keys_are_removed_from_the_manager() {
    let manager = KeyLockManager::new();
    {
        let _guard = manager.lock("k").await;
        assert_eq!(manager.active_keys(), 1);
    }
    assert_eq!(manager.active_keys(), 0);
}

#[tokio::test]
async fn test_retry_returns_the_first_success() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let result: Result<i32, &str> = retry_with_policy(&RetryPolicy::default(), || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        }
    })
    .await;
    assert_eq!(result, Ok(42));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_recovers_after_transient_failures() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let policy = RetryPolicy::Immediate { max_retries: 3 };
    let result: Result<&str, &str> = retry_with_policy(&policy, || {
        let counter = Arc::clone(&counter);
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("transient")
            } else {
                Ok("recovered")
            }
        }
    })
    .await;
    assert_eq!(result, Ok("recovered"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_returns_the_last_error_when_exhausted() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let policy = RetryPolicy::Fixed {
        max_retries: 2,
        delay: Duration::from_millis(1),
    };
    let result: Result<i32, usize> = retry_with_policy(&policy, || {
        let counter = Arc::clone(&counter);
        async move { Err(counter.fetch_add(1, Ordering::SeqCst)) }
    })
    .await;
    // first try plus two retries; the error of the last try is returned
    assert_eq!(result, Err(2));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_policy_none_tries_exactly_once() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let result: Result<i32, &str> = retry_with_policy(&RetryPolicy::None, || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("always")
        }
    })
    .await;
    assert_eq!(result, Err("always"));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_backoff_delays_follow_the_policy() {
    assert_eq!(RetryPolicy::None.backoff_delay(0), None);
    assert_eq!(RetryPolicy::Immediate { max_retries: 5 }.backoff_delay(3), None);

    let fixed = RetryPolicy::Fixed {
        max_retries: 2,
        delay: Duration::from_millis(30),
    };
    assert_eq!(fixed.backoff_delay(0), Some(Duration::from_millis(30)));
    assert_eq!(fixed.backoff_delay(1), Some(Duration::from_millis(30)));

    let exponential = RetryPolicy::Exponential {
        max_retries: 4,
        initial_delay: Duration::from_millis(10),
        multiplier: 2.0,
    };
    assert_eq!(exponential.backoff_delay(0), Some(Duration::from_millis(10)));
    assert_eq!(exponential.backoff_delay(1), Some(Duration::from_millis(20)));
    assert_eq!(exponential.backoff_delay(2), Some(Duration::from_millis(40)));
}

#[test]
fn test_max_retries_per_policy() {
    assert_eq!(RetryPolicy::None.max_retries(), 0);
    assert_eq!(RetryPolicy::Immediate { max_retries: 7 }.max_retries(), 7);
    assert_eq!(RetryPolicy::default().max_retries(), 3);
}
