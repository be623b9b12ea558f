//! Tests for the persistent, day-stamped term pool

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use rewards_search::{RewardsError, TermCache};

mod common;
use common::{create_test_dir, open_test_cache, pool_path, sample_terms};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

async fn fixed(terms: Vec<String>) -> rewards_search::Result<Vec<String>> {
    Ok(terms)
}

async fn never() -> rewards_search::Result<Vec<String>> {
    panic!("must not fetch")
}

async fn failing() -> rewards_search::Result<Vec<String>> {
    Err(RewardsError::Fetch("trends returned 429".to_string()))
}

#[tokio::test]
async fn test_same_day_fetches_once() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;
    let calls = AtomicUsize::new(0);

    let fetch = |count: usize| {
        calls.fetch_add(1, Ordering::SeqCst);
        fixed(sample_terms(count))
    };
    assert!(cache.ensure_fresh_on(day(16), fetch, 5).await.unwrap());

    let fetch = |count: usize| {
        calls.fetch_add(1, Ordering::SeqCst);
        fixed(sample_terms(count))
    };
    assert!(!cache.ensure_fresh_on(day(16), fetch, 5).await.unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len().await.unwrap(), 5);
    assert_eq!(cache.load_date().await.unwrap(), Some(day(16)));
}

#[tokio::test]
async fn test_fetch_receives_desired_count() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(
            day(16),
            |count| {
                assert_eq!(count, 12);
                fixed(sample_terms(count))
            },
            12,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stale_pool_is_replaced() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(day(15), |_| fixed(vec!["old a".to_string(), "old b".to_string()]), 2)
        .await
        .unwrap();

    let refreshed = cache
        .ensure_fresh_on(day(16), |_| fixed(vec!["new".to_string()]), 1)
        .await
        .unwrap();

    assert!(refreshed);
    assert_eq!(cache.terms().await.unwrap(), vec!["new"]);
    assert_eq!(cache.load_date().await.unwrap(), Some(day(16)));
}

#[tokio::test]
async fn test_future_load_date_counts_as_fresh() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(day(17), |n| fixed(sample_terms(n)), 3)
        .await
        .unwrap();
    let refreshed = cache
        .ensure_fresh_on(day(16), |_| never(), 3)
        .await
        .unwrap();
    assert!(!refreshed);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_pool() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(day(15), |n| fixed(sample_terms(n)), 4)
        .await
        .unwrap();
    let before = cache.terms().await.unwrap();

    let err = cache
        .ensure_fresh_on(day(16), |_| failing(), 4)
        .await
        .unwrap_err();

    assert!(matches!(err, RewardsError::Fetch(_)));
    assert_eq!(cache.terms().await.unwrap(), before);
    assert_eq!(cache.load_date().await.unwrap(), Some(day(15)));
}

#[tokio::test]
async fn test_pool_survives_reopen() {
    let dir = create_test_dir().unwrap();

    let cache = open_test_cache(&dir).await;
    cache
        .ensure_fresh_on(day(16), |n| fixed(sample_terms(n)), 6)
        .await
        .unwrap();
    let terms = cache.terms().await.unwrap();
    cache.close().await;

    let reopened = TermCache::open(&pool_path(&dir)).await.unwrap();
    assert_eq!(reopened.terms().await.unwrap(), terms);
    assert_eq!(reopened.load_date().await.unwrap(), Some(day(16)));

    let refreshed = reopened
        .ensure_fresh_on(day(16), |_| never(), 6)
        .await
        .unwrap();
    assert!(!refreshed);
}

#[tokio::test]
async fn test_terms_are_a_set_without_sentinel() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(
            day(16),
            |_| {
                fixed(vec![
                    "dup".to_string(),
                    "dup".to_string(),
                    "loadDate".to_string(),
                    "other".to_string(),
                ])
            },
            4,
        )
        .await
        .unwrap();

    let terms: HashSet<String> = cache.terms().await.unwrap().into_iter().collect();
    assert_eq!(terms, HashSet::from(["dup".to_string(), "other".to_string()]));
    assert_eq!(cache.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_root_terms_rotate_without_replacement() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;
    cache
        .ensure_fresh_on(day(16), |n| fixed(sample_terms(n)), 3)
        .await
        .unwrap();

    let order = cache.terms().await.unwrap();
    let mut picks = Vec::new();
    for _ in 0..4 {
        picks.push(cache.pick_root_term().await.unwrap());
    }

    assert_eq!(&picks[..3], order.as_slice());
    assert_eq!(picks[3], order[0]);
}

#[tokio::test]
async fn test_refresh_shuffles_fetch_order() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;
    let fetched = sample_terms(40);

    let order = fetched.clone();
    cache
        .ensure_fresh_on(day(16), move |_| fixed(order), 40)
        .await
        .unwrap();

    let stored = cache.terms().await.unwrap();
    assert_ne!(stored, fetched);

    let mut sorted = stored.clone();
    sorted.sort();
    let mut expected = fetched;
    expected.sort();
    assert_eq!(sorted, expected);
}

#[tokio::test]
async fn test_peek_leaves_term_in_rotation() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;
    cache
        .ensure_fresh_on(day(16), |n| fixed(sample_terms(n)), 3)
        .await
        .unwrap();
    let order = cache.terms().await.unwrap();

    assert_eq!(cache.peek_root_term().await.unwrap(), order[0]);
    assert_eq!(cache.peek_root_term().await.unwrap(), order[0]);

    cache.mark_used(&order[0]).await.unwrap();
    assert_eq!(cache.peek_root_term().await.unwrap(), order[1]);
    assert_eq!(cache.pick_root_term().await.unwrap(), order[1]);
    assert_eq!(cache.pick_root_term().await.unwrap(), order[2]);

    // Every term used: peeking restarts the rotation
    assert_eq!(cache.peek_root_term().await.unwrap(), order[0]);
}

#[tokio::test]
async fn test_rotation_survives_reopen() {
    let dir = create_test_dir().unwrap();

    let cache = open_test_cache(&dir).await;
    cache
        .ensure_fresh_on(day(16), |n| fixed(sample_terms(n)), 3)
        .await
        .unwrap();
    let order = cache.terms().await.unwrap();
    assert_eq!(cache.pick_root_term().await.unwrap(), order[0]);
    cache.close().await;

    let reopened = TermCache::open(&pool_path(&dir)).await.unwrap();
    assert_eq!(reopened.pick_root_term().await.unwrap(), order[1]);
}

#[tokio::test]
async fn test_refresh_resets_rotation() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh_on(day(15), |_| fixed(vec!["only".to_string()]), 1)
        .await
        .unwrap();
    cache.pick_root_term().await.unwrap();

    cache
        .ensure_fresh_on(day(16), |_| fixed(vec!["fresh".to_string()]), 1)
        .await
        .unwrap();
    assert_eq!(cache.pick_root_term().await.unwrap(), "fresh");
}

#[tokio::test]
async fn test_empty_pool_cannot_pick() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    assert!(matches!(
        cache.pick_root_term().await,
        Err(RewardsError::EmptyPool)
    ));

    // A refresh that yields nothing still stamps the date but leaves no terms
    cache
        .ensure_fresh_on(day(16), |_| fixed(Vec::new()), 0)
        .await
        .unwrap();
    assert!(cache.is_empty().await.unwrap());
    assert_eq!(cache.load_date().await.unwrap(), Some(day(16)));
    assert!(matches!(
        cache.pick_root_term().await,
        Err(RewardsError::EmptyPool)
    ));
}

#[tokio::test]
async fn test_force_refresh_ignores_load_date() {
    let dir = create_test_dir().unwrap();
    let cache = open_test_cache(&dir).await;

    cache
        .ensure_fresh(|_| fixed(vec!["first".to_string()]), 1)
        .await
        .unwrap();
    cache
        .force_refresh(|_| fixed(vec!["second".to_string()]), 1)
        .await
        .unwrap();

    assert_eq!(cache.terms().await.unwrap(), vec!["second"]);
}
