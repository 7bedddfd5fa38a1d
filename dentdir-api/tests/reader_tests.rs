//! Integration tests for the cached page reader
//!
//! Tests cover:
//! - Staleness bounded by the TTL of each accessor
//! - Store outages surfacing as errors once the cache has expired
//! - Listing order, grouping and exclusion

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use dentdir_api::PageReader;
use dentdir_common::db::*;
use dentdir_common::{generate_slug, Clock, ManualClock};
use sqlx::SqlitePool;

fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ))
}

fn page(city: &str, state: &str, dentist_count: i64, indexable: bool, at: DateTime<Utc>) -> PageRecord {
    PageRecord {
        slug: generate_slug(city, state).unwrap(),
        city: city.to_string(),
        state: state.to_string(),
        indexable,
        dentist_count,
        mean_rating: 4.5,
        payload: TopTenPayload {
            top10: Vec::new(),
            avg_review_count: 0,
            generated_at: at,
        },
        updated_at: at,
    }
}

async fn setup() -> (SqlitePool, Arc<ManualClock>, PageReader) {
    let pool = init_memory_database().await.unwrap();
    let clock = test_clock();
    let reader = PageReader::new(pool.clone(), clock.clone());
    (pool, clock, reader)
}

#[tokio::test]
async fn test_page_staleness_bounded_by_page_ttl() {
    let (pool, clock, reader) = setup().await;
    let now = clock.now();
    upsert_page(&pool, &page("Austin", "TX", 12, true, now)).await.unwrap();

    let first = reader.page_by_slug("best-dentists-austin-tx").await.unwrap().unwrap();
    assert!(first.indexable);

    upsert_page(&pool, &page("Austin", "TX", 9, false, now)).await.unwrap();

    clock.advance(Duration::hours(23));
    let cached = reader.page_by_slug("best-dentists-austin-tx").await.unwrap().unwrap();
    assert_eq!(cached, first);

    clock.advance(Duration::hours(1));
    let refreshed = reader.page_by_slug("best-dentists-austin-tx").await.unwrap().unwrap();
    assert!(!refreshed.indexable);
    assert_eq!(refreshed.dentist_count, 9);
}

#[tokio::test]
async fn test_absent_page_is_none() {
    let (_pool, _clock, reader) = setup().await;
    assert!(reader.page_by_slug("best-dentists-atlantis-or").await.unwrap().is_none());
    assert!(reader.page_by_city_state("Atlantis", "OR").await.unwrap().is_none());
}

#[tokio::test]
async fn test_page_by_city_state_ignores_case() {
    let (pool, clock, reader) = setup().await;
    upsert_page(&pool, &page("Salt Lake City", "UT", 14, true, clock.now()))
        .await
        .unwrap();

    let page = reader.page_by_city_state("salt lake city", "ut").await.unwrap().unwrap();
    assert_eq!(page.slug, "best-dentists-salt-lake-city-ut");
}

#[tokio::test]
async fn test_hub_refreshes_after_aggregate_ttl() {
    let (pool, clock, reader) = setup().await;
    let now = clock.now();
    upsert_page(&pool, &page("Austin", "TX", 12, true, now)).await.unwrap();

    assert_eq!(reader.top_cities_for_hub(12).await.unwrap().len(), 1);

    upsert_page(&pool, &page("Houston", "TX", 40, true, now)).await.unwrap();

    clock.advance(Duration::minutes(59));
    assert_eq!(reader.top_cities_for_hub(12).await.unwrap().len(), 1);

    clock.advance(Duration::minutes(1));
    let hub = reader.top_cities_for_hub(12).await.unwrap();
    let cities: Vec<&str> = hub.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(cities, vec!["Houston", "Austin"]);
}

#[tokio::test]
async fn test_store_outage_after_expiry_is_an_error() {
    let (pool, clock, reader) = setup().await;
    upsert_page(&pool, &page("Austin", "TX", 12, true, clock.now()))
        .await
        .unwrap();

    reader.indexable_pages().await.unwrap();
    pool.close().await;

    // Still within the sitemap TTL: served from cache
    assert_eq!(reader.indexable_pages().await.unwrap().len(), 1);

    clock.advance(Duration::hours(24));
    let result = reader.indexable_pages().await;
    assert!(matches!(result, Err(e) if e.is_store_error()));
}

#[tokio::test]
async fn test_listings_exclude_non_indexable_pages() {
    let (pool, clock, reader) = setup().await;
    let now = clock.now();
    upsert_page(&pool, &page("Austin", "TX", 12, true, now)).await.unwrap();
    upsert_page(&pool, &page("Dallas", "TX", 25, true, now)).await.unwrap();
    upsert_page(&pool, &page("Waco", "TX", 7, false, now)).await.unwrap();
    upsert_page(&pool, &page("Portland", "OR", 30, true, now)).await.unwrap();

    let sitemap = reader.indexable_pages().await.unwrap();
    assert_eq!(sitemap.len(), 3);
    assert!(sitemap.iter().all(|e| e.slug != "best-dentists-waco-tx"));

    let by_state = reader.cities_by_state().await.unwrap();
    let states: Vec<&String> = by_state.keys().collect();
    assert_eq!(states, vec!["OR", "TX"]);
    let texas: Vec<&str> = by_state["TX"].iter().map(|c| c.city.as_str()).collect();
    assert_eq!(texas, vec!["Dallas", "Austin"]);

    let related = reader.related_cities("tx", "Austin", 6).await.unwrap();
    let related: Vec<&str> = related.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(related, vec!["Dallas"]);
}

#[tokio::test]
async fn test_hub_limit_is_clamped() {
    let (pool, clock, reader) = setup().await;
    let now = clock.now();
    for (city, count) in [("Austin", 12), ("Dallas", 25), ("Houston", 40)] {
        upsert_page(&pool, &page(city, "TX", count, true, now)).await.unwrap();
    }

    let hub = reader.top_cities_for_hub(0).await.unwrap();
    assert_eq!(hub.len(), 1);
    assert_eq!(hub[0].city, "Houston");
}
