//! Integration tests for the dentist/aggregate/page storage layer
//!
//! Tests cover:
//! - city_dentist_stats view semantics (counts, means, invalid rows)
//! - rankable dentist filtering
//! - page upsert keyed by slug (no duplicates, in-place update)
//! - page/listing reads

use chrono::{Duration, TimeZone, Utc};
use dentdir_common::db::*;
use sqlx::SqlitePool;

async fn setup_db() -> SqlitePool {
    init_memory_database()
        .await
        .expect("Should create in-memory database")
}

fn sample_page(slug: &str, city: &str, state: &str, indexable: bool, count: i64) -> PageRecord {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
    PageRecord {
        slug: slug.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        indexable,
        dentist_count: count,
        mean_rating: 4.5,
        payload: TopTenPayload {
            top10: vec![],
            avg_review_count: 0,
            generated_at: at,
        },
        updated_at: at,
    }
}

// =============================================================================
// Aggregate view
// =============================================================================

#[tokio::test]
async fn test_view_counts_all_active_and_averages_eligible() {
    let pool = setup_db().await;

    insert_dentist(&pool, &NewDentist::rated("a", "Springfield", "IL", 4.0, 10)).await.unwrap();
    insert_dentist(&pool, &NewDentist::rated("b", "Springfield", "IL", 5.0, 3)).await.unwrap();
    insert_dentist(&pool, &NewDentist::unrated("c", "Springfield", "IL")).await.unwrap();

    // Rating without review count is not ranking-eligible
    let mut half = NewDentist::unrated("d", "Springfield", "IL");
    half.rating = Some(1.0);
    insert_dentist(&pool, &half).await.unwrap();

    // Inactive dentists are not counted at all
    let mut closed = NewDentist::rated("e", "Springfield", "IL", 1.0, 100);
    closed.is_active = false;
    insert_dentist(&pool, &closed).await.unwrap();

    let aggregate = get_city_aggregate(&pool, "Springfield", "il")
        .await
        .unwrap()
        .expect("Springfield should have an aggregate");

    assert_eq!(aggregate.state, "IL");
    assert_eq!(aggregate.dentist_count, 4);
    assert!((aggregate.mean_rating - 4.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_view_skips_rows_without_state() {
    let pool = setup_db().await;

    insert_dentist(&pool, &NewDentist::rated("a", "Austin", "TX", 4.0, 10)).await.unwrap();

    let mut stateless = NewDentist::rated("b", "Austin", "TX", 1.0, 10);
    stateless.state_abbr = None;
    insert_dentist(&pool, &stateless).await.unwrap();

    let mut blank = NewDentist::rated("c", "Austin", "TX", 1.0, 10);
    blank.state_abbr = Some("  ".to_string());
    insert_dentist(&pool, &blank).await.unwrap();

    let aggregates = list_city_aggregates(&pool, 0).await.unwrap();
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].dentist_count, 1);
    assert!((aggregates[0].mean_rating - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_view_ignores_out_of_range_values_in_mean() {
    let pool = setup_db().await;

    insert_dentist(&pool, &NewDentist::rated("a", "Boise", "ID", 4.0, 10)).await.unwrap();
    insert_dentist(&pool, &NewDentist::rated("b", "Boise", "ID", 9.5, 10)).await.unwrap();
    insert_dentist(&pool, &NewDentist::rated("c", "Boise", "ID", 1.0, -4)).await.unwrap();

    let aggregate = get_city_aggregate(&pool, "Boise", "ID").await.unwrap().unwrap();
    assert_eq!(aggregate.dentist_count, 3);
    assert!((aggregate.mean_rating - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_view_omits_cities_without_eligible_dentists() {
    let pool = setup_db().await;

    insert_dentist(&pool, &NewDentist::unrated("a", "Nowhere", "NV")).await.unwrap();
    insert_dentist(&pool, &NewDentist::unrated("b", "Nowhere", "NV")).await.unwrap();

    assert!(get_city_aggregate(&pool, "Nowhere", "NV").await.unwrap().is_none());
    assert!(list_city_aggregates(&pool, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_city_aggregates_applies_minimum() {
    let pool = setup_db().await;

    for i in 0..5 {
        insert_dentist(&pool, &NewDentist::rated(format!("big-{}", i), "Denver", "CO", 4.0, 10))
            .await
            .unwrap();
    }
    for i in 0..4 {
        insert_dentist(&pool, &NewDentist::rated(format!("small-{}", i), "Aspen", "CO", 4.0, 10))
            .await
            .unwrap();
    }

    let aggregates = list_city_aggregates(&pool, 5).await.unwrap();
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].city, "Denver");
}

// =============================================================================
// Rankable dentists
// =============================================================================

#[tokio::test]
async fn test_fetch_rankable_dentists_filters_and_orders_by_id() {
    let pool = setup_db().await;

    let first = insert_dentist(&pool, &NewDentist::rated("a", "Reno", "NV", 4.0, 10)).await.unwrap();
    insert_dentist(&pool, &NewDentist::unrated("b", "Reno", "NV")).await.unwrap();
    let third = insert_dentist(&pool, &NewDentist::rated("c", "Reno", "nv", 3.0, 1)).await.unwrap();
    insert_dentist(&pool, &NewDentist::rated("d", "Sparks", "NV", 5.0, 10)).await.unwrap();

    let dentists = fetch_rankable_dentists(&pool, "Reno", "NV").await.unwrap();
    let ids: Vec<i64> = dentists.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![first, third]);
    assert!(dentists.iter().all(|d| d.is_ranking_eligible()));
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_upsert_updates_in_place() {
    let pool = setup_db().await;

    let mut page = sample_page("best-dentists-springfield-il", "Springfield", "IL", true, 12);
    upsert_page(&pool, &page).await.unwrap();

    page.indexable = false;
    page.dentist_count = 9;
    page.updated_at += Duration::days(1);
    upsert_page(&pool, &page).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "Upsert must never duplicate a slug");

    let stored = get_page_by_slug(&pool, "best-dentists-springfield-il")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, page);
}

#[tokio::test]
async fn test_get_page_by_city_state_is_case_insensitive() {
    let pool = setup_db().await;
    let page = sample_page("best-dentists-salt-lake-city-ut", "Salt Lake City", "UT", true, 30);
    upsert_page(&pool, &page).await.unwrap();

    let found = get_page_by_city_state(&pool, "salt lake city", "ut").await.unwrap();
    assert_eq!(found.map(|p| p.slug), Some(page.slug));

    assert!(get_page_by_city_state(&pool, "Provo", "UT").await.unwrap().is_none());
    assert!(get_page_by_slug(&pool, "best-dentists-provo-ut").await.unwrap().is_none());
}

#[tokio::test]
async fn test_listings_only_include_indexable_pages() {
    let pool = setup_db().await;

    upsert_page(&pool, &sample_page("best-dentists-austin-tx", "Austin", "TX", true, 40)).await.unwrap();
    upsert_page(&pool, &sample_page("best-dentists-dallas-tx", "Dallas", "TX", true, 80)).await.unwrap();
    upsert_page(&pool, &sample_page("best-dentists-waco-tx", "Waco", "TX", false, 8)).await.unwrap();
    upsert_page(&pool, &sample_page("best-dentists-tulsa-ok", "Tulsa", "OK", true, 40)).await.unwrap();

    let sitemap = list_indexable_pages(&pool).await.unwrap();
    let slugs: Vec<&str> = sitemap.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(
        slugs,
        vec!["best-dentists-austin-tx", "best-dentists-dallas-tx", "best-dentists-tulsa-ok"]
    );
    assert_eq!(sitemap[0].path(), "/best-dentists/austin-tx");

    let hub = list_indexable_cities(&pool, Some(2)).await.unwrap();
    let hub_cities: Vec<&str> = hub.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(hub_cities, vec!["Dallas", "Austin"]);

    let all = list_indexable_cities(&pool, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let related = list_related_cities(&pool, "tx", "dallas", 10).await.unwrap();
    let related_cities: Vec<&str> = related.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(related_cities, vec!["Austin"]);
}
