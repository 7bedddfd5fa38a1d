//! Materialized page storage
//!
//! [`upsert_page`] is the only write path: a single
//! `INSERT ... ON CONFLICT(slug) DO UPDATE` keyed by the unique slug, so two
//! writers can never produce two rows for one city.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::{CitySummary, PageRecord, SitemapEntry, TopTenPayload};
use crate::Result;

/// Insert the page or replace every column of the existing row for its slug
pub async fn upsert_page(pool: &SqlitePool, page: &PageRecord) -> Result<()> {
    let payload = serde_json::to_string(&page.payload)?;

    sqlx::query(
        r#"
        INSERT INTO pages (
            slug, city, state, indexable, dentist_count, mean_rating, payload, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET
            city = excluded.city,
            state = excluded.state,
            indexable = excluded.indexable,
            dentist_count = excluded.dentist_count,
            mean_rating = excluded.mean_rating,
            payload = excluded.payload,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&page.slug)
    .bind(&page.city)
    .bind(&page.state)
    .bind(page.indexable)
    .bind(page.dentist_count)
    .bind(page.mean_rating)
    .bind(payload)
    .bind(page.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a page by its slug
pub async fn get_page_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<PageRecord>> {
    let row = sqlx::query(
        r#"
        SELECT slug, city, state, indexable, dentist_count, mean_rating, payload, updated_at
        FROM pages
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(page_from_row).transpose()
}

/// Load a page by city and state (case-insensitive)
pub async fn get_page_by_city_state(
    pool: &SqlitePool,
    city: &str,
    state: &str,
) -> Result<Option<PageRecord>> {
    let row = sqlx::query(
        r#"
        SELECT slug, city, state, indexable, dentist_count, mean_rating, payload, updated_at
        FROM pages
        WHERE LOWER(city) = LOWER(?) AND state = UPPER(?)
        ORDER BY slug
        LIMIT 1
        "#,
    )
    .bind(city)
    .bind(state)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(page_from_row).transpose()
}

/// Every indexable page, for the sitemap
pub async fn list_indexable_pages(pool: &SqlitePool) -> Result<Vec<SitemapEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT slug, updated_at
        FROM pages
        WHERE indexable = 1
        ORDER BY slug
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(SitemapEntry {
                slug: row.try_get("slug")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .collect()
}

/// Indexable cities ordered by dentist count (largest first), then name
pub async fn list_indexable_cities(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> Result<Vec<CitySummary>> {
    let rows = sqlx::query(
        r#"
        SELECT slug, city, state, dentist_count, mean_rating
        FROM pages
        WHERE indexable = 1
        ORDER BY dentist_count DESC, city ASC, state ASC
        LIMIT ?
        "#,
    )
    // SQLite treats a negative LIMIT as "no limit"
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    rows.iter().map(summary_from_row).collect()
}

/// Indexable cities of one state other than `exclude_city`
pub async fn list_related_cities(
    pool: &SqlitePool,
    state: &str,
    exclude_city: &str,
    limit: i64,
) -> Result<Vec<CitySummary>> {
    let rows = sqlx::query(
        r#"
        SELECT slug, city, state, dentist_count, mean_rating
        FROM pages
        WHERE indexable = 1
          AND state = UPPER(?)
          AND LOWER(city) <> LOWER(?)
        ORDER BY dentist_count DESC, city ASC
        LIMIT ?
        "#,
    )
    .bind(state)
    .bind(exclude_city)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(summary_from_row).collect()
}

fn page_from_row(row: &SqliteRow) -> Result<PageRecord> {
    let payload: String = row.try_get("payload")?;
    let payload: TopTenPayload = serde_json::from_str(&payload)?;

    Ok(PageRecord {
        slug: row.try_get("slug")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        indexable: row.try_get("indexable")?,
        dentist_count: row.try_get("dentist_count")?,
        mean_rating: row.try_get("mean_rating")?,
        payload,
        updated_at: row.try_get("updated_at")?,
    })
}

fn summary_from_row(row: &SqliteRow) -> Result<CitySummary> {
    Ok(CitySummary {
        slug: row.try_get("slug")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        dentist_count: row.try_get("dentist_count")?,
        mean_rating: row.try_get("mean_rating")?,
    })
}
