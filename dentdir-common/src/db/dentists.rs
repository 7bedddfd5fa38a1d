//! Dentist record queries

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::{DentistRecord, NewDentist};
use crate::Result;

/// Insert a dentist row, returning its id
pub async fn insert_dentist(pool: &SqlitePool, dentist: &NewDentist) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO dentists (
            slug, name, city, state_abbr, rating, review_count,
            address, phone, photo_url,
            emergency_services, accepting_new_patients, is_active
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&dentist.slug)
    .bind(&dentist.name)
    .bind(&dentist.city)
    .bind(&dentist.state_abbr)
    .bind(dentist.rating)
    .bind(dentist.review_count)
    .bind(&dentist.address)
    .bind(&dentist.phone)
    .bind(&dentist.photo_url)
    .bind(dentist.emergency_services)
    .bind(dentist.accepting_new_patients)
    .bind(dentist.is_active)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Update the quality signals of an existing dentist
pub async fn update_dentist_rating(
    pool: &SqlitePool,
    slug: &str,
    rating: Option<f64>,
    review_count: Option<i64>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE dentists
        SET rating = ?, review_count = ?, updated_at = CURRENT_TIMESTAMP
        WHERE slug = ?
        "#,
    )
    .bind(rating)
    .bind(review_count)
    .bind(slug)
    .execute(pool)
    .await?;

    Ok(())
}

/// Active, ranking-eligible dentists of one city
///
/// Rows lacking `rating` or `review_count` are filtered out here. Ordered by
/// id so that ties the ranking cannot break stay in a stable order.
pub async fn fetch_rankable_dentists(
    pool: &SqlitePool,
    city: &str,
    state: &str,
) -> Result<Vec<DentistRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, slug, name, city, state_abbr, rating, review_count,
               address, phone, photo_url, emergency_services, accepting_new_patients
        FROM dentists
        WHERE is_active = 1
          AND city = ?
          AND UPPER(TRIM(state_abbr)) = UPPER(?)
          AND rating IS NOT NULL
          AND review_count IS NOT NULL
        ORDER BY id
        "#,
    )
    .bind(city)
    .bind(state)
    .fetch_all(pool)
    .await?;

    rows.iter().map(dentist_from_row).collect()
}

fn dentist_from_row(row: &SqliteRow) -> Result<DentistRecord> {
    Ok(DentistRecord {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        state_abbr: row.try_get("state_abbr")?,
        rating: row.try_get("rating")?,
        review_count: row.try_get("review_count")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        photo_url: row.try_get("photo_url")?,
        emergency_services: row.try_get("emergency_services")?,
        accepting_new_patients: row.try_get("accepting_new_patients")?,
    })
}
