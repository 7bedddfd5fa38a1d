//! Reads from the `city_dentist_stats` view

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::CityAggregate;
use crate::Result;

/// Cities with at least `min_dentist_count` active dentists, by state then city
pub async fn list_city_aggregates(
    pool: &SqlitePool,
    min_dentist_count: i64,
) -> Result<Vec<CityAggregate>> {
    let rows = sqlx::query(
        r#"
        SELECT city, state, dentist_count, mean_rating
        FROM city_dentist_stats
        WHERE dentist_count >= ?
        ORDER BY state, city
        "#,
    )
    .bind(min_dentist_count)
    .fetch_all(pool)
    .await?;

    rows.iter().map(aggregate_from_row).collect()
}

/// Aggregate for a single city, if it has any ranking-eligible dentist
pub async fn get_city_aggregate(
    pool: &SqlitePool,
    city: &str,
    state: &str,
) -> Result<Option<CityAggregate>> {
    let row = sqlx::query(
        r#"
        SELECT city, state, dentist_count, mean_rating
        FROM city_dentist_stats
        WHERE LOWER(city) = LOWER(?) AND state = UPPER(?)
        "#,
    )
    .bind(city)
    .bind(state)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(aggregate_from_row).transpose()
}

fn aggregate_from_row(row: &SqliteRow) -> Result<CityAggregate> {
    Ok(CityAggregate {
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        dentist_count: row.try_get("dentist_count")?,
        mean_rating: row.try_get("mean_rating")?,
    })
}
