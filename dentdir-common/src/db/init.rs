//! Database initialization
//!
//! Creates the schema idempotently: `CREATE ... IF NOT EXISTS` is safe to run
//! on every startup of either binary.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets API readers proceed while the materializer writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Limited to one connection: every SQLite `:memory:` connection is its own
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables, indexes and views
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_dentists_table(pool).await?;
    create_city_dentist_stats_view(pool).await?;
    create_pages_table(pool).await?;
    Ok(())
}

async fn create_dentists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dentists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            state_abbr TEXT,
            rating REAL,
            review_count INTEGER,
            address TEXT,
            phone TEXT,
            photo_url TEXT,
            emergency_services INTEGER NOT NULL DEFAULT 0,
            accepting_new_patients INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_dentists_city_state ON dentists(state_abbr, city)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Per (city, state) aggregate over active dentists
///
/// Rows without a state are invalid input and never aggregated. The mean only
/// covers ranking-eligible dentists with in-range values; cities without any
/// such dentist have no row.
async fn create_city_dentist_stats_view(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS city_dentist_stats AS
        SELECT
            city,
            UPPER(TRIM(state_abbr)) AS state,
            COUNT(*) AS dentist_count,
            CAST(COALESCE(AVG(
                CASE
                    WHEN rating BETWEEN 0 AND 5 AND review_count >= 0 THEN rating
                END
            ), 0) AS REAL) AS mean_rating
        FROM dentists
        WHERE is_active = 1
          AND state_abbr IS NOT NULL
          AND TRIM(state_abbr) <> ''
          AND TRIM(city) <> ''
        GROUP BY city, UPPER(TRIM(state_abbr))
        HAVING COUNT(
            CASE
                WHEN rating BETWEEN 0 AND 5 AND review_count >= 0 THEN 1
            END
        ) > 0
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_pages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pages (
            slug TEXT PRIMARY KEY,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            indexable INTEGER NOT NULL DEFAULT 0,
            dentist_count INTEGER NOT NULL,
            mean_rating REAL NOT NULL,
            payload TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pages_state ON pages(state, indexable)")
        .execute(pool)
        .await?;

    Ok(())
}
