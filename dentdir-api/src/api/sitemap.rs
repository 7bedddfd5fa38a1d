//! Indexable page list for the sitemap generator
//!
//! XML formatting belongs to the consumer; this endpoint only lists paths and
//! modification times.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapItem {
    pub slug: String,
    pub path: String,
    /// Page `updated_at`
    pub last_modified: DateTime<Utc>,
}

/// GET /api/sitemap
pub async fn get_sitemap(State(state): State<AppState>) -> ApiResult<Json<Vec<SitemapItem>>> {
    let entries = state.reader.indexable_pages().await?;

    let items = entries
        .into_iter()
        .map(|entry| SitemapItem {
            path: entry.path(),
            slug: entry.slug,
            last_modified: entry.updated_at,
        })
        .collect();

    Ok(Json(items))
}

/// Build sitemap routes
pub fn sitemap_routes() -> Router<AppState> {
    Router::new().route("/api/sitemap", get(get_sitemap))
}
