//! City page lookups
//!
//! Non-indexable pages are still served, with `X-Robots-Tag: noindex` so the
//! renderer and crawlers keep them out of search results.

use axum::{
    extract::{Path, State},
    http::{header::HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::debug;

use dentdir_common::db::PageRecord;
use dentdir_common::parse_city_state_slug;
use dentdir_common::slug::SLUG_PREFIX;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Header marking non-indexable pages
pub const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// GET /api/pages/:slug
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    if !slug.starts_with(SLUG_PREFIX) || parse_city_state_slug(&slug).is_none() {
        debug!("Malformed page slug: {}", slug);
        return Err(ApiError::NotFound(format!("page {}", slug)));
    }

    let page = state
        .reader
        .page_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("page {}", slug)))?;

    Ok(page_response(page))
}

/// GET /api/cities/:state/:city
pub async fn get_city_page(
    State(state): State<AppState>,
    Path((state_abbr, city)): Path<(String, String)>,
) -> ApiResult<Response> {
    let page = state
        .reader
        .page_by_city_state(&city, &state_abbr)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("page for {}, {}", city, state_abbr)))?;

    Ok(page_response(page))
}

/// JSON page body, tagged noindex when the page failed the quality gate
pub fn page_response(page: PageRecord) -> Response {
    let indexable = page.indexable;
    let mut response = Json(page).into_response();
    if !indexable {
        response
            .headers_mut()
            .insert(X_ROBOTS_TAG, HeaderValue::from_static("noindex"));
    }
    response
}

/// Build page lookup routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pages/:slug", get(get_page))
        .route("/api/cities/:state/:city", get(get_city_page))
}
