//! dentdir-api library - cached read API over materialized city pages
//!
//! Handlers only read `pages`; every read goes through the TTL caches in
//! [`reader::PageReader`].

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use dentdir_common::Clock;

pub mod api;
pub mod cache;
pub mod db;
pub mod error;
pub mod reader;

pub use error::{ApiError, ApiResult};
pub use reader::PageReader;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Cached page accessors
    pub reader: Arc<PageReader>,
    /// Time source shared with the caches
    pub clock: Arc<dyn Clock>,
    /// Service start time, for health uptime
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            startup_time: clock.now(),
            reader: Arc::new(PageReader::new(pool, clock.clone())),
            clock,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::page_routes())
        .merge(api::sitemap_routes())
        .merge(api::city_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
