//! Cached read accessors over materialized pages
//!
//! Every accessor goes through a [`TtlCache`]. Store errors are returned to
//! the caller as-is and never replaced with a stale value.

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::SqlitePool;

use dentdir_common::db::{
    get_page_by_city_state, get_page_by_slug, list_indexable_cities, list_indexable_pages,
    list_related_cities, CitySummary, PageRecord, SitemapEntry,
};
use dentdir_common::{Clock, Error, Result};

use crate::cache::{TtlCache, AGGREGATE_TTL, PAGE_TTL, SITEMAP_TTL};

/// Upper bound on listing sizes requested by callers
pub const MAX_LISTING_LIMIT: i64 = 100;

/// Read-only page access shared by all request handlers
pub struct PageReader {
    pool: SqlitePool,
    by_slug: TtlCache<String, Option<PageRecord>>,
    by_city_state: TtlCache<(String, String), Option<PageRecord>>,
    sitemap: TtlCache<(), Vec<SitemapEntry>>,
    hub: TtlCache<i64, Vec<CitySummary>>,
    by_state: TtlCache<(), BTreeMap<String, Vec<CitySummary>>>,
    related: TtlCache<(String, String, i64), Vec<CitySummary>>,
}

impl PageReader {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            by_slug: TtlCache::new(PAGE_TTL, clock.clone()),
            by_city_state: TtlCache::new(PAGE_TTL, clock.clone()),
            sitemap: TtlCache::new(SITEMAP_TTL, clock.clone()),
            hub: TtlCache::new(AGGREGATE_TTL, clock.clone()),
            by_state: TtlCache::new(AGGREGATE_TTL, clock.clone()),
            related: TtlCache::new(AGGREGATE_TTL, clock),
        }
    }

    /// Page for a slug, if materialized
    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<PageRecord>> {
        self.by_slug
            .get_or_try_fetch(slug.to_string(), || get_page_by_slug(&self.pool, slug))
            .await
    }

    /// Page for a city/state pair (case-insensitive), if materialized
    pub async fn page_by_city_state(&self, city: &str, state: &str) -> Result<Option<PageRecord>> {
        let key = (city.trim().to_lowercase(), state.trim().to_uppercase());
        self.by_city_state
            .get_or_try_fetch(key, || get_page_by_city_state(&self.pool, city.trim(), state.trim()))
            .await
    }

    /// Slugs and modification times of every indexable page
    pub async fn indexable_pages(&self) -> Result<Vec<SitemapEntry>> {
        self.sitemap
            .get_or_try_fetch((), || list_indexable_pages(&self.pool))
            .await
    }

    /// Largest indexable cities, by dentist count
    pub async fn top_cities_for_hub(&self, limit: i64) -> Result<Vec<CitySummary>> {
        let limit = clamp_limit(limit);
        self.hub
            .get_or_try_fetch(limit, || list_indexable_cities(&self.pool, Some(limit)))
            .await
    }

    /// Indexable cities grouped by state abbreviation
    pub async fn cities_by_state(&self) -> Result<BTreeMap<String, Vec<CitySummary>>> {
        self.by_state
            .get_or_try_fetch((), || async {
                let cities = list_indexable_cities(&self.pool, None).await?;
                let mut grouped: BTreeMap<String, Vec<CitySummary>> = BTreeMap::new();
                for city in cities {
                    grouped.entry(city.state.clone()).or_default().push(city);
                }
                Ok::<_, Error>(grouped)
            })
            .await
    }

    /// Other indexable cities in the same state
    pub async fn related_cities(
        &self,
        state: &str,
        exclude_city: &str,
        limit: i64,
    ) -> Result<Vec<CitySummary>> {
        let limit = clamp_limit(limit);
        let key = (
            state.trim().to_uppercase(),
            exclude_city.trim().to_lowercase(),
            limit,
        );
        self.related
            .get_or_try_fetch(key, || {
                list_related_cities(&self.pool, state.trim(), exclude_city.trim(), limit)
            })
            .await
    }
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LISTING_LIMIT)
}
