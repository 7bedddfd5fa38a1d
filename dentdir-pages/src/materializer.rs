//! Page materializer
//!
//! Batch job that recomputes every city page. Each city is ranked, gated and
//! upserted on its own; a failing city is logged and counted, and the run
//! moves on. Nothing spans cities, so a run that dies halfway leaves every
//! page either at its old or at its new version, and re-running converges.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use dentdir_common::db::{
    fetch_rankable_dentists, get_city_aggregate, list_city_aggregates, upsert_page,
    CityAggregate, PageRecord,
};
use dentdir_common::{generate_slug, Clock, Error, Result};

use crate::indexability::{IndexabilityThresholds, IndexabilityVerdict};
use crate::ranking::{build_payload, city_mean, rank_top_ten};

/// Cities below this many active dentists are not materialized at all.
/// Looser than the indexability gate so borderline cities get a
/// (non-indexable) page ahead of promotion.
pub const MIN_MATERIALIZE_DENTISTS: i64 = 5;

/// Tunables for a materializer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializerOptions {
    pub min_city_dentists: i64,
    pub thresholds: IndexabilityThresholds,
}

impl Default for MaterializerOptions {
    fn default() -> Self {
        Self {
            min_city_dentists: MIN_MATERIALIZE_DENTISTS,
            thresholds: IndexabilityThresholds::default(),
        }
    }
}

/// Summary of a full regeneration run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegenerationReport {
    /// Pages written with `indexable = true`
    pub indexable_count: usize,
    /// Pages written with `indexable = false`
    pub skipped_count: usize,
    /// Cities that could not be materialized
    pub failed_count: usize,
}

impl RegenerationReport {
    pub fn pages_written(&self) -> usize {
        self.indexable_count + self.skipped_count
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

/// Result of materializing one city
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    pub slug: String,
    pub verdict: IndexabilityVerdict,
}

impl PageOutcome {
    pub fn is_indexable(&self) -> bool {
        self.verdict.is_indexable()
    }
}

/// Sole writer of the `pages` table
pub struct Materializer {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    options: MaterializerOptions,
}

impl Materializer {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            clock,
            options: MaterializerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MaterializerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MaterializerOptions {
        &self.options
    }

    /// Recompute and upsert the page of every qualifying city
    ///
    /// Returns an error only when the candidate cities cannot be listed;
    /// per-city failures are counted in the report. Two spellings of a city
    /// that map to one slug ("St. Louis" and "St Louis") never overwrite each
    /// other: the first in view order (state, then city) owns the page and
    /// the others count as failures.
    pub async fn regenerate_pages(&self) -> Result<RegenerationReport> {
        let cities = list_city_aggregates(&self.pool, self.options.min_city_dentists).await?;
        info!(
            "Regenerating pages for {} cities (>= {} dentists)",
            cities.len(),
            self.options.min_city_dentists
        );

        let mut report = RegenerationReport::default();
        let mut claimed_slugs = HashSet::new();
        for aggregate in &cities {
            let result = match generate_slug(&aggregate.city, &aggregate.state) {
                Ok(slug) if !claimed_slugs.insert(slug.clone()) => {
                    Err(Error::InvalidInput(format!(
                        "slug {} already written this run by another spelling of the city",
                        slug
                    )))
                }
                Ok(slug) => self.materialize_city(aggregate, slug).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(outcome) if outcome.is_indexable() => report.indexable_count += 1,
                Ok(_) => report.skipped_count += 1,
                Err(e) => {
                    warn!(
                        city = %aggregate.city,
                        state = %aggregate.state,
                        "Failed to materialize city page: {}",
                        e
                    );
                    report.failed_count += 1;
                }
            }
        }

        info!(
            "Page regeneration complete: {} indexable, {} not indexable, {} failed",
            report.indexable_count, report.skipped_count, report.failed_count
        );

        Ok(report)
    }

    /// Recompute a single city's page
    ///
    /// `Ok(None)` when the city has no aggregate or is below the
    /// materialization threshold.
    pub async fn regenerate_city(&self, city: &str, state: &str) -> Result<Option<PageOutcome>> {
        let aggregate = match get_city_aggregate(&self.pool, city, state).await? {
            Some(aggregate) => aggregate,
            None => {
                info!("No rated dentists for {}, {}; nothing to materialize", city, state);
                return Ok(None);
            }
        };

        if aggregate.dentist_count < self.options.min_city_dentists {
            info!(
                "{}, {} has {} dentists (< {}); not materialized",
                aggregate.city,
                aggregate.state,
                aggregate.dentist_count,
                self.options.min_city_dentists
            );
            return Ok(None);
        }

        let slug = generate_slug(&aggregate.city, &aggregate.state)?;
        self.materialize_city(&aggregate, slug).await.map(Some)
    }

    async fn materialize_city(
        &self,
        aggregate: &CityAggregate,
        slug: String,
    ) -> Result<PageOutcome> {

        let dentists =
            fetch_rankable_dentists(&self.pool, &aggregate.city, &aggregate.state).await?;
        // Recomputed exactly from the same rows; the view's AVG() is a float
        let mean_rating = city_mean(&dentists);
        let top10 = rank_top_ten(&dentists, mean_rating);

        let now = self.clock.now();
        let payload = build_payload(top10, now);
        let verdict = self
            .options
            .thresholds
            .evaluate(aggregate.dentist_count, mean_rating, &payload);

        debug!(slug = %slug, ranked = payload.top10.len(), "{}", verdict);

        let page = PageRecord {
            slug: slug.clone(),
            city: aggregate.city.clone(),
            state: aggregate.state.to_ascii_uppercase(),
            indexable: verdict.is_indexable(),
            dentist_count: aggregate.dentist_count,
            mean_rating: mean_rating.as_f64(),
            payload,
            updated_at: now,
        };
        upsert_page(&self.pool, &page).await?;

        Ok(PageOutcome { slug, verdict })
    }
}
