//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::page_path;

/// Dental practice row from the `dentists` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DentistRecord {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub city: String,
    pub state_abbr: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub emergency_services: bool,
    pub accepting_new_patients: bool,
}

impl DentistRecord {
    /// Both quality signals are present
    pub fn is_ranking_eligible(&self) -> bool {
        self.rating.is_some() && self.review_count.is_some()
    }
}

/// Insertable dentist row (import fixtures, seeding)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDentist {
    pub slug: String,
    pub name: String,
    pub city: String,
    pub state_abbr: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub emergency_services: bool,
    pub accepting_new_patients: bool,
    pub is_active: bool,
}

impl NewDentist {
    /// Active dentist with both quality signals set
    pub fn rated(
        slug: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        rating: f64,
        review_count: i64,
    ) -> Self {
        let slug = slug.into();
        Self {
            name: format!("Practice {}", slug),
            slug,
            city: city.into(),
            state_abbr: Some(state.into()),
            rating: Some(rating),
            review_count: Some(review_count),
            is_active: true,
            ..Self::default()
        }
    }

    /// Active dentist without rating data
    pub fn unrated(
        slug: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        Self {
            name: format!("Practice {}", slug),
            slug,
            city: city.into(),
            state_abbr: Some(state.into()),
            is_active: true,
            ..Self::default()
        }
    }
}

/// Row of the `city_dentist_stats` view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    pub city: String,
    pub state: String,
    /// All active dentists in the city, rated or not
    pub dentist_count: i64,
    /// Mean rating over ranking-eligible dentists (0 if none)
    pub mean_rating: f64,
}

/// One ranked entry of a city's top-10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDentist {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub rating: f64,
    pub review_count: i64,
    /// Bayesian-adjusted rating used for ordering
    pub score: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub emergency_services: bool,
    pub accepting_new_patients: bool,
}

/// Ranked result for one city, stored as the page payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTenPayload {
    pub top10: Vec<ScoredDentist>,
    pub avg_review_count: i64,
    pub generated_at: DateTime<Utc>,
}

/// Materialized city page from the `pages` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub slug: String,
    pub city: String,
    pub state: String,
    pub indexable: bool,
    pub dentist_count: i64,
    pub mean_rating: f64,
    pub payload: TopTenPayload,
    pub updated_at: DateTime<Utc>,
}

/// City listing entry for hub, state and related-city links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub slug: String,
    pub city: String,
    pub state: String,
    pub dentist_count: i64,
    pub mean_rating: f64,
}

/// Indexable page as seen by the sitemap generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

impl SitemapEntry {
    /// Public URL path of the page (`/best-dentists/<city>-<state>`)
    pub fn path(&self) -> String {
        page_path(&self.slug)
    }
}
