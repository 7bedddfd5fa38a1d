//! City page quality gate
//!
//! A city page is offered to search engines only when every gate passes:
//! - at least 10 active dentists in the city
//! - at least 8 ranked entries in the top-10
//! - average review count of the top-10 of at least 5
//! - city mean rating of at least 4.0, compared exactly
//!
//! The gate is conjunctive; there is no partial credit. A page that fails is
//! still materialized, just with `indexable = false`.

use std::fmt;

use serde::Serialize;

use dentdir_common::db::TopTenPayload;

use crate::rating::{CityMean, Rating};

pub const MIN_DENTIST_COUNT: i64 = 10;
pub const MIN_RANKED_DENTISTS: usize = 8;
pub const MIN_AVG_REVIEW_COUNT: i64 = 5;
pub const MIN_MEAN_RATING: Rating = Rating::whole_stars(4);

/// Gate thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexabilityThresholds {
    pub min_dentist_count: i64,
    pub min_ranked_dentists: usize,
    pub min_avg_review_count: i64,
    pub min_mean_rating: Rating,
}

impl Default for IndexabilityThresholds {
    fn default() -> Self {
        Self {
            min_dentist_count: MIN_DENTIST_COUNT,
            min_ranked_dentists: MIN_RANKED_DENTISTS,
            min_avg_review_count: MIN_AVG_REVIEW_COUNT,
            min_mean_rating: MIN_MEAN_RATING,
        }
    }
}

/// One failed gate, with the observed value and the bound it missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFailure {
    TooFewDentists { count: i64, required: i64 },
    TooFewRanked { ranked: usize, required: usize },
    TooFewReviews { avg_review_count: i64, required: i64 },
    LowMeanRating { mean_rating: CityMean, required: Rating },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::TooFewDentists { count, required } => {
                write!(f, "{} dentists (need {})", count, required)
            }
            GateFailure::TooFewRanked { ranked, required } => {
                write!(f, "{} ranked dentists (need {})", ranked, required)
            }
            GateFailure::TooFewReviews {
                avg_review_count,
                required,
            } => write!(f, "average {} reviews (need {})", avg_review_count, required),
            GateFailure::LowMeanRating {
                mean_rating,
                required,
            } => write!(f, "mean rating {} (need {})", mean_rating, required),
        }
    }
}

/// Outcome of the gate for one city
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndexabilityVerdict {
    pub failures: Vec<GateFailure>,
}

impl IndexabilityVerdict {
    pub fn is_indexable(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for IndexabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "indexable");
        }
        let reasons: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        write!(f, "not indexable: {}", reasons.join(", "))
    }
}

impl IndexabilityThresholds {
    /// Check every gate, collecting all failures
    pub fn evaluate(
        &self,
        dentist_count: i64,
        mean_rating: impl Into<CityMean>,
        payload: &TopTenPayload,
    ) -> IndexabilityVerdict {
        let mean_rating = mean_rating.into();
        let mut failures = Vec::new();

        if dentist_count < self.min_dentist_count {
            failures.push(GateFailure::TooFewDentists {
                count: dentist_count,
                required: self.min_dentist_count,
            });
        }

        let ranked = payload.top10.len();
        if ranked < self.min_ranked_dentists {
            failures.push(GateFailure::TooFewRanked {
                ranked,
                required: self.min_ranked_dentists,
            });
        }

        if payload.avg_review_count < self.min_avg_review_count {
            failures.push(GateFailure::TooFewReviews {
                avg_review_count: payload.avg_review_count,
                required: self.min_avg_review_count,
            });
        }

        if mean_rating < CityMean::from(self.min_mean_rating) {
            failures.push(GateFailure::LowMeanRating {
                mean_rating,
                required: self.min_mean_rating,
            });
        }

        IndexabilityVerdict { failures }
    }
}

/// Evaluate with the default thresholds
pub fn evaluate_indexability(
    dentist_count: i64,
    mean_rating: impl Into<CityMean>,
    payload: &TopTenPayload,
) -> IndexabilityVerdict {
    IndexabilityThresholds::default().evaluate(dentist_count, mean_rating, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dentdir_common::db::ScoredDentist;

    fn payload(ranked: usize, avg_review_count: i64) -> TopTenPayload {
        let entry = |id: usize| ScoredDentist {
            id: id as i64,
            slug: format!("d-{}", id),
            name: format!("D {}", id),
            rating: 4.5,
            review_count: avg_review_count,
            score: 4.4,
            address: None,
            phone: None,
            photo_url: None,
            emergency_services: false,
            accepting_new_patients: false,
        };
        TopTenPayload {
            top10: (0..ranked).map(entry).collect(),
            avg_review_count,
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn rating(value: f64) -> Rating {
        Rating::from_f64(value).unwrap()
    }

    #[test]
    fn test_min_mean_rating_is_four_stars() {
        assert_eq!(MIN_MEAN_RATING, rating(4.0));
    }

    #[test]
    fn test_all_gates_at_bound_pass() {
        let verdict = evaluate_indexability(10, rating(4.0), &payload(8, 5));
        assert!(verdict.is_indexable(), "{}", verdict);
        assert_eq!(verdict.to_string(), "indexable");
    }

    #[test]
    fn test_each_gate_flips_alone() {
        let good = evaluate_indexability(25, rating(4.6), &payload(10, 40));
        assert!(good.is_indexable());

        let few_dentists = evaluate_indexability(9, rating(4.6), &payload(10, 40));
        assert_eq!(
            few_dentists.failures,
            vec![GateFailure::TooFewDentists { count: 9, required: 10 }]
        );

        let few_ranked = evaluate_indexability(25, rating(4.6), &payload(7, 40));
        assert_eq!(
            few_ranked.failures,
            vec![GateFailure::TooFewRanked { ranked: 7, required: 8 }]
        );

        let few_reviews = evaluate_indexability(25, rating(4.6), &payload(10, 4));
        assert_eq!(
            few_reviews.failures,
            vec![GateFailure::TooFewReviews { avg_review_count: 4, required: 5 }]
        );

        let low_rating = evaluate_indexability(25, rating(3.9999), &payload(10, 40));
        assert_eq!(
            low_rating.failures,
            vec![GateFailure::LowMeanRating {
                mean_rating: rating(3.9999).into(),
                required: rating(4.0)
            }]
        );
    }

    #[test]
    fn test_mean_just_below_four_fails() {
        let ratings = std::iter::repeat(rating(4.0)).take(9).chain([rating(3.9996)]);
        let mean = CityMean::from_ratings(ratings);

        let verdict = evaluate_indexability(10, mean, &payload(10, 50));
        assert_eq!(verdict.failures.len(), 1);
        assert!(matches!(verdict.failures[0], GateFailure::LowMeanRating { .. }));
        assert!(verdict.to_string().ends_with("mean rating 3.99996 (need 4.00)"));
    }

    #[test]
    fn test_city_with_nine_dentists_fails_on_count_only() {
        let verdict = evaluate_indexability(9, rating(4.5), &payload(9, 20));
        assert!(!verdict.is_indexable());
        assert_eq!(verdict.failures.len(), 1);
        assert!(matches!(verdict.failures[0], GateFailure::TooFewDentists { .. }));
    }

    #[test]
    fn test_low_review_volume_fails_on_reviews_only() {
        let verdict = evaluate_indexability(15, rating(4.3), &payload(9, 3));
        assert!(!verdict.is_indexable());
        assert_eq!(
            verdict.failures,
            vec![GateFailure::TooFewReviews { avg_review_count: 3, required: 5 }]
        );
    }

    #[test]
    fn test_all_failures_reported() {
        let verdict = evaluate_indexability(2, rating(2.0), &payload(1, 1));
        assert_eq!(verdict.failures.len(), 4);
        assert_eq!(
            verdict.to_string(),
            "not indexable: 2 dentists (need 10), 1 ranked dentists (need 8), \
             average 1 reviews (need 5), mean rating 2 (need 4.00)"
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let relaxed = IndexabilityThresholds {
            min_dentist_count: 3,
            min_ranked_dentists: 2,
            ..IndexabilityThresholds::default()
        };
        assert!(relaxed.evaluate(3, rating(4.1), &payload(2, 9)).is_indexable());
    }
}
