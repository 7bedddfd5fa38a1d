//! Per-city top-10 ranking
//!
//! Only dentists with both a rating and a review count take part. Entries are
//! ordered by score (highest first), then by review count (most first). The
//! sort is stable, so anything still tied keeps the store order (by id) and
//! the ranking is identical on every run over the same data.

use chrono::{DateTime, Utc};
use tracing::warn;

use dentdir_common::db::{DentistRecord, ScoredDentist, TopTenPayload};

use crate::rating::{CityMean, Rating};
use crate::score::{bayesian_score, BayesianScore};

/// Maximum number of entries on a city page
pub const TOP_N: usize = 10;

struct Candidate<'a> {
    dentist: &'a DentistRecord,
    rating: Rating,
    review_count: u32,
    score: BayesianScore,
}

/// Rank a city's dentists and keep the best [`TOP_N`]
///
/// Dentists missing either quality signal are left out, never scored as zero.
/// Rows with an out-of-range rating or review count are logged and skipped.
pub fn rank_top_ten(
    dentists: &[DentistRecord],
    city_mean: impl Into<CityMean>,
) -> Vec<ScoredDentist> {
    let city_mean = city_mean.into();
    let mut candidates: Vec<Candidate<'_>> = dentists
        .iter()
        .filter_map(|dentist| candidate(dentist, city_mean))
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.review_count.cmp(&a.review_count))
    });
    candidates.truncate(TOP_N);

    candidates
        .into_iter()
        .map(|c| ScoredDentist {
            id: c.dentist.id,
            slug: c.dentist.slug.clone(),
            name: c.dentist.name.clone(),
            rating: c.rating.as_f64(),
            review_count: i64::from(c.review_count),
            score: c.score.as_f64(),
            address: c.dentist.address.clone(),
            phone: c.dentist.phone.clone(),
            photo_url: c.dentist.photo_url.clone(),
            emergency_services: c.dentist.emergency_services,
            accepting_new_patients: c.dentist.accepting_new_patients,
        })
        .collect()
}

/// Exact mean rating over the dentists that [`rank_top_ten`] would score
pub fn city_mean(dentists: &[DentistRecord]) -> CityMean {
    CityMean::from_ratings(
        dentists
            .iter()
            .filter_map(|dentist| quality_signals(dentist).and_then(Result::ok))
            .map(|(rating, _)| rating),
    )
}

/// Rating and review count of a dentist; `None` when either is missing,
/// `Some(Err)` when a present value is unusable
fn quality_signals(dentist: &DentistRecord) -> Option<Result<(Rating, u32), String>> {
    let (raw_rating, raw_reviews) = match (dentist.rating, dentist.review_count) {
        (Some(rating), Some(reviews)) => (rating, reviews),
        _ => return None,
    };

    let rating = match Rating::from_f64(raw_rating) {
        Ok(rating) => rating,
        Err(e) => return Some(Err(format!("invalid rating: {}", e))),
    };

    match u32::try_from(raw_reviews) {
        Ok(review_count) => Some(Ok((rating, review_count))),
        Err(_) => Some(Err(format!("invalid review count {}", raw_reviews))),
    }
}

fn candidate(dentist: &DentistRecord, city_mean: CityMean) -> Option<Candidate<'_>> {
    let (rating, review_count) = match quality_signals(dentist)? {
        Ok(signals) => signals,
        Err(reason) => {
            warn!(dentist = %dentist.slug, "Skipping dentist: {}", reason);
            return None;
        }
    };

    Some(Candidate {
        dentist,
        rating,
        review_count,
        score: bayesian_score(rating, review_count, city_mean),
    })
}

/// Wrap a ranked list into the stored payload
///
/// `avg_review_count` is the mean review count of the listed entries,
/// rounded half up; 0 for an empty list.
pub fn build_payload(top10: Vec<ScoredDentist>, generated_at: DateTime<Utc>) -> TopTenPayload {
    let avg_review_count = if top10.is_empty() {
        0
    } else {
        let total: i64 = top10.iter().map(|d| d.review_count).sum();
        let len = top10.len() as i64;
        (2 * total + len) / (2 * len)
    };

    TopTenPayload {
        top10,
        avg_review_count,
        generated_at,
    }
}
