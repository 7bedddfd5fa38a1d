//! Bayesian shrinkage score
//!
//! `score = (r * n + C * m) / (n + C)`
//!
//! `r` is the dentist's rating, `n` its review count, `m` the city mean and
//! `C` the confidence constant (pseudo-reviews at the city mean). Few reviews
//! pull the score towards `m`; many reviews leave it close to `r`.
//!
//! The score is kept as an exact rational over fixed-point rating units; with
//! `m = S / k` it is `(r * n * k + C * S) / (k * (n + C))`.
//! Comparisons cross-multiply, so two dentists with mathematically equal
//! scores always compare equal and fall through to the review-count
//! tie-break.

use std::cmp::Ordering;

use crate::rating::{CityMean, Rating, RATING_SCALE};

/// Pseudo-review count shared by every city
pub const CONFIDENCE_CONSTANT: u32 = 20;

/// Exact Bayesian-adjusted rating (`numerator / denominator` rating units)
#[derive(Debug, Clone, Copy)]
pub struct BayesianScore {
    numerator: i128,
    denominator: i128,
}

impl BayesianScore {
    /// Score in stars, for output only
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / (self.denominator * i128::from(RATING_SCALE)) as f64
    }
}

impl PartialEq for BayesianScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BayesianScore {}

impl PartialOrd for BayesianScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BayesianScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are always positive
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

/// Score with the global [`CONFIDENCE_CONSTANT`]
pub fn bayesian_score(
    rating: Rating,
    review_count: u32,
    city_mean: impl Into<CityMean>,
) -> BayesianScore {
    bayesian_score_with(rating, review_count, city_mean, CONFIDENCE_CONSTANT)
}

/// Score with an explicit confidence constant
///
/// With `review_count + confidence == 0` there is no evidence at all and the
/// score is the city mean.
pub fn bayesian_score_with(
    rating: Rating,
    review_count: u32,
    city_mean: impl Into<CityMean>,
    confidence: u32,
) -> BayesianScore {
    let (total, count) = city_mean.into().fraction();
    let r = i128::from(rating.units());
    let s = i128::from(total);
    let k = i128::from(count);
    let n = i128::from(review_count);
    let c = i128::from(confidence);

    if n + c == 0 {
        return BayesianScore {
            numerator: s,
            denominator: k,
        };
    }

    BayesianScore {
        numerator: r * n * k + c * s,
        denominator: k * (n + c),
    }
}
