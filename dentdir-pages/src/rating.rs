//! Fixed-point star ratings
//!
//! Ratings arrive from the store as `f64`. They are converted once, at the
//! edge, to an integer count of 1/10000 stars so that scoring and ordering
//! never depend on floating-point rounding. A value that does not sit on that
//! grid is rejected rather than rounded.
//!
//! A city mean is not on the grid in general, so [`CityMean`] keeps it as an
//! exact fraction (total units / number of ratings).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point units per star
pub const RATING_SCALE: u32 = 10_000;

/// Largest distance from the 1/10000 grid still treated as `f64` noise
const GRID_TOLERANCE: f64 = 1e-6;

/// Highest valid rating (5.0 stars)
pub const MAX_RATING: Rating = Rating(5 * RATING_SCALE);

/// Rejected rating values
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RatingError {
    #[error("rating is not a finite number")]
    NotFinite,

    #[error("rating {0} is outside 0.0..=5.0")]
    OutOfRange(f64),

    #[error("rating {0} is finer than 1/10000 of a star")]
    TooPrecise(f64),
}

/// A star rating in 0.0..=5.0, stored as 1/10000 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u32);

impl Rating {
    pub const ZERO: Rating = Rating(0);

    /// Whole-star rating, clamped to 5 stars
    pub const fn whole_stars(stars: u32) -> Rating {
        let stars = if stars > 5 { 5 } else { stars };
        Rating(stars * RATING_SCALE)
    }

    /// Convert a store value on the 1/10000 star grid
    ///
    /// `4.7` is accepted even though `4.7 * 10000` is not an exact integer in
    /// `f64`; `3.99996` is rejected.
    pub fn from_f64(value: f64) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotFinite);
        }

        let scaled = value * f64::from(RATING_SCALE);
        let units = scaled.round();
        if units < 0.0 || units > f64::from(MAX_RATING.0) {
            return Err(RatingError::OutOfRange(value));
        }
        if (scaled - units).abs() > GRID_TOLERANCE {
            return Err(RatingError::TooPrecise(value));
        }

        Ok(Rating(units as u32))
    }

    /// Build from whole fixed-point units (`45_000` is 4.5 stars)
    pub fn from_units(units: u32) -> Result<Self, RatingError> {
        if units > MAX_RATING.0 {
            return Err(RatingError::OutOfRange(
                f64::from(units) / f64::from(RATING_SCALE),
            ));
        }
        Ok(Rating(units))
    }

    pub fn units(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(RATING_SCALE)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

/// Exact arithmetic mean of a set of ratings
///
/// Compared by cross-multiplication. The mean of no ratings is zero.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CityMean {
    total_units: u64,
    count: u64,
}

impl CityMean {
    pub const ZERO: CityMean = CityMean {
        total_units: 0,
        count: 0,
    };

    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        ratings
            .into_iter()
            .fold(CityMean::ZERO, |mean, rating| CityMean {
                total_units: mean.total_units + u64::from(rating.units()),
                count: mean.count + 1,
            })
    }

    /// Sum of the rating units and number of ratings, with `0/0` read as `0/1`
    pub fn fraction(self) -> (u64, u64) {
        if self.count == 0 {
            (0, 1)
        } else {
            (self.total_units, self.count)
        }
    }

    pub fn count(self) -> u64 {
        self.count
    }

    /// Mean in stars, for output only
    pub fn as_f64(self) -> f64 {
        let (total, count) = self.fraction();
        total as f64 / (count as f64 * f64::from(RATING_SCALE))
    }
}

impl From<Rating> for CityMean {
    fn from(rating: Rating) -> Self {
        CityMean {
            total_units: u64::from(rating.units()),
            count: 1,
        }
    }
}

impl PartialEq for CityMean {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CityMean {}

impl PartialOrd for CityMean {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CityMean {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = self.fraction();
        let (c, d) = other.fraction();
        (u128::from(a) * u128::from(d)).cmp(&(u128::from(c) * u128::from(b)))
    }
}

impl fmt::Display for CityMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl TryFrom<f64> for Rating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::from_f64(value)
    }
}
