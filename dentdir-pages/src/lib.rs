//! dentdir-pages - Top-10 ranking engine and page materializer
//!
//! Scores dentists with a Bayesian average pulled towards the city mean,
//! keeps the ten best per city, decides whether the city page may be
//! indexed, and upserts the result into the `pages` cache table.

pub mod indexability;
pub mod materializer;
pub mod ranking;
pub mod rating;
pub mod score;

pub use indexability::{evaluate_indexability, GateFailure, IndexabilityThresholds, IndexabilityVerdict};
pub use materializer::{Materializer, MaterializerOptions, PageOutcome, RegenerationReport};
pub use ranking::{build_payload, city_mean, rank_top_ten, TOP_N};
pub use rating::{CityMean, Rating, RatingError};
pub use score::{bayesian_score, bayesian_score_with, BayesianScore, CONFIDENCE_CONSTANT};
