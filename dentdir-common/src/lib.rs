//! # Dentist Directory Common Library
//!
//! Shared code for the page materializer and the read API:
//! - Database schema, models and queries (dentists, city aggregates, pages)
//! - City page slug generation and parsing
//! - Injectable clock
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod slug;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use slug::{generate_slug, parse_city_state_slug, CityState};
