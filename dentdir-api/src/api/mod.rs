//! HTTP API handlers for dentdir-api
//!
//! All routes are read-only views over materialized pages.

pub mod cities;
pub mod health;
pub mod pages;
pub mod sitemap;

pub use cities::city_routes;
pub use health::health_routes;
pub use pages::page_routes;
pub use sitemap::sitemap_routes;
