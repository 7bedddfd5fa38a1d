//! Database models and queries
//!
//! `dentists` and the `city_dentist_stats` view are owned by the import
//! pipeline and only read here. `pages` is written exclusively by the page
//! materializer through [`pages::upsert_page`].

pub mod aggregates;
pub mod dentists;
pub mod init;
pub mod models;
pub mod pages;

pub use aggregates::*;
pub use dentists::*;
pub use init::*;
pub use models::*;
pub use pages::*;
