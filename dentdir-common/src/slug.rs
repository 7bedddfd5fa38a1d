//! City page slugs
//!
//! Slug format: `best-dentists-<city-slug>-<state-abbr-lowercase>`, e.g.
//! `best-dentists-salt-lake-city-ut`. [`parse_city_state_slug`] inverts
//! [`generate_slug`] for every slug the materializer produces.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix shared by every city page slug
pub const SLUG_PREFIX: &str = "best-dentists-";

/// Public URL prefix for city pages (sitemap paths)
pub const PAGE_PATH_PREFIX: &str = "/best-dentists/";

/// City and state recovered from a slug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub city: String,
    pub state: String,
}

/// Build the page slug for a city/state pair
///
/// Non-alphanumeric runs in the city name collapse to a single hyphen.
/// Fails when the city has no alphanumeric characters or the state is not a
/// two-letter abbreviation.
pub fn generate_slug(city: &str, state: &str) -> Result<String> {
    let city_slug = slugify(city);
    if city_slug.is_empty() {
        return Err(Error::InvalidInput(format!(
            "city name {:?} produces an empty slug",
            city
        )));
    }

    let state = state.trim();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(format!(
            "state {:?} is not a two-letter abbreviation",
            state
        )));
    }

    Ok(format!(
        "{}{}-{}",
        SLUG_PREFIX,
        city_slug,
        state.to_ascii_lowercase()
    ))
}

/// Recover `{city, state}` from a page slug
///
/// The `best-dentists-` prefix is optional. The last hyphen-delimited segment
/// is the state; everything before it is the city, title-cased. Returns `None`
/// on malformed input (fewer than two segments, or empty segments).
pub fn parse_city_state_slug(slug: &str) -> Option<CityState> {
    let rest = slug.strip_prefix(SLUG_PREFIX).unwrap_or(slug);
    let parts: Vec<&str> = rest.split('-').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }

    let (state, city_parts) = parts.split_last()?;
    let city = city_parts
        .iter()
        .map(|word| title_case_word(word))
        .collect::<Vec<_>>()
        .join(" ");

    Some(CityState {
        city,
        state: state.to_ascii_uppercase(),
    })
}

/// Sitemap path for a page slug: `/best-dentists/<slug-without-prefix>`
pub fn page_path(slug: &str) -> String {
    let suffix = slug.strip_prefix(SLUG_PREFIX).unwrap_or(slug);
    format!("{}{}", PAGE_PATH_PREFIX, suffix)
}

/// Title-case each whitespace-separated word ("SALT lake city" -> "Salt Lake City")
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
