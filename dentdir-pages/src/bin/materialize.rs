//! dentdir-materialize - scheduled page regeneration
//!
//! Recomputes the top-10 and indexability of every qualifying city and
//! upserts the results into `pages`. Safe to kill and re-run at any point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use dentdir_common::config::{resolve_database_path, TomlConfig};
use dentdir_common::db::init_database;
use dentdir_common::SystemClock;
use dentdir_pages::materializer::MIN_MATERIALIZE_DENTISTS;
use dentdir_pages::{Materializer, MaterializerOptions};

/// Command-line arguments for dentdir-materialize
#[derive(Parser, Debug)]
#[command(name = "dentdir-materialize")]
#[command(about = "Regenerate best-dentists city pages")]
#[command(version)]
struct Args {
    /// SQLite database holding dentists and pages
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Only regenerate this city (requires --state)
    #[arg(long, requires = "state")]
    city: Option<String>,

    /// Two-letter state of --city
    #[arg(long, requires = "city")]
    state: Option<String>,

    /// Minimum active dentists for a city to be materialized
    #[arg(long, default_value_t = MIN_MATERIALIZE_DENTISTS)]
    min_dentists: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml = TomlConfig::discover();

    let default_filter = toml.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let db_path = resolve_database_path(args.database.as_deref(), &toml);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let options = MaterializerOptions {
        min_city_dentists: args.min_dentists,
        ..MaterializerOptions::default()
    };
    let materializer = Materializer::new(pool, Arc::new(SystemClock)).with_options(options);

    if let (Some(city), Some(state)) = (&args.city, &args.state) {
        match materializer
            .regenerate_city(city, state)
            .await
            .with_context(|| format!("Failed to regenerate {}, {}", city, state))?
        {
            Some(outcome) => info!("{}: {}", outcome.slug, outcome.verdict),
            None => info!("{}, {}: no page written", city, state),
        }
        return Ok(());
    }

    let report = materializer
        .regenerate_pages()
        .await
        .context("Page regeneration failed")?;

    println!("{}", serde_json::to_string(&report)?);

    if report.has_failures() {
        bail!("{} cities failed to materialize", report.failed_count);
    }

    Ok(())
}
