//! Offline rebuild of the team identity store.
//!
//! Fetches the current corpus of raw team names from every configured
//! source, clusters the spelling variants, and writes the
//! normalized-name -> canonical-name map that pipeline runs load at
//! startup. Runs between pipeline runs, never during one.

use anyhow::{bail, Result};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use surebet_bot::config::Config;
use surebet_bot::odds_fetcher::{build_sources, fetch_all};
use surebet_bot::team_resolver::TeamResolver;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let sources = build_sources(&config.sources);
    let fetched = fetch_all(&sources).await;
    if fetched.is_empty() {
        bail!("no odds loaded from any source; cannot build a team map");
    }

    let mut corpus = Vec::new();
    for (_, rows) in fetched {
        for record in rows {
            corpus.push(record.team1_raw);
            corpus.push(record.team2_raw);
        }
    }
    info!(names = corpus.len(), "collected team name corpus");

    let resolver = TeamResolver::build(&corpus, f64::from(config.similarity_threshold));
    resolver.save(&config.team_map_path)?;
    info!(
        entries = resolver.len(),
        path = %config.team_map_path.display(),
        "wrote team map"
    );

    Ok(())
}
