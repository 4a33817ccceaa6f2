use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use surebet_bot::arbitrage_engine::detect;
use surebet_bot::config::Config;
use surebet_bot::exporter::write_csv;
use surebet_bot::odds_aggregator::{aggregate, prepare_records};
use surebet_bot::odds_fetcher::{build_sources, fetch_all};
use surebet_bot::shared_types::ArbitrageOpportunity;
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
    let resolver = TeamResolver::load_or_degraded(&config.team_map_path);

    let sources = build_sources(&config.sources);
    let fetched = fetch_all(&sources).await;
    if fetched.is_empty() {
        bail!("no odds loaded from any source");
    }

    let mut records = Vec::new();
    for (_, rows) in fetched {
        records.extend(rows);
    }
    info!(rows = records.len(), "combined odds");

    let keyed = prepare_records(records, &resolver);
    let matches = aggregate(&keyed);
    info!(matches = matches.len(), "aggregated fixtures");

    let mut opportunities: Vec<ArbitrageOpportunity> = Vec::new();
    let mut incomplete = 0usize;
    for m in &matches {
        if m.source_count < config.min_sources {
            continue;
        }
        if m.market_odds().is_none() {
            incomplete += 1;
            continue;
        }
        match detect(m, config.total_stake) {
            Ok(Some(opportunity)) => opportunities.push(opportunity),
            Ok(None) => {}
            Err(e) => warn!("skipping match: {e}"),
        }
    }
    if incomplete > 0 {
        info!(
            matches = incomplete,
            "fixtures lacked the minimum outcome count for their sport"
        );
    }

    if opportunities.is_empty() {
        info!("no arbitrage opportunities found");
        return Ok(());
    }

    for opportunity in &opportunities {
        info!(
            match_key = %opportunity.match_key,
            sport = %opportunity.sport,
            competition = %opportunity.competition,
            profit_pct = %opportunity.profit_pct.round_dp(2),
            "arbitrage opportunity"
        );
    }
    write_csv(&config.output_csv, &opportunities)
        .with_context(|| format!("failed to write {}", config.output_csv.display()))?;
    info!(
        count = opportunities.len(),
        path = %config.output_csv.display(),
        "saved opportunities"
    );

    Ok(())
}
