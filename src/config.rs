use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use url::Url;

/// One configured bookmaker feed: an HTTP endpoint or a local dump
/// file left behind by an out-of-process scraper.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Http { name: String, url: Url },
    File { name: String, path: PathBuf },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bankroll distributed across the outcomes of each opportunity.
    pub total_stake: Decimal,
    /// Token-set similarity cutoff (0-100) for team name clustering.
    pub similarity_threshold: u32,
    /// Matches seen by fewer distinct sources are not evaluated.
    pub min_sources: usize,
    pub team_map_path: PathBuf,
    pub output_csv: PathBuf,
    pub sources: Vec<SourceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_stake: dec!(100),
            similarity_threshold: 60,
            min_sources: 1,
            team_map_path: PathBuf::from("team_mapping.json"),
            output_csv: PathBuf::from("arbitrage_opportunities.csv"),
            sources: parse_sources(
                "betclic=betclic_odds.json,unibet=unibet_odds.json,zebet=zebet_odds.json",
            )
            .expect("default sources parse"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let total_stake = match env::var("TOTAL_STAKE") {
            Ok(v) => v
                .trim()
                .parse::<Decimal>()
                .with_context(|| format!("invalid TOTAL_STAKE '{v}'"))?,
            Err(_) => defaults.total_stake,
        };
        if total_stake <= Decimal::ZERO {
            bail!("TOTAL_STAKE must be positive, got {total_stake}");
        }

        let similarity_threshold = match env::var("SIMILARITY_THRESHOLD") {
            Ok(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid SIMILARITY_THRESHOLD '{v}'"))?,
            Err(_) => defaults.similarity_threshold,
        };
        if similarity_threshold > 100 {
            bail!("SIMILARITY_THRESHOLD must be within 0-100, got {similarity_threshold}");
        }

        let min_sources = match env::var("MIN_SOURCES") {
            Ok(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid MIN_SOURCES '{v}'"))?,
            Err(_) => defaults.min_sources,
        };

        let sources = match env::var("ODDS_SOURCES") {
            Ok(v) => parse_sources(&v)?,
            Err(_) => defaults.sources,
        };

        Ok(Self {
            total_stake,
            similarity_threshold,
            min_sources,
            team_map_path: env::var("TEAM_MAP_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.team_map_path),
            output_csv: env::var("OUTPUT_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_csv),
            sources,
        })
    }
}

/// Parses a comma-separated list of `name=target` entries, where the
/// target is an http(s) URL, a file:// URL, or a plain path.
pub fn parse_sources(raw: &str) -> Result<Vec<SourceSpec>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_source_entry)
        .collect()
}

fn parse_source_entry(entry: &str) -> Result<SourceSpec> {
    let (name, target) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("source entry '{entry}' must look like name=url"))?;
    let (name, target) = (name.trim(), target.trim());
    if name.is_empty() || target.is_empty() {
        bail!("source entry '{entry}' has an empty name or target");
    }

    match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(SourceSpec::Http {
            name: name.to_string(),
            url,
        }),
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| anyhow!("file URL '{target}' is not a usable path"))?;
            Ok(SourceSpec::File {
                name: name.to_string(),
                path,
            })
        }
        Ok(url) => bail!("unsupported source scheme '{}' in '{entry}'", url.scheme()),
        // Not a URL at all: treat it as a plain filesystem path.
        Err(_) => Ok(SourceSpec::File {
            name: name.to_string(),
            path: PathBuf::from(target),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_and_file_sources() {
        let sources =
            parse_sources("unibet=https://feeds.example.com/unibet.json,zebet=zebet_odds.json")
                .unwrap();
        assert_eq!(sources.len(), 2);
        assert!(matches!(
            &sources[0],
            SourceSpec::Http { name, .. } if name == "unibet"
        ));
        assert!(matches!(
            &sources[1],
            SourceSpec::File { name, path } if name == "zebet" && path == &PathBuf::from("zebet_odds.json")
        ));
    }

    #[test]
    fn test_parse_file_url_source() {
        let sources = parse_sources("local=file:///tmp/odds.json").unwrap();
        assert!(matches!(
            &sources[0],
            SourceSpec::File { path, .. } if path == &PathBuf::from("/tmp/odds.json")
        ));
    }

    #[test]
    fn test_entry_without_separator_is_rejected() {
        assert!(parse_sources("unibet").is_err());
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        assert!(parse_sources("x=ftp://feeds.example.com/odds").is_err());
    }

    #[test]
    fn test_empty_entries_are_skipped() {
        let sources = parse_sources(" , unibet=unibet_odds.json , ").unwrap();
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.total_stake, dec!(100));
        assert_eq!(config.similarity_threshold, 60);
        assert_eq!(config.min_sources, 1);
        assert_eq!(config.sources.len(), 3);
    }
}
