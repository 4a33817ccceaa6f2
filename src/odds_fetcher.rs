use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use crate::config::SourceSpec;
use crate::shared_types::{FetchError, RawOddsRecord};

lazy_static! {
    static ref RE_ODD: Regex = Regex::new(r"^\d+\.?\d*$").unwrap();
}

/// Wire format of one odds row, as the bookmaker feeds and the local
/// dump files publish it. Odds arrive either as JSON numbers or as
/// display strings, sometimes with a comma decimal separator.
#[derive(Deserialize, Debug)]
struct ApiOddsRow {
    team1: String,
    team2: String,
    sport: String,
    competition: String,
    #[serde(default)]
    odd_team1_win: Option<serde_json::Value>,
    #[serde(default)]
    odd_draw: Option<serde_json::Value>,
    #[serde(default)]
    odd_team2_win: Option<serde_json::Value>,
}

/// A per-bookmaker dump file: either bare rows or rows wrapped with the
/// writer's scrape timestamp.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum DumpPayload {
    Stamped {
        scraped_at: Option<DateTime<Utc>>,
        rows: Vec<ApiOddsRow>,
    },
    Bare(Vec<ApiOddsRow>),
}

fn parse_odd(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => {
            let cleaned = s.trim().replace(',', ".");
            if RE_ODD.is_match(&cleaned) {
                cleaned.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn into_record(row: ApiOddsRow, source: &str) -> RawOddsRecord {
    RawOddsRecord {
        team1_raw: row.team1,
        team2_raw: row.team2,
        sport: row.sport,
        competition: row.competition,
        source: source.to_string(),
        odd_home: row.odd_team1_win.as_ref().and_then(parse_odd),
        odd_draw: row.odd_draw.as_ref().and_then(parse_odd),
        odd_away: row.odd_team2_win.as_ref().and_then(parse_odd),
    }
}

/// A producer of raw odds records for one bookmaker.
#[async_trait]
pub trait OddsSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<Vec<RawOddsRecord>, FetchError>;
}

/// Fetches a JSON array of odds rows from a bookmaker feed endpoint.
pub struct HttpOddsSource {
    name: String,
    url: Url,
    client: reqwest::Client,
}

impl HttpOddsSource {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OddsSource for HttpOddsSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawOddsRecord>, FetchError> {
        let http_err = |source| FetchError::Http {
            url: self.url.to_string(),
            source,
        };
        let rows: Vec<ApiOddsRow> = self
            .client
            .get(self.url.clone())
            .header("User-Agent", "SurebetBot/1.0")
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        Ok(rows
            .into_iter()
            .map(|row| into_record(row, &self.name))
            .collect())
    }
}

/// Reads odds rows from a local JSON dump written by an out-of-process
/// scraper (the pipeline stage files the acquisition layer leaves
/// behind).
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl OddsSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawOddsRecord>, FetchError> {
        let path_str = self.path.display().to_string();
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: path_str.clone(),
                source,
            })?;
        let payload: DumpPayload =
            serde_json::from_str(&text).map_err(|source| FetchError::Parse {
                origin: path_str,
                source,
            })?;

        let rows = match payload {
            DumpPayload::Stamped { scraped_at, rows } => {
                if let Some(at) = scraped_at {
                    let age = Utc::now().signed_duration_since(at);
                    if age > chrono::Duration::hours(1) {
                        warn!(
                            source = %self.name,
                            minutes = age.num_minutes(),
                            "odds dump is stale"
                        );
                    }
                }
                rows
            }
            DumpPayload::Bare(rows) => rows,
        };

        Ok(rows
            .into_iter()
            .map(|row| into_record(row, &self.name))
            .collect())
    }
}

/// Instantiates the configured sources.
pub fn build_sources(specs: &[SourceSpec]) -> Vec<Box<dyn OddsSource>> {
    specs
        .iter()
        .map(|spec| match spec {
            SourceSpec::Http { name, url } => {
                Box::new(HttpOddsSource::new(name.clone(), url.clone())) as Box<dyn OddsSource>
            }
            SourceSpec::File { name, path } => {
                Box::new(JsonFileSource::new(name.clone(), path.clone()))
            }
        })
        .collect()
}

/// Runs every source concurrently and joins on all of them. Failing
/// sources are logged and dropped; the run proceeds with whatever
/// succeeded. The caller decides what zero successes means (fatal for
/// a normal run).
pub async fn fetch_all(sources: &[Box<dyn OddsSource>]) -> Vec<(String, Vec<RawOddsRecord>)> {
    let fetches = sources.iter().map(|source| async move {
        match source.fetch().await {
            Ok(rows) => {
                info!(source = source.name(), rows = rows.len(), "fetched odds");
                Some((source.name().to_string(), rows))
            }
            Err(e) => {
                error!(source = source.name(), "source unavailable: {e}");
                None
            }
        }
    });
    join_all(fetches).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(serde_json::json!(2.1), Some(dec!(2.1)))]
    #[case(serde_json::json!("2,10"), Some(dec!(2.10)))]
    #[case(serde_json::json!(" 3.45 "), Some(dec!(3.45)))]
    #[case(serde_json::json!("abc"), None)]
    #[case(serde_json::json!("1x2"), None)]
    #[case(serde_json::json!(null), None)]
    fn test_parse_odd(#[case] value: serde_json::Value, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_odd(&value), expected);
    }

    #[test]
    fn test_dump_payload_accepts_both_shapes() {
        let bare = r#"[{"team1":"Lyon","team2":"Monaco","sport":"football","competition":"ligue1","odd_team1_win":2.1,"odd_draw":3.4,"odd_team2_win":3.9}]"#;
        let stamped = r#"{"scraped_at":"2026-08-06T08:00:00Z","rows":[{"team1":"Lyon","team2":"Monaco","sport":"football","competition":"ligue1","odd_team1_win":"2,10"}]}"#;

        let bare: DumpPayload = serde_json::from_str(bare).unwrap();
        let stamped: DumpPayload = serde_json::from_str(stamped).unwrap();
        assert!(matches!(bare, DumpPayload::Bare(ref rows) if rows.len() == 1));
        assert!(matches!(stamped, DumpPayload::Stamped { ref rows, .. } if rows.len() == 1));
    }

    #[tokio::test]
    async fn test_file_source_maps_wire_rows_to_records() {
        let path = std::env::temp_dir().join("surebet_bot_dump_test.json");
        tokio::fs::write(
            &path,
            r#"[{"team1":"Lyon","team2":"Monaco","sport":"football","competition":"ligue1","odd_team1_win":"2,10","odd_draw":3.4,"odd_team2_win":"bad"}]"#,
        )
        .await
        .unwrap();

        let source = JsonFileSource::new("unibet", &path);
        let records = source.fetch().await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.source, "unibet");
        assert_eq!(r.odd_home, Some(dec!(2.10)));
        assert_eq!(r.odd_draw, Some(dec!(3.4)));
        assert_eq!(r.odd_away, None);
    }

    #[tokio::test]
    async fn test_fetch_all_drops_failing_sources() {
        let sources: Vec<Box<dyn OddsSource>> = vec![Box::new(JsonFileSource::new(
            "missing",
            "/nonexistent/odds.json",
        ))];
        let fetched = fetch_all(&sources).await;
        assert!(fetched.is_empty());
    }
}
