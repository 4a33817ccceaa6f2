use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tracing::warn;

use crate::match_key::build_match_key;
use crate::normalization::normalize_name;
use crate::shared_types::{AggregatedMatch, KeyedOddsRecord, Outcome, Quote, RawOddsRecord};
use crate::team_resolver::TeamResolver;

/// Normalizes and canonicalizes raw records and tags each with its
/// match key. Records whose team names normalize to the empty string
/// are malformed input: logged and dropped, never fatal.
pub fn prepare_records(
    records: Vec<RawOddsRecord>,
    resolver: &TeamResolver,
) -> Vec<KeyedOddsRecord> {
    let mut keyed = Vec::with_capacity(records.len());
    for record in records {
        let norm1 = normalize_name(&record.team1_raw);
        let norm2 = normalize_name(&record.team2_raw);
        if norm1.is_empty() || norm2.is_empty() {
            warn!(
                source = %record.source,
                team1 = %record.team1_raw,
                team2 = %record.team2_raw,
                "dropping record with unusable team names"
            );
            continue;
        }

        let team1 = resolver.canonical(&norm1);
        let team2 = resolver.canonical(&norm2);
        // Orient the record into key order. Sources listing the same
        // fixture with the teams swapped must contribute their prices
        // to the same side of the match, so the home/away odds travel
        // with their teams.
        let (team1, team2, odd_home, odd_away) = if team1 <= team2 {
            (team1, team2, record.odd_home, record.odd_away)
        } else {
            (team2, team1, record.odd_away, record.odd_home)
        };
        keyed.push(KeyedOddsRecord {
            match_key: build_match_key(&team1, &team2),
            team1,
            team2,
            sport: record.sport,
            competition: record.competition,
            source: record.source,
            odd_home,
            odd_draw: record.odd_draw,
            odd_away,
        });
    }
    keyed
}

/// An odd is usable only when present and strictly greater than 1.0;
/// anything at or below even money carries no payout to arbitrage.
fn valid_odd(odd: Option<Decimal>) -> Option<Decimal> {
    odd.filter(|o| *o > Decimal::ONE)
}

/// One melted observation: a single valid price for one outcome.
struct OddsCell<'a> {
    outcome: Outcome,
    odd: Decimal,
    source: &'a str,
}

fn melt(record: &KeyedOddsRecord) -> Vec<OddsCell<'_>> {
    [
        (Outcome::Home, record.odd_home),
        (Outcome::Draw, record.odd_draw),
        (Outcome::Away, record.odd_away),
    ]
    .into_iter()
    .filter_map(|(outcome, odd)| {
        valid_odd(odd).map(|odd| OddsCell {
            outcome,
            odd,
            source: &record.source,
        })
    })
    .collect()
}

struct MatchGroup {
    agg: AggregatedMatch,
    sources: HashSet<String>,
}

/// Groups keyed records by match key, disambiguated by sport and
/// competition (the same two clubs can meet in more than one market),
/// and reduces each group to the maximum valid odd per outcome,
/// remembering the offering source.
///
/// Sport and competition labels are carried through unchanged; sources
/// disagreeing on them split the group, a data quality issue surfaced
/// rather than corrected. Ties on the best odd keep the earlier
/// source. Output is sorted by match key. Groups missing outcomes are
/// still returned; completeness is the caller's check via
/// `AggregatedMatch::market_odds`.
pub fn aggregate(records: &[KeyedOddsRecord]) -> Vec<AggregatedMatch> {
    let mut groups: BTreeMap<(String, String, String), MatchGroup> = BTreeMap::new();

    for record in records {
        let cells = melt(record);
        if cells.is_empty() {
            continue;
        }

        let group = groups
            .entry((
                record.match_key.clone(),
                record.sport.clone(),
                record.competition.clone(),
            ))
            .or_insert_with(|| MatchGroup {
                agg: AggregatedMatch {
                    match_key: record.match_key.clone(),
                    team1: record.team1.clone(),
                    team2: record.team2.clone(),
                    sport: record.sport.clone(),
                    competition: record.competition.clone(),
                    best_home: None,
                    best_draw: None,
                    best_away: None,
                    source_count: 0,
                },
                sources: HashSet::new(),
            });

        group.sources.insert(record.source.clone());
        for cell in cells {
            let slot = match cell.outcome {
                Outcome::Home => &mut group.agg.best_home,
                Outcome::Draw => &mut group.agg.best_draw,
                Outcome::Away => &mut group.agg.best_away,
            };
            let beats_current = match slot {
                Some(current) => cell.odd > current.odd,
                None => true,
            };
            if beats_current {
                *slot = Some(Quote {
                    odd: cell.odd,
                    source: cell.source.to_string(),
                });
            }
        }
    }

    groups
        .into_values()
        .map(|mut group| {
            group.agg.source_count = group.sources.len();
            group.agg
        })
        .collect()
}
