use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::shared_types::{
    AggregatedMatch, ArbitrageError, ArbitrageOpportunity, MarketOdds, OutcomeStake, Quote,
};

fn invalid(m: &AggregatedMatch, reason: String) -> ArbitrageError {
    ArbitrageError::InvalidMatchData {
        match_key: m.match_key.clone(),
        reason,
    }
}

/// Evaluates an aggregated match for a risk-free stake split.
///
/// The implied probability of each required outcome is the reciprocal
/// of its best odd; when the probabilities sum below 1 the bankroll is
/// split proportionally to them so every outcome pays the same return.
///
/// Returns `Ok(None)` when the match is missing a required outcome or
/// the market is not beatable; `Err(InvalidMatchData)` only for
/// malformed input, which callers skip rather than crash on.
pub fn detect(
    m: &AggregatedMatch,
    bankroll: Decimal,
) -> Result<Option<ArbitrageOpportunity>, ArbitrageError> {
    if bankroll <= Decimal::ZERO {
        return Err(invalid(
            m,
            format!("bankroll must be positive, got {bankroll}"),
        ));
    }
    if m.match_key.is_empty() || m.team1.is_empty() || m.team2.is_empty() {
        return Err(invalid(m, "empty match key or team name".to_string()));
    }

    let odds = match m.market_odds() {
        Some(odds) => odds,
        // Not enough priced outcomes for this sport's market shape.
        None => return Ok(None),
    };

    let quotes: Vec<&Quote> = match &odds {
        MarketOdds::ThreeWay { home, draw, away } => vec![home, draw, away],
        MarketOdds::TwoWay { home, away } => vec![home, away],
    };
    for q in &quotes {
        if q.odd <= Decimal::ONE {
            return Err(invalid(
                m,
                format!("odd {} from {} is not above even money", q.odd, q.source),
            ));
        }
    }

    let total: Decimal = quotes.iter().map(|q| Decimal::ONE / q.odd).sum();
    if total >= Decimal::ONE {
        return Ok(None);
    }

    let profit_pct = (Decimal::ONE / total - Decimal::ONE) * dec!(100);
    let leg = |q: &Quote| OutcomeStake {
        odd: q.odd,
        source: q.source.clone(),
        stake: bankroll * (Decimal::ONE / q.odd) / total,
    };

    let (home, draw, away) = match &odds {
        MarketOdds::ThreeWay { home, draw, away } => (leg(home), Some(leg(draw)), leg(away)),
        MarketOdds::TwoWay { home, away } => (leg(home), None, leg(away)),
    };

    Ok(Some(ArbitrageOpportunity {
        match_key: m.match_key.clone(),
        team1: m.team1.clone(),
        team2: m.team2.clone(),
        sport: m.sport.clone(),
        competition: m.competition.clone(),
        profit_pct,
        home,
        draw,
        away,
    }))
}
