use rust_decimal::Decimal;
use thiserror::Error;

/// A single odds line for one fixture as reported by one bookmaker.
/// Produced by the acquisition layer; immutable once created.
#[derive(Debug, Clone)]
pub struct RawOddsRecord {
    pub team1_raw: String,
    pub team2_raw: String,
    pub sport: String,
    pub competition: String,
    pub source: String,
    pub odd_home: Option<Decimal>,
    pub odd_draw: Option<Decimal>, // absent for two-outcome sports
    pub odd_away: Option<Decimal>,
}

/// A raw record after normalization and canonicalization, tagged with
/// its order-independent match key.
#[derive(Debug, Clone)]
pub struct KeyedOddsRecord {
    pub match_key: String,
    pub team1: String, // canonical identity
    pub team2: String, // canonical identity
    pub sport: String,
    pub competition: String,
    pub source: String,
    pub odd_home: Option<Decimal>,
    pub odd_draw: Option<Decimal>,
    pub odd_away: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

/// Market shape for a sport. Football markets settle three ways, every
/// other supported sport settles two ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketKind {
    ThreeWay,
    TwoWay,
}

impl MarketKind {
    pub fn for_sport(sport: &str) -> Self {
        if sport.eq_ignore_ascii_case("football") {
            MarketKind::ThreeWay
        } else {
            MarketKind::TwoWay
        }
    }

    pub fn required_outcomes(&self) -> &'static [Outcome] {
        match self {
            MarketKind::ThreeWay => &[Outcome::Home, Outcome::Draw, Outcome::Away],
            MarketKind::TwoWay => &[Outcome::Home, Outcome::Away],
        }
    }
}

/// Best available price for one outcome, with the bookmaker offering it.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub odd: Decimal,
    pub source: String,
}

/// One row per distinct match key: the best valid odd per outcome
/// across every source that reported the fixture.
#[derive(Debug, Clone)]
pub struct AggregatedMatch {
    pub match_key: String,
    pub team1: String,
    pub team2: String,
    pub sport: String,
    pub competition: String,
    pub best_home: Option<Quote>,
    pub best_draw: Option<Quote>,
    pub best_away: Option<Quote>,
    /// Distinct sources that contributed at least one valid odd.
    pub source_count: usize,
}

/// Complete market view of an aggregated match: present only when every
/// outcome required by the sport's market shape has a best quote.
#[derive(Debug, Clone)]
pub enum MarketOdds {
    ThreeWay { home: Quote, draw: Quote, away: Quote },
    TwoWay { home: Quote, away: Quote },
}

impl AggregatedMatch {
    pub fn kind(&self) -> MarketKind {
        MarketKind::for_sport(&self.sport)
    }

    /// Returns the complete market, or None when the match lacks the
    /// minimum outcome count for its sport.
    pub fn market_odds(&self) -> Option<MarketOdds> {
        match self.kind() {
            MarketKind::ThreeWay => Some(MarketOdds::ThreeWay {
                home: self.best_home.clone()?,
                draw: self.best_draw.clone()?,
                away: self.best_away.clone()?,
            }),
            MarketKind::TwoWay => Some(MarketOdds::TwoWay {
                home: self.best_home.clone()?,
                away: self.best_away.clone()?,
            }),
        }
    }
}

/// A stake assigned to one outcome of an opportunity.
#[derive(Debug, Clone)]
pub struct OutcomeStake {
    pub odd: Decimal,
    pub source: String,
    pub stake: Decimal,
}

/// A set of best prices whose implied probabilities sum below 1,
/// together with the bankroll split that locks in the profit.
#[derive(Debug, Clone)]
pub struct ArbitrageOpportunity {
    pub match_key: String,
    pub team1: String,
    pub team2: String,
    pub sport: String,
    pub competition: String,
    pub profit_pct: Decimal,
    pub home: OutcomeStake,
    pub draw: Option<OutcomeStake>,
    pub away: OutcomeStake,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read odds dump {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse odds payload from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read team map {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse team map {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write team map {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ArbitrageError {
    #[error("invalid match data for '{match_key}': {reason}")]
    InvalidMatchData { match_key: String, reason: String },
}
