pub mod shared_types;
pub mod normalization;
pub mod team_resolver;
pub mod match_key;
pub mod odds_aggregator;
pub mod arbitrage_engine;
pub mod odds_fetcher;
pub mod exporter;
pub mod config;
