//! Statistics module - per-country trend summaries

mod calculator;

pub use calculator::{CountrySummary, StatsCalculator};
