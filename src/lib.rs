//! Traveller - Tourist arrival statistics
//!
//! Loads wide monthly arrival tables from CSV, reshapes them into tidy
//! (Year, Month, Country, Arrivals) records, aggregates and charts the
//! trends, and keeps a small store of monthly stats per country.

pub mod charts;
pub mod config;
pub mod data;
pub mod registry;
pub mod stats;
pub mod store;

pub use config::Config;
