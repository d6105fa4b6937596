//! Persisted entities for the arrival stats store.

use crate::data::Month;
use crate::registry::{Entity, FieldInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PURPOSE: &str = "Not Specified";

/// Aggregate row some source files carry; never a real country.
pub const TOTAL_COUNTRY: &str = "Total";

/// A (year, month) bucket shared by every stat recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub id: u64,
    pub year: i32,
    /// 1-based calendar month
    pub month: u8,
}

impl TimeFrame {
    pub fn calendar_month(&self) -> Option<Month> {
        Month::from_number(self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryStat {
    pub id: u64,
    pub country_id: String,
    pub country: String,
    pub timeframe_id: u64,
    pub passengers: u64,
    pub days_of_stay: u32,
    pub purpose_of_visit: String,
}

/// Insert request; `country_id` and the time frame are resolved by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountryStat {
    pub country: String,
    pub year: i32,
    pub month: Month,
    pub passengers: u64,
    pub days_of_stay: u32,
    pub purpose_of_visit: String,
}

impl NewCountryStat {
    pub fn new(country: impl Into<String>, year: i32, month: Month, passengers: u64) -> Self {
        Self {
            country: country.into(),
            year,
            month,
            passengers,
            days_of_stay: 0,
            purpose_of_visit: DEFAULT_PURPOSE.to_string(),
        }
    }
}

/// A stat joined with its time frame, as listed by the views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRow {
    pub id: u64,
    pub country_id: String,
    pub country: String,
    pub year: i32,
    pub month: Month,
    pub passengers: u64,
}

impl fmt::Display for ArrivalRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}/{}", self.country, self.year, self.month)
    }
}

/// Normalized country key: upper-cased, spaces to underscores, anything
/// outside `[A-Z0-9_]` removed.
pub fn derive_country_id(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

impl Entity for TimeFrame {
    const NAME: &'static str = "TimeFrame";

    fn fields() -> Vec<FieldInfo> {
        vec![
            FieldInfo::new("id", "u64"),
            FieldInfo::new("year", "i32"),
            FieldInfo::new("month", "u8"),
        ]
    }
}

impl Entity for CountryStat {
    const NAME: &'static str = "CountryStat";

    fn fields() -> Vec<FieldInfo> {
        vec![
            FieldInfo::new("id", "u64"),
            FieldInfo::new("country_id", "String"),
            FieldInfo::new("country", "String"),
            FieldInfo::new("timeframe_id", "u64"),
            FieldInfo::new("passengers", "u64"),
            FieldInfo::new("days_of_stay", "u32"),
            FieldInfo::new("purpose_of_visit", "String"),
        ]
    }
}
