//! Canonical calendar months.
//!
//! The derived ordering is calendar order, so sorting tidy records or
//! grouping keys never falls back to lexical month names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown month: {0}")]
pub struct UnknownMonth(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Column header used in the wide CSV files.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }

    /// 1-based calendar number.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// 0-based position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_number(number: u8) -> Option<Month> {
        match number {
            1..=12 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    /// Case-insensitive lookup by full name.
    pub fn from_name(name: &str) -> Option<Month> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::from_name(s).ok_or_else(|| UnknownMonth(s.to_string()))
    }
}
