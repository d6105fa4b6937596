//! Monthly trend aggregation over tidy arrival records.

use super::month::Month;
use super::transformer::{
    records_to_dataframe, TidyArrivalRecord, TidyTable, TransformError, TrendTransformer,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arrivals summed per distinct (Year, Month, Country), sorted by that key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAggregate {
    rows: Vec<TidyArrivalRecord>,
}

impl TrendAggregate {
    /// Group records by (Year, Month, Country) and sum arrivals.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a TidyArrivalRecord>) -> Self {
        let mut sums: BTreeMap<(i32, Month, &'a str), f64> = BTreeMap::new();
        for record in records {
            *sums
                .entry((record.year, record.month, record.country.as_str()))
                .or_insert(0.0) += record.arrivals;
        }

        let rows = sums
            .into_iter()
            .map(|((year, month, country), arrivals)| TidyArrivalRecord {
                year,
                month,
                country: country.to_string(),
                arrivals,
            })
            .collect();

        Self { rows }
    }

    /// Combine aggregates (typically one per year); shared keys are summed.
    pub fn merge(aggregates: &[TrendAggregate]) -> Self {
        Self::from_records(aggregates.iter().flat_map(|a| a.rows.iter()))
    }

    pub fn rows(&self) -> &[TidyArrivalRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.dedup();
        years
    }

    /// Distinct countries, sorted by name.
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = self.rows.iter().map(|r| r.country.clone()).collect();
        countries.sort();
        countries.dedup();
        countries
    }

    pub fn arrivals_for(&self, year: i32, month: Month, country: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.year == year && r.month == month && r.country == country)
            .map(|r| r.arrivals)
    }

    /// Columns: [Year, Month, Country, Arrivals]
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        records_to_dataframe(&self.rows)
    }
}

/// Group tidy rows by (Year, Month, Country) and sum arrivals.
pub fn aggregate(tidy: &TidyTable) -> TrendAggregate {
    TrendAggregate::from_records(tidy.records())
}

/// Runs the transform-then-aggregate pipeline over one raw table.
///
/// The raw frame is retained untouched, so `analyze_trend` can be called
/// again (with the same or a different year); each call replaces the kept
/// tidy table rather than merging into it.
pub struct MonthlyTrendAnalyzer {
    raw: DataFrame,
    tidy: Option<TidyTable>,
}

impl MonthlyTrendAnalyzer {
    pub fn new(raw: DataFrame) -> Self {
        Self { raw, tidy: None }
    }

    pub fn analyze_trend(&mut self, year: i32) -> Result<TrendAggregate, TransformError> {
        let tidy = TrendTransformer::transform(&self.raw, year)?;
        let trend = aggregate(&tidy);
        self.tidy = Some(tidy);
        Ok(trend)
    }

    /// Tidy table from the latest `analyze_trend` call.
    pub fn tidy(&self) -> Option<&TidyTable> {
        self.tidy.as_ref()
    }
}
