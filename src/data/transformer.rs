//! Trend Transformer Module
//! Cleans a wide arrival table (one column per month) and unpivots it into
//! tidy (Year, Month, Country, Arrivals) records.

use super::month::Month;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const COUNTRY_COLUMN: &str = "Country";
pub const YEAR_COLUMN: &str = "Year";
pub const MONTH_COLUMN: &str = "Month";
pub const ARRIVALS_COLUMN: &str = "Arrivals";
pub const TOTAL_COLUMN: &str = "Total";

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One country's arrivals for one month of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyArrivalRecord {
    pub year: i32,
    pub month: Month,
    pub country: String,
    pub arrivals: f64,
}

/// Long-format output of a single transform, in unpivot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    records: Vec<TidyArrivalRecord>,
}

impl TidyTable {
    pub fn records(&self) -> &[TidyArrivalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TidyArrivalRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Columns: [Year, Month, Country, Arrivals]
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        records_to_dataframe(&self.records)
    }
}

pub(crate) fn records_to_dataframe(records: &[TidyArrivalRecord]) -> PolarsResult<DataFrame> {
    let years: Vec<i32> = records.iter().map(|r| r.year).collect();
    let months: Vec<&str> = records.iter().map(|r| r.month.name()).collect();
    let countries: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let arrivals: Vec<f64> = records.iter().map(|r| r.arrivals).collect();

    DataFrame::new(vec![
        Column::new(YEAR_COLUMN.into(), years),
        Column::new(MONTH_COLUMN.into(), months),
        Column::new(COUNTRY_COLUMN.into(), countries),
        Column::new(ARRIVALS_COLUMN.into(), arrivals),
    ])
}

/// Wide-to-long transformation for one year's arrival file.
pub struct TrendTransformer;

impl TrendTransformer {
    /// Transform a raw wide table into tidy records.
    ///
    /// The steps run in a fixed order: month cells are cleaned first, then
    /// `Total` is dropped, blank countries are filtered, `Year` is stamped
    /// when absent, and only then is the table unpivoted and zero-filled.
    /// A missing month or `Country` column is a shape violation and fails
    /// the whole transform.
    pub fn transform(raw: &DataFrame, year: i32) -> Result<TidyTable, TransformError> {
        let mut df = raw.clone();

        // Clean month cells; unparsable values stay null for now
        for month in Month::ALL {
            let cleaned = Self::clean_month_column(&df, month)?;
            df.with_column(cleaned)?;
        }

        if has_column(&df, TOTAL_COLUMN) {
            df = df.drop(TOTAL_COLUMN)?;
        }

        let countries = string_column(&df, COUNTRY_COLUMN)?;
        let keep: Vec<bool> = countries
            .into_iter()
            .map(|c| c.is_some_and(|c| !c.trim().is_empty()))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!(dropped, "Dropping rows without a country");
        }
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        df = df.filter(&mask)?;

        if !has_column(&df, YEAR_COLUMN) {
            df.with_column(Column::new(YEAR_COLUMN.into(), vec![year; df.height()]))?;
        }

        Self::unpivot(&df, year)
    }

    /// Parse one month column into nullable numbers.
    fn clean_month_column(df: &DataFrame, month: Month) -> Result<Column, TransformError> {
        let raw = string_column(df, month.name())?;
        let values: Vec<Option<f64>> = raw
            .into_iter()
            .map(|cell| cell.and_then(parse_arrivals))
            .collect();

        Ok(Column::new(month.name().into(), values))
    }

    /// Unpivot keyed on (Country, Year); one record per row per month.
    fn unpivot(df: &DataFrame, year: i32) -> Result<TidyTable, TransformError> {
        let countries = string_column(df, COUNTRY_COLUMN)?;
        let years = Self::row_years(df, year)?;

        let mut records = Vec::with_capacity(df.height() * Month::ALL.len());
        for month in Month::ALL {
            let values = df.column(month.name())?.f64()?;
            for ((country, value), row_year) in countries
                .into_iter()
                .zip(values.into_iter())
                .zip(years.iter())
            {
                let Some(country) = country else {
                    continue;
                };
                records.push(TidyArrivalRecord {
                    year: *row_year,
                    month,
                    country: country.trim().to_string(),
                    arrivals: fill_missing(value),
                });
            }
        }

        Ok(TidyTable { records })
    }

    /// Per-row years; cells that do not parse fall back to `year`.
    fn row_years(df: &DataFrame, year: i32) -> Result<Vec<i32>, TransformError> {
        let column = string_column(df, YEAR_COLUMN)?;
        Ok(column
            .into_iter()
            .map(|cell| cell.and_then(parse_year).unwrap_or(year))
            .collect())
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fetch a column as strings, whatever its stored dtype.
fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked, TransformError> {
    let column = df
        .column(name)
        .map_err(|_| TransformError::MissingColumn(name.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    Ok(as_str.str()?.clone())
}

/// Strip thousands separators and parse; `None` for anything that is not a
/// finite, non-negative number.
pub fn parse_arrivals(cell: &str) -> Option<f64> {
    let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    cell.parse::<i32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i32)
    })
}

/// Second validation pass after the unpivot, then zero-fill.
fn fill_missing(value: Option<f64>) -> f64 {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}
