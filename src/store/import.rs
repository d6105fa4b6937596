//! Load tidy trend rows into the stats store.

use super::models::NewCountryStat;
use super::repository::{ArrivalStore, StoreError};
use crate::data::{TidyArrivalRecord, TrendAggregate};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub countries: usize,
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub skipped_invalid: usize,
}

/// Insert every (Year, Month, Country) row of `trend` as a stat.
///
/// Rows whose key already exists, or whose country normalizes to an empty
/// identifier, are skipped with a warning. Any other store error aborts.
pub fn import_aggregate(
    store: &mut ArrivalStore,
    trend: &TrendAggregate,
) -> Result<ImportReport, StoreError> {
    let mut by_country: BTreeMap<&str, Vec<&TidyArrivalRecord>> = BTreeMap::new();
    for row in trend.rows() {
        by_country.entry(row.country.as_str()).or_default().push(row);
    }

    let total = by_country.len();
    info!("Starting import for {total} countries...");

    let mut report = ImportReport {
        countries: total,
        ..Default::default()
    };
    for (index, (country, rows)) in by_country.into_iter().enumerate() {
        info!("Processing {country} ({}/{total})", index + 1);

        for row in rows {
            let Some(passengers) = passenger_count(row.arrivals) else {
                warn!(
                    country,
                    year = row.year,
                    month = %row.month,
                    arrivals = row.arrivals,
                    "Arrivals do not fit a passenger count, skipping"
                );
                report.skipped_invalid += 1;
                continue;
            };
            let stat = NewCountryStat::new(country, row.year, row.month, passengers);
            match store.insert_stat(stat) {
                Ok(_) => report.inserted += 1,
                Err(StoreError::Duplicate {
                    country_id,
                    year,
                    month,
                }) => {
                    warn!(%country_id, year, %month, "Stat already stored, skipping");
                    report.skipped_duplicates += 1;
                }
                Err(StoreError::InvalidCountry(name)) => {
                    warn!(country = %name, "Country has no usable identifier, skipping");
                    report.skipped_invalid += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(report)
}

/// Arrivals rounded to a whole passenger count; `None` when the rounded
/// value is negative, non-finite or past `u64::MAX`.
fn passenger_count(arrivals: f64) -> Option<u64> {
    let rounded = arrivals.round();
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range
    (rounded.is_finite() && rounded >= 0.0 && rounded < u64::MAX as f64).then_some(rounded as u64)
}
