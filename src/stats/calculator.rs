//! Trend Summary Module
//! Per-country descriptive statistics over a monthly trend.

use crate::data::{Month, TrendAggregate};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Summary of one country's twelve months in one year.
#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub year: i32,
    pub country: String,
    pub total: f64,
    pub monthly_mean: f64,
    /// Sample standard deviation; NaN with fewer than two months
    pub monthly_std: f64,
    pub peak_month: Month,
    pub peak_arrivals: f64,
    pub low_month: Month,
    pub low_arrivals: f64,
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Summaries sorted by year, then by descending total.
    pub fn summarize(trend: &TrendAggregate) -> Vec<CountrySummary> {
        let mut by_key: BTreeMap<(i32, &str), Vec<(Month, f64)>> = BTreeMap::new();
        for row in trend.rows() {
            by_key
                .entry((row.year, row.country.as_str()))
                .or_default()
                .push((row.month, row.arrivals));
        }

        let mut summaries: Vec<CountrySummary> = by_key
            .into_iter()
            .filter_map(|((year, country), months)| Self::summarize_country(year, country, &months))
            .collect();

        summaries.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then(b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.country.cmp(&b.country))
        });
        summaries
    }

    fn summarize_country(year: i32, country: &str, months: &[(Month, f64)]) -> Option<CountrySummary> {
        // Rows arrive in calendar order, so ties resolve to the earliest month
        let (peak_month, peak_arrivals) = months
            .iter()
            .copied()
            .fold(None, |best: Option<(Month, f64)>, (m, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((m, v)),
            })?;
        let (low_month, low_arrivals) = months
            .iter()
            .copied()
            .fold(None, |best: Option<(Month, f64)>, (m, v)| match best {
                Some((_, b)) if b <= v => best,
                _ => Some((m, v)),
            })?;

        let values: Vec<f64> = months.iter().map(|(_, v)| *v).collect();

        Some(CountrySummary {
            year,
            country: country.to_string(),
            total: values.iter().sum(),
            monthly_mean: values.iter().mean(),
            monthly_std: values.iter().std_dev(),
            peak_month,
            peak_arrivals,
            low_month,
            low_arrivals,
        })
    }

    /// Top `n` countries by total for each year.
    pub fn top_countries(summaries: &[CountrySummary], n: usize) -> Vec<&CountrySummary> {
        let mut taken: BTreeMap<i32, usize> = BTreeMap::new();
        summaries
            .iter()
            .filter(|s| {
                let count = taken.entry(s.year).or_insert(0);
                *count += 1;
                *count <= n
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TidyArrivalRecord;

    fn trend(rows: &[(i32, &str, [f64; 12])]) -> TrendAggregate {
        let records: Vec<TidyArrivalRecord> = rows
            .iter()
            .flat_map(|(year, country, values)| {
                Month::ALL.iter().map(move |m| TidyArrivalRecord {
                    year: *year,
                    month: *m,
                    country: country.to_string(),
                    arrivals: values[m.index()],
                })
            })
            .collect();
        TrendAggregate::from_records(&records)
    }

    #[test]
    fn summary_of_known_series() {
        let mut values = [10.0; 12];
        values[Month::July.index()] = 130.0;
        values[Month::February.index()] = 4.0;
        let summaries = StatsCalculator::summarize(&trend(&[(2019, "Sri Lanka", values)]));

        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.total, 234.0);
        assert!((s.monthly_mean - 19.5).abs() < 1e-9);
        assert!(s.monthly_std > 0.0);
        assert_eq!(s.peak_month, Month::July);
        assert_eq!(s.peak_arrivals, 130.0);
        assert_eq!(s.low_month, Month::February);
        assert_eq!(s.low_arrivals, 4.0);
    }

    #[test]
    fn flat_series_ties_go_to_january() {
        let summaries = StatsCalculator::summarize(&trend(&[(2019, "Chile", [5.0; 12])]));
        assert_eq!(summaries[0].peak_month, Month::January);
        assert_eq!(summaries[0].low_month, Month::January);
        assert_eq!(summaries[0].monthly_std, 0.0);
    }

    #[test]
    fn sorted_by_year_then_total_and_top_n() {
        let summaries = StatsCalculator::summarize(&trend(&[
            (2019, "A", [1.0; 12]),
            (2019, "B", [3.0; 12]),
            (2019, "C", [2.0; 12]),
            (2018, "A", [9.0; 12]),
        ]));

        let order: Vec<(i32, &str)> = summaries.iter().map(|s| (s.year, s.country.as_str())).collect();
        assert_eq!(order, vec![(2018, "A"), (2019, "B"), (2019, "C"), (2019, "A")]);

        let top: Vec<&str> = StatsCalculator::top_countries(&summaries, 1)
            .iter()
            .map(|s| s.country.as_str())
            .collect();
        assert_eq!(top, vec!["A", "B"]);
    }
}
