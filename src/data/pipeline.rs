//! Multi-year analysis: one loader and one analyzer per yearly file.

use super::analyzer::{MonthlyTrendAnalyzer, TrendAggregate};
use super::loader::DataLoader;
use super::transformer::TransformError;
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data not loaded from {0}")]
    NotLoaded(PathBuf),
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
}

/// A yearly arrival file and the year it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFile {
    pub year: i32,
    pub path: PathBuf,
}

impl YearFile {
    pub fn new(year: i32, path: impl Into<PathBuf>) -> Self {
        Self {
            year,
            path: path.into(),
        }
    }
}

#[derive(Debug)]
pub struct YearOutcome {
    pub year: i32,
    pub path: PathBuf,
    pub result: Result<TrendAggregate, PipelineError>,
}

/// Load, transform and aggregate a single file.
pub fn analyze_file(job: &YearFile) -> Result<TrendAggregate, PipelineError> {
    let mut loader = DataLoader::new(&job.path);
    loader.load_data();
    let df = loader
        .into_data()
        .ok_or_else(|| PipelineError::NotLoaded(job.path.clone()))?;

    let mut analyzer = MonthlyTrendAnalyzer::new(df);
    Ok(analyzer.analyze_trend(job.year)?)
}

/// Analyze every file in parallel; outcomes keep the input order.
pub fn analyze_files(jobs: &[YearFile]) -> Vec<YearOutcome> {
    jobs.par_iter()
        .map(|job| YearOutcome {
            year: job.year,
            path: job.path.clone(),
            result: analyze_file(job),
        })
        .collect()
}

/// Merge the successful outcomes, logging the failed ones.
pub fn merge_outcomes(outcomes: &[YearOutcome]) -> TrendAggregate {
    let mut aggregates = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match &outcome.result {
            Ok(trend) => {
                info!(year = outcome.year, rows = trend.len(), "Trend computed");
                aggregates.push(trend.clone());
            }
            Err(e) => warn!(year = outcome.year, path = %outcome.path.display(), "Skipping year: {e}"),
        }
    }
    TrendAggregate::merge(&aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Month;
    use std::fs;

    fn header() -> String {
        let months: Vec<&str> = Month::ALL.iter().map(|m| m.name()).collect();
        format!("Country,{},Total\n", months.join(","))
    }

    #[test]
    fn analyzes_several_years_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let y2018 = dir.path().join("2018.csv");
        let y2019 = dir.path().join("2019.csv");
        fs::write(&y2018, format!("{}India,1,1,1,1,1,1,1,1,1,1,1,1,12\n", header())).unwrap();
        fs::write(&y2019, format!("{}India,2,2,2,2,2,2,2,2,2,2,2,2,24\n", header())).unwrap();

        let jobs = vec![
            YearFile::new(2018, &y2018),
            YearFile::new(2019, &y2019),
            YearFile::new(2020, dir.path().join("missing.csv")),
        ];
        let outcomes = analyze_files(&jobs);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_ok());
        assert!(matches!(outcomes[2].result, Err(PipelineError::NotLoaded(_))));

        let merged = merge_outcomes(&outcomes);
        assert_eq!(merged.years(), vec![2018, 2019]);
        assert_eq!(merged.arrivals_for(2019, Month::December, "India"), Some(2.0));
    }
}
