//! JSON-snapshot store for country arrival stats.
//!
//! The whole store lives in memory and is written back as a single JSON
//! document on `save`. Uniqueness of (country_id, year, month) is enforced
//! on insert.

use super::models::{
    derive_country_id, ArrivalRow, CountryStat, NewCountryStat, TimeFrame, TOTAL_COUNTRY,
};
use crate::data::Month;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate stat for {country_id} in {year}/{month}")]
    Duplicate {
        country_id: String,
        year: i32,
        month: Month,
    },

    #[error("Country name yields an empty identifier: {0:?}")]
    InvalidCountry(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    next_timeframe_id: u64,
    #[serde(default)]
    next_stat_id: u64,
    #[serde(default)]
    timeframes: Vec<TimeFrame>,
    #[serde(default)]
    stats: Vec<CountryStat>,
}

/// Counts removed by a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub stats: usize,
    pub timeframes: usize,
}

/// Result of a store health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub path: Option<PathBuf>,
    pub exists: bool,
    pub stats: usize,
    pub timeframes: usize,
}

pub struct ArrivalStore {
    path: Option<PathBuf>,
    snapshot: StoreSnapshot,
}

impl ArrivalStore {
    /// Open the snapshot at `path`; a missing file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            debug!(path = %path.display(), "No store file yet, starting empty");
            StoreSnapshot::default()
        };

        Ok(Self {
            path: Some(path),
            snapshot,
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            snapshot: StoreSnapshot::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the snapshot via a temp file and rename.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.snapshot)?)?;
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), stats = self.snapshot.stats.len(), "Store saved");
        Ok(())
    }

    /// Re-read the snapshot from disk and report what it holds.
    pub fn check(&self) -> Result<StoreStatus> {
        let Some(path) = &self.path else {
            return Ok(StoreStatus {
                path: None,
                exists: false,
                stats: self.snapshot.stats.len(),
                timeframes: self.snapshot.timeframes.len(),
            });
        };

        if !path.exists() {
            return Ok(StoreStatus {
                path: Some(path.clone()),
                exists: false,
                stats: 0,
                timeframes: 0,
            });
        }

        let snapshot: StoreSnapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(StoreStatus {
            path: Some(path.clone()),
            exists: true,
            stats: snapshot.stats.len(),
            timeframes: snapshot.timeframes.len(),
        })
    }

    pub fn get_timeframe(&self, year: i32, month: Month) -> Option<&TimeFrame> {
        self.snapshot
            .timeframes
            .iter()
            .find(|tf| tf.year == year && tf.month == month.number())
    }

    /// Existing time frame for (year, month), or a newly created one.
    pub fn get_or_create_timeframe(&mut self, year: i32, month: Month) -> TimeFrame {
        if let Some(tf) = self.get_timeframe(year, month) {
            return tf.clone();
        }

        self.snapshot.next_timeframe_id += 1;
        let tf = TimeFrame {
            id: self.snapshot.next_timeframe_id,
            year,
            month: month.number(),
        };
        self.snapshot.timeframes.push(tf.clone());
        tf
    }

    pub fn contains(&self, country_id: &str, year: i32, month: Month) -> bool {
        self.get_timeframe(year, month).is_some_and(|tf| {
            self.snapshot
                .stats
                .iter()
                .any(|s| s.timeframe_id == tf.id && s.country_id == country_id)
        })
    }

    /// Insert one stat, deriving its country identifier first.
    pub fn insert_stat(&mut self, new: NewCountryStat) -> Result<CountryStat> {
        let country_id = derive_country_id(&new.country);
        if country_id.is_empty() {
            return Err(StoreError::InvalidCountry(new.country));
        }
        if self.contains(&country_id, new.year, new.month) {
            return Err(StoreError::Duplicate {
                country_id,
                year: new.year,
                month: new.month,
            });
        }

        let tf = self.get_or_create_timeframe(new.year, new.month);
        self.snapshot.next_stat_id += 1;
        let stat = CountryStat {
            id: self.snapshot.next_stat_id,
            country_id,
            country: new.country.trim().to_string(),
            timeframe_id: tf.id,
            passengers: new.passengers,
            days_of_stay: new.days_of_stay,
            purpose_of_visit: new.purpose_of_visit,
        };
        self.snapshot.stats.push(stat.clone());
        Ok(stat)
    }

    fn timeframe_ids_for(&self, year: Option<i32>) -> Vec<u64> {
        self.snapshot
            .timeframes
            .iter()
            .filter(|tf| year.map_or(true, |y| tf.year == y))
            .map(|tf| tf.id)
            .collect()
    }

    /// Number of stats, optionally limited to one year.
    pub fn count(&self, year: Option<i32>) -> usize {
        let ids = self.timeframe_ids_for(year);
        self.snapshot
            .stats
            .iter()
            .filter(|s| ids.contains(&s.timeframe_id))
            .count()
    }

    /// Delete stats (all, or one year's) and then the time frames left
    /// without any stat, within the same scope.
    pub fn delete_stats(&mut self, year: Option<i32>) -> DeleteReport {
        let ids = self.timeframe_ids_for(year);

        let before = self.snapshot.stats.len();
        self.snapshot
            .stats
            .retain(|s| !ids.contains(&s.timeframe_id));
        let stats = before - self.snapshot.stats.len();

        let used: Vec<u64> = self.snapshot.stats.iter().map(|s| s.timeframe_id).collect();
        let before = self.snapshot.timeframes.len();
        self.snapshot
            .timeframes
            .retain(|tf| !(ids.contains(&tf.id) && !used.contains(&tf.id)));
        let timeframes = before - self.snapshot.timeframes.len();

        info!(?year, stats, timeframes, "Deleted stats");
        DeleteReport { stats, timeframes }
    }

    fn join(&self, stat: &CountryStat) -> Option<ArrivalRow> {
        let tf = self
            .snapshot
            .timeframes
            .iter()
            .find(|tf| tf.id == stat.timeframe_id)?;
        Some(ArrivalRow {
            id: stat.id,
            country_id: stat.country_id.clone(),
            country: stat.country.clone(),
            year: tf.year,
            month: tf.calendar_month()?,
            passengers: stat.passengers,
        })
    }

    /// Every stat joined with its time frame, by (year, month, country).
    pub fn rows(&self) -> Vec<ArrivalRow> {
        let mut rows: Vec<ArrivalRow> = self
            .snapshot
            .stats
            .iter()
            .filter_map(|s| self.join(s))
            .collect();
        rows.sort_by(|a, b| {
            (a.year, a.month, &a.country).cmp(&(b.year, b.month, &b.country))
        });
        rows
    }

    /// One country's rows by (year, month); the `Total` pseudo-country is
    /// never returned.
    pub fn rows_for_country(&self, country: &str) -> Vec<ArrivalRow> {
        let country = country.trim();
        if country.eq_ignore_ascii_case(TOTAL_COUNTRY) {
            return Vec::new();
        }
        self.rows()
            .into_iter()
            .filter(|r| r.country == country)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframes_are_shared() {
        let mut store = ArrivalStore::in_memory();
        let a = store.get_or_create_timeframe(2019, Month::March);
        let b = store.get_or_create_timeframe(2019, Month::March);
        let c = store.get_or_create_timeframe(2019, Month::April);
        assert_eq!(a, b);
        assert_ne!(a.id, c.id);
        assert_eq!(a.month, 3);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut store = ArrivalStore::in_memory();
        store
            .insert_stat(NewCountryStat::new("Sri Lanka", 2019, Month::May, 10))
            .unwrap();

        // Same normalized id, different spelling
        let err = store
            .insert_stat(NewCountryStat::new("sri lanka", 2019, Month::May, 20))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref country_id, .. } if country_id == "SRI_LANKA"));

        store
            .insert_stat(NewCountryStat::new("Sri Lanka", 2019, Month::June, 20))
            .unwrap();
        assert_eq!(store.count(None), 2);
    }

    #[test]
    fn invalid_country_is_rejected() {
        let mut store = ArrivalStore::in_memory();
        let err = store
            .insert_stat(NewCountryStat::new("!!", 2019, Month::May, 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCountry(_)));
    }

    #[test]
    fn delete_by_year_cleans_orphan_timeframes() {
        let mut store = ArrivalStore::in_memory();
        store.insert_stat(NewCountryStat::new("India", 2018, Month::January, 1)).unwrap();
        store.insert_stat(NewCountryStat::new("India", 2019, Month::January, 2)).unwrap();
        store.insert_stat(NewCountryStat::new("China", 2019, Month::February, 3)).unwrap();
        // orphan outside the deleted year survives
        store.get_or_create_timeframe(2017, Month::July);

        let report = store.delete_stats(Some(2019));
        assert_eq!(report, DeleteReport { stats: 2, timeframes: 2 });
        assert_eq!(store.count(None), 1);
        assert!(store.get_timeframe(2017, Month::July).is_some());
        assert!(store.get_timeframe(2018, Month::January).is_some());

        let report = store.delete_stats(None);
        assert_eq!(report, DeleteReport { stats: 1, timeframes: 2 });
        assert_eq!(store.count(None), 0);
    }

    #[test]
    fn rows_are_ordered_and_exclude_total() {
        let mut store = ArrivalStore::in_memory();
        store.insert_stat(NewCountryStat::new("India", 2019, Month::March, 3)).unwrap();
        store.insert_stat(NewCountryStat::new("India", 2019, Month::January, 1)).unwrap();
        store.insert_stat(NewCountryStat::new("Total", 2019, Month::January, 99)).unwrap();

        let rows = store.rows_for_country("India");
        let months: Vec<Month> = rows.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Month::January, Month::March]);
        assert!(store.rows_for_country("Total").is_empty());
        assert_eq!(store.rows().len(), 3);
    }

    #[test]
    fn save_and_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = ArrivalStore::open(&path).unwrap();
        assert!(!store.check().unwrap().exists);
        store.insert_stat(NewCountryStat::new("Japan", 2020, Month::April, 42)).unwrap();
        store.save().unwrap();

        let reopened = ArrivalStore::open(&path).unwrap();
        assert_eq!(reopened.rows(), store.rows());
        let status = reopened.check().unwrap();
        assert!(status.exists);
        assert_eq!(status.stats, 1);
        assert_eq!(status.timeframes, 1);

        // ids keep counting after reopen
        let mut reopened = reopened;
        let next = reopened
            .insert_stat(NewCountryStat::new("Japan", 2020, Month::May, 1))
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(ArrivalStore::open(&path), Err(StoreError::Json(_))));
    }
}
