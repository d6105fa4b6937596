//! Environment-based configuration.

use std::env;
use std::path::PathBuf;

/// Runtime configuration; CLI flags override these values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `all_country_arrivals_<year>.csv` files
    pub data_dir: PathBuf,

    /// JSON snapshot backing the stats store
    pub store_path: PathBuf,

    /// Rendered chart size in pixels
    pub chart_width: u32,
    pub chart_height: u32,

    /// Records per page for the paginated listing
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("TRAVELLER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/arrival/all_countries")),

            store_path: env::var("TRAVELLER_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("traveller_store.json")),

            chart_width: env::var("TRAVELLER_CHART_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1400),

            chart_height: env::var("TRAVELLER_CHART_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),

            page_size: env::var("TRAVELLER_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or(10),
        }
    }

    /// Conventional location of one year's arrival table.
    pub fn arrivals_file(&self, year: i32) -> PathBuf {
        self.data_dir
            .join(format!("all_country_arrivals_{year}.csv"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrivals_file_follows_naming_convention() {
        let config = Config {
            data_dir: PathBuf::from("data/arrival/all_countries"),
            store_path: PathBuf::from("store.json"),
            chart_width: 800,
            chart_height: 600,
            page_size: 10,
        };
        assert_eq!(
            config.arrivals_file(2019),
            PathBuf::from("data/arrival/all_countries/all_country_arrivals_2019.csv")
        );
    }
}
