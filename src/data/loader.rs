//! CSV Data Loader Module
//! Reads arrival tables into a Polars DataFrame, keeping every cell as raw text.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

/// Loads one arrival table from disk.
///
/// Loading is lenient: `load_data` reports failures through the log and
/// leaves the table unset, and `get_data` returns `None` until a load
/// succeeds. Use `try_load` when the typed error is needed.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: PathBuf,
}

impl DataLoader {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            df: None,
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Read the file, logging instead of returning the error.
    pub fn load_data(&mut self) -> bool {
        match self.try_load() {
            Ok(df) => {
                info!(
                    path = %self.file_path.display(),
                    rows = df.height(),
                    "Data loaded successfully."
                );
                self.df = Some(df);
                true
            }
            Err(e) => {
                error!(
                    path = %self.file_path.display(),
                    "An error occurred while loading the data: {e}"
                );
                false
            }
        }
    }

    /// Read the file with every column as a string column.
    pub fn try_load(&self) -> Result<DataFrame, LoaderError> {
        if !self.file_path.is_file() {
            return Err(LoaderError::NotFound(self.file_path.clone()));
        }

        // A zero-row schema inference window keeps all columns as String
        let df = LazyCsvReader::new(&self.file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        Ok(df)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_data(&self) -> Option<&DataFrame> {
        if self.df.is_none() {
            warn!("Data not loaded. Please call load_data() first.");
        }
        self.df.as_ref()
    }

    /// Take ownership of the loaded DataFrame, leaving the loader empty.
    pub fn into_data(self) -> Option<DataFrame> {
        if self.df.is_none() {
            warn!("Data not loaded. Please call load_data() first.");
        }
        self.df
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_cells_as_raw_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arrivals.csv");
        fs::write(
            &path,
            "Country,January,February\n\"Sri Lanka\",\"1,000\",N/A\nIndia,250,300\n",
        )
        .unwrap();

        let mut loader = DataLoader::new(&path);
        assert!(loader.load_data());
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(loader.get_columns(), vec!["Country", "January", "February"]);

        let df = loader.get_data().unwrap();
        let january = df.column("January").unwrap();
        assert_eq!(january.dtype(), &DataType::String);
        assert_eq!(january.str().unwrap().get(0), Some("1,000"));
        assert_eq!(january.str().unwrap().get(1), Some("250"));
    }

    #[test]
    fn missing_file_leaves_table_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DataLoader::new(dir.path().join("nope.csv"));

        assert!(!loader.load_data());
        assert!(loader.get_data().is_none());
        assert_eq!(loader.get_row_count(), 0);
        assert!(matches!(loader.try_load(), Err(LoaderError::NotFound(_))));
    }

    #[test]
    fn get_before_load_is_none() {
        let loader = DataLoader::new("unused.csv");
        assert!(loader.get_data().is_none());
        assert!(loader.get_columns().is_empty());
    }
}
