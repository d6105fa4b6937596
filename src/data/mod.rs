//! Data module - CSV loading, reshaping and aggregation

mod analyzer;
mod loader;
mod month;
mod pipeline;
mod transformer;

pub use analyzer::{aggregate, MonthlyTrendAnalyzer, TrendAggregate};
pub use loader::{DataLoader, LoaderError};
pub use month::{Month, UnknownMonth};
pub use pipeline::{analyze_file, analyze_files, merge_outcomes, PipelineError, YearFile, YearOutcome};
pub use transformer::{
    parse_arrivals, TidyArrivalRecord, TidyTable, TransformError, TrendTransformer,
    ARRIVALS_COLUMN, COUNTRY_COLUMN, MONTH_COLUMN, TOTAL_COLUMN, YEAR_COLUMN,
};
