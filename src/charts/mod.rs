//! Charts module - Trend chart rendering

mod plotter;

pub use plotter::{ChartError, CountrySeries, PlotOptions, TrendPlotter, PALETTE};
