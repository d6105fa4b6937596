//! Store module - persisted arrival stats, import and read views

mod import;
mod models;
mod repository;
mod views;

pub use import::{import_aggregate, ImportReport};
pub use models::{
    derive_country_id, ArrivalRow, CountryStat, NewCountryStat, TimeFrame, DEFAULT_PURPOSE,
    TOTAL_COUNTRY,
};
pub use repository::{ArrivalStore, DeleteReport, StoreError, StoreStatus};
pub use views::{all_arrivals, arrivals_paginated, country_arrivals, paginate, ChartData, Page};
