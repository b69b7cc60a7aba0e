//! # BankIQ Table View
//!
//! Pure presentation logic for comparison and statistic tables. Nothing here
//! performs I/O; every function takes data in and hands a shaped or filtered
//! view back out, so the CLI (or any other front end) only has to draw it.
//!
//! ## Public API
//!
//! - `ShapedTable`: a dense, date-keyed table built from flat observations.
//! - `ColumnSelection` / `ExpandableRows`: the displayed subset of a table.
//! - `YearRange`: the validated year filter of statistic queries.
//! - `RATE_TABLES`: the interest-rate tables the backend publishes.
//! - `format_number`: the display form of a decimal value.

pub mod error;
pub mod format;
pub mod presets;
pub mod shape;
pub mod view;
pub mod year_range;

// Re-export the key components to create a clean, public-facing API.
pub use error::YearRangeError;
pub use format::{format_number, PLACEHOLDER};
pub use presets::{rate_table, RateTable, RATE_TABLES};
pub use shape::{shape_observations, shape_statistic, ShapedTable};
pub use view::{ColumnSelection, ContainerStyle, ExpandableRows, Overflow};
pub use year_range::{available_from_years, available_to_years, available_years, YearRange};
