pub mod enums;
pub mod error;
pub mod period;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::ReportForm;
pub use error::CoreError;
pub use period::YearMonth;
pub use structs::{Bank, Indicator, IndicatorValue};
