use thiserror::Error;

/// Why a year filter was rejected. The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YearRangeError {
    #[error("Select both years")]
    Missing,

    #[error("Select valid years")]
    NotANumber,

    #[error("Minimum year: {min}")]
    BelowMinimum { min: i32 },

    #[error("Maximum year: {max}")]
    AboveMaximum { max: i32 },

    #[error("The start year cannot be after the end year")]
    Inverted,
}
