use core_types::ReportForm;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("Form {0} has no fixed schema; compare it per indicator instead.")]
    NotFixedSchema(ReportForm),
}
