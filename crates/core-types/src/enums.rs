use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The regulatory report forms the backend serves.
///
/// Each form has its own indicator vocabulary, so codes from one form are
/// never compared against codes from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportForm {
    /// Turnover balance sheet; queried per (bank, account code, period).
    #[serde(rename = "f101")]
    Form101,
    /// Capital calculation; fixed row vocabulary, queried per (bank, date).
    #[serde(rename = "f123")]
    Form123,
    /// Statement of changes in equity; fixed column vocabulary, queried per (bank, date).
    #[serde(rename = "f810")]
    Form810,
}

impl ReportForm {
    /// The path segment used by the backend for this form, e.g. `f123`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ReportForm::Form101 => "f101",
            ReportForm::Form123 => "f123",
            ReportForm::Form810 => "f810",
        }
    }

    /// Whether the form has a fixed schema (one request per bank and date).
    pub fn is_fixed_schema(&self) -> bool {
        !matches!(self, ReportForm::Form101)
    }
}

impl fmt::Display for ReportForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ReportForm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f101" | "101" => Ok(ReportForm::Form101),
            "f123" | "123" => Ok(ReportForm::Form123),
            "f810" | "810" => Ok(ReportForm::Form810),
            other => Err(CoreError::UnknownForm(other.to_string())),
        }
    }
}
