use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A credit organisation as listed by the backend's bank directory.
///
/// `reg_number` is the key used in every data query; `bic` is what the
/// user sees and what removal from a selection is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bank {
    pub bic: String,
    pub name: String,
    pub reg_number: String,
    #[serde(default)]
    pub internal_code: String,
    #[serde(default)]
    pub registration_date: String,
    #[serde(default)]
    pub region_code: String,
    #[serde(default)]
    pub tax_id: String,
}

impl Bank {
    /// A bank with only the fields the comparison needs. Handy for tests and CLI input.
    pub fn new(bic: impl Into<String>, name: impl Into<String>, reg_number: impl Into<String>) -> Self {
        Self {
            bic: bic.into(),
            name: name.into(),
            reg_number: reg_number.into(),
            internal_code: String::new(),
            registration_date: String::new(),
            region_code: String::new(),
            tax_id: String::new(),
        }
    }
}

/// A selectable indicator of the generic (Form 101) report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indicator {
    pub ind_code: String,
    pub name: String,
}

impl Indicator {
    pub fn new(ind_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ind_code: ind_code.into(),
            name: name.into(),
        }
    }
}

/// The value of one indicator for one bank over a period.
///
/// The backend calls these `vitg` (incoming total) and `iitg` (outgoing total).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorValue {
    #[serde(rename = "vitg", default)]
    pub value_at_start: Option<Decimal>,
    #[serde(rename = "iitg", default)]
    pub value_at_end: Option<Decimal>,
}

impl IndicatorValue {
    /// End-of-period value minus start-of-period value, when both are known.
    pub fn change(&self) -> Option<Decimal> {
        Some(self.value_at_end? - self.value_at_start?)
    }
}
