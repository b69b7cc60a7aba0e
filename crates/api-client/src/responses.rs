use chrono::{DateTime, Utc};
use core_types::Bank;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// The statistic payloads keep the backend's mixed-case field names via explicit renames.

/// The response from `GET /api/indicators/all-banks/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllBanksResponse {
    #[serde(default)]
    pub banks: Vec<Bank>,
}

/// The response from `POST /api/indicators/<form>/bank-datetimes/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupportedDatesResponse {
    #[serde(default)]
    pub datetimes: Vec<DateTime<Utc>>,
}

/// The error body the backend sends alongside a 4xx/5xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Which interest-rate publication a statistic request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticKind {
    CreditRates,
    DepositRates,
}

impl StatisticKind {
    pub fn path(&self) -> &'static str {
        match self {
            StatisticKind::CreditRates => "/api/parse/interest_rates_credit",
            StatisticKind::DepositRates => "/api/parse/interest_rates_deposit",
        }
    }
}

/// Request body of the statistic endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StatisticParams {
    pub publication_id: i64,
    pub dataset_id: i64,
    pub measure_id: i64,
    pub from_year: i32,
    pub to_year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticDataRange {
    #[serde(rename = "FromY", default)]
    pub from_year: i32,
    #[serde(rename = "ToY", default)]
    pub to_year: i32,
}

/// One observation of a statistic time series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticObservation {
    #[serde(rename = "colId", default)]
    pub col_id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub digits: i32,
    /// The period the value belongs to; this is the row key of a shaped table.
    #[serde(default)]
    pub dt: String,
    /// Resolved against `headerData` to name the column.
    #[serde(default)]
    pub element_id: i64,
    #[serde(default)]
    pub measure_id: i64,
    #[serde(default)]
    pub obs_val: Option<Decimal>,
    #[serde(default)]
    pub periodicity: String,
    #[serde(rename = "rowId", default)]
    pub row_id: i64,
    #[serde(default)]
    pub unit_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticInfo {
    #[serde(rename = "PublName", default)]
    pub publication_name: String,
    #[serde(rename = "dsName", default)]
    pub dataset_name: String,
    #[serde(rename = "sType", default)]
    pub s_type: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticHeader {
    pub elname: String,
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticUnit {
    pub id: i64,
    pub val: String,
}

/// The response of the statistic endpoints. Every section may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatisticResponse {
    #[serde(rename = "DTRange", default)]
    pub date_ranges: Vec<StatisticDataRange>,
    #[serde(rename = "RawData", default)]
    pub raw_data: Vec<StatisticObservation>,
    #[serde(rename = "SType", default)]
    pub info: Vec<StatisticInfo>,
    #[serde(rename = "headerData", default)]
    pub header_data: Vec<StatisticHeader>,
    #[serde(default)]
    pub units: Vec<StatisticUnit>,
}
