use crate::responses::{AllBanksResponse, ErrorResponse, SupportedDatesResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::ApiSettings;
use core_types::{Bank, Indicator, IndicatorValue, ReportForm};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::ApiError;
pub use responses::{
    StatisticHeader, StatisticKind, StatisticObservation, StatisticParams, StatisticResponse,
};

/// The generic, abstract interface to the regulatory reporting backend.
/// This trait is the contract the orchestrators use, allowing the
/// underlying implementation (HTTP or in-memory) to be swapped out.
#[async_trait]
pub trait ReportingApi: Send + Sync {
    /// Fetches the directory of all banks.
    async fn fetch_all_banks(&self) -> Result<Vec<Bank>, ApiError>;

    /// Fetches the catalogue of distinct Form 101 indicators for the selection UI.
    async fn fetch_unique_indicators(&self) -> Result<Vec<Indicator>, ApiError>;

    /// Fetches one indicator for one bank over `[date_from, date_to]`.
    ///
    /// Dates are sent as `YYYY-MM-DDTHH:MM:SS` without a zone.
    async fn fetch_indicator_value(
        &self,
        reg_number: &str,
        ind_code: &str,
        date_from: &str,
        date_to: &str,
    ) -> Result<IndicatorValue, ApiError>;

    /// Fetches a fixed-schema form for one bank as of `dt`. The raw JSON is returned;
    /// shape validation belongs to the form parsers.
    async fn fetch_form_indicators(
        &self,
        form: ReportForm,
        reg_number: &str,
        dt: DateTime<Utc>,
    ) -> Result<Value, ApiError>;

    /// Fetches the reporting dates available for a bank on a form.
    async fn fetch_supported_dates(
        &self,
        form: ReportForm,
        reg_number: &str,
    ) -> Result<Vec<DateTime<Utc>>, ApiError>;

    /// Fetches an interest-rate statistic table.
    async fn fetch_statistic(
        &self,
        kind: StatisticKind,
        params: &StatisticParams,
    ) -> Result<StatisticResponse, ApiError>;
}

/// A concrete implementation of `ReportingApi` over the backend's REST endpoints.
#[derive(Clone)]
pub struct BankIqClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct IndicatorDataRequest<'a> {
    reg_number: i64,
    ind_code: &'a str,
    date_from: &'a str,
    date_to: &'a str,
}

#[derive(Serialize)]
struct FormDataRequest {
    reg_number: i64,
    dt: String,
}

#[derive(Serialize)]
struct RegNumberRequest {
    reg_number: i64,
}

impl BankIqClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read_body(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::read_body(response).await
    }

    async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            // The backend usually explains itself in `{"message": ...}`; fall back to the raw body.
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// The backend keys banks by integer registration number; the directory serves it as text.
fn parse_reg_number(reg_number: &str) -> Result<i64, ApiError> {
    reg_number
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidData(format!("Invalid registration number: {reg_number:?}")))
}

#[async_trait]
impl ReportingApi for BankIqClient {
    async fn fetch_all_banks(&self) -> Result<Vec<Bank>, ApiError> {
        let response: AllBanksResponse = self.get_json("/api/indicators/all-banks/").await?;
        Ok(response.banks)
    }

    async fn fetch_unique_indicators(&self) -> Result<Vec<Indicator>, ApiError> {
        self.get_json("/api/indicators/f101/unique-indicators/").await
    }

    async fn fetch_indicator_value(
        &self,
        reg_number: &str,
        ind_code: &str,
        date_from: &str,
        date_to: &str,
    ) -> Result<IndicatorValue, ApiError> {
        let body = IndicatorDataRequest {
            reg_number: parse_reg_number(reg_number)?,
            ind_code,
            date_from,
            date_to,
        };
        self.post_json("/api/indicators/f101/bank-indicator-data/", &body)
            .await
    }

    async fn fetch_form_indicators(
        &self,
        form: ReportForm,
        reg_number: &str,
        dt: DateTime<Utc>,
    ) -> Result<Value, ApiError> {
        let body = FormDataRequest {
            reg_number: parse_reg_number(reg_number)?,
            dt: dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        let path = format!("/api/indicators/{}/bank-indicator-data/", form.path_segment());
        self.post_json(&path, &body).await
    }

    async fn fetch_supported_dates(
        &self,
        form: ReportForm,
        reg_number: &str,
    ) -> Result<Vec<DateTime<Utc>>, ApiError> {
        let body = RegNumberRequest {
            reg_number: parse_reg_number(reg_number)?,
        };
        let path = format!("/api/indicators/{}/bank-datetimes/", form.path_segment());
        let response: SupportedDatesResponse = self.post_json(&path, &body).await?;
        Ok(response.datetimes)
    }

    async fn fetch_statistic(
        &self,
        kind: StatisticKind,
        params: &StatisticParams,
    ) -> Result<StatisticResponse, ApiError> {
        self.post_json(kind.path(), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg_numbers_must_be_numeric() {
        assert_eq!(parse_reg_number(" 1481 ").unwrap(), 1481);
        assert!(matches!(parse_reg_number("SBER"), Err(ApiError::InvalidData(_))));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let settings = ApiSettings {
            base_url: "https://reports.example/".to_string(),
            timeout_secs: 5,
        };
        let client = BankIqClient::new(&settings).unwrap();
        assert_eq!(client.base_url(), "https://reports.example");
    }

    #[tokio::test]
    async fn invalid_reg_number_fails_before_any_request() {
        // Port 9 (discard) is never contacted: the parameter check comes first.
        let settings = ApiSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        };
        let client = BankIqClient::new(&settings).unwrap();
        let result = client
            .fetch_indicator_value("not-a-number", "20202", "2024-01-01T00:00:00", "2024-01-31T23:59:59")
            .await;
        assert!(matches!(result, Err(ApiError::InvalidData(_))));
    }
}
