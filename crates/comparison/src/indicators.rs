use crate::cache::{QueryCache, QueryKey};
use crate::dates::format_query_instant;
use crate::matrix::{Cell, ResultMatrix};
use api_client::ReportingApi;
use chrono::NaiveDateTime;
use core_types::{Bank, Indicator, IndicatorValue};
use futures::future::join_all;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Runs Form 101 comparisons: one query per (bank, indicator) pair.
pub struct IndicatorOrchestrator {
    api: Arc<dyn ReportingApi>,
    cache: QueryCache<QueryKey, IndicatorValue>,
}

impl IndicatorOrchestrator {
    pub fn new(api: Arc<dyn ReportingApi>, stale_after: Duration) -> Self {
        Self {
            api,
            cache: QueryCache::new(stale_after),
        }
    }

    pub fn cache(&self) -> &QueryCache<QueryKey, IndicatorValue> {
        &self.cache
    }

    /// Builds the bank × indicator matrix for `[date_from, date_to]`.
    ///
    /// Returns an empty matrix, without touching the network, when either
    /// selection is empty or either boundary is unknown. All pairs are queried
    /// concurrently; a failed pair becomes an error cell and nothing else.
    /// Results are matched to cells by their query key, so the order in which
    /// responses arrive is irrelevant.
    pub async fn compare(
        &self,
        banks: &[Bank],
        indicators: &[Indicator],
        date_from: Option<NaiveDateTime>,
        date_to: Option<NaiveDateTime>,
    ) -> ResultMatrix<IndicatorValue> {
        let (Some(date_from), Some(date_to)) = (date_from, date_to) else {
            tracing::debug!("Comparison skipped: period boundary not resolved.");
            return ResultMatrix::new();
        };
        if banks.is_empty() || indicators.is_empty() {
            tracing::debug!("Comparison skipped: empty selection.");
            return ResultMatrix::new();
        }

        // A repeated bank or indicator in the selection is still one query.
        let pairs: IndexSet<(&str, &str)> = banks
            .iter()
            .flat_map(|bank| {
                indicators
                    .iter()
                    .map(move |indicator| (bank.reg_number.as_str(), indicator.ind_code.as_str()))
            })
            .collect();

        tracing::info!(
            banks = banks.len(),
            indicators = indicators.len(),
            queries = pairs.len(),
            from = %date_from,
            to = %date_to,
            "Running indicator comparison."
        );

        let from_param = format_query_instant(date_from);
        let to_param = format_query_instant(date_to);

        let queries = pairs.iter().map(|&(reg_number, ind_code)| {
            let key = QueryKey::Indicator {
                reg_number: reg_number.to_string(),
                ind_code: ind_code.to_string(),
                date_from,
                date_to,
            };
            let api = self.api.clone();
            let (reg, code) = (reg_number.to_string(), ind_code.to_string());
            let (from, to) = (from_param.clone(), to_param.clone());
            async move {
                let result = self
                    .cache
                    .get_or_fetch(key, move || async move {
                        api.fetch_indicator_value(&reg, &code, &from, &to).await
                    })
                    .await;
                ((reg_number, ind_code), result)
            }
        });

        let results: HashMap<_, _> = join_all(queries).await.into_iter().collect();

        let mut matrix = ResultMatrix::new();
        for bank in banks {
            for indicator in indicators {
                let pair = (bank.reg_number.as_str(), indicator.ind_code.as_str());
                let cell = match results.get(&pair) {
                    Some(Ok(value)) => Cell::ready(Some(*value)),
                    Some(Err(e)) => {
                        tracing::warn!(
                            reg_number = pair.0,
                            ind_code = pair.1,
                            error = %e,
                            "Indicator query failed."
                        );
                        Cell::failed(e.to_string())
                    }
                    None => Cell::ready(None),
                };
                matrix.insert(pair.0, pair.1, cell);
            }
        }

        matrix
    }
}
