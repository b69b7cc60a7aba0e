use crate::cache::{QueryCache, QueryKey};
use crate::dates::month_to_api_date;
use crate::error::ComparisonError;
use crate::matrix::{Cell, ResultMatrix};
use api_client::ReportingApi;
use core_types::{Bank, ReportForm};
use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A column of the Form 810 statement of changes in equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormColumn {
    pub key: &'static str,
    pub label: &'static str,
}

/// The Form 810 columns shown in comparisons.
pub const F810_COLUMNS: &[FormColumn] = &[
    FormColumn { key: "USTKAP", label: "Уставный капитал" },
    FormColumn { key: "EMIS_DOH", label: "Эмиссионный доход" },
    FormColumn { key: "PER_CB", label: "Переоценка ценных бумаг" },
    FormColumn { key: "PER_OS", label: "Переоценка основных средств" },
    FormColumn { key: "DELTADVR", label: "Дельта ДВР" },
    FormColumn { key: "REZERVF", label: "Резервный фонд" },
    FormColumn { key: "NERASP_PU", label: "Нераспределенная прибыль (убыток)" },
    FormColumn { key: "ITOGO_IK", label: "Итого источники капитала" },
];

/// The Form 123 rows shown in comparisons, matched against item names.
pub const F123_ROWS: &[&str] = &[
    "Собственные средства (капитал)",
    "Базовый капитал",
    "Добавочный капитал",
    "Основной капитал",
    "Дополнительный капитал",
    "Источники базового капитала",
    "Показатели, уменьшающие источники базового капитала",
];

/// Row or column keys of a fixed-schema form, in display order.
pub fn vocabulary(form: ReportForm) -> Vec<&'static str> {
    match form {
        ReportForm::Form810 => F810_COLUMNS.iter().map(|column| column.key).collect(),
        ReportForm::Form123 => F123_ROWS.to_vec(),
        ReportForm::Form101 => Vec::new(),
    }
}

/// Strings and other non-numbers read as "no value".
fn as_decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(number) => serde_json::from_value(Value::Number(number.clone())).ok(),
        _ => None,
    }
}

fn empty_record(keys: &[&str]) -> IndexMap<String, Option<Decimal>> {
    keys.iter().map(|key| (key.to_string(), None)).collect()
}

/// Reads the first element of a Form 810 response into the fixed columns.
///
/// Always returns every column; anything missing or non-numeric is `None`.
pub fn parse_f810(data: Option<&Value>) -> IndexMap<String, Option<Decimal>> {
    let keys = vocabulary(ReportForm::Form810);
    let mut out = empty_record(&keys);

    let Some(first_row) = data.and_then(Value::as_array).and_then(|rows| rows.first()) else {
        return out;
    };
    for key in keys {
        out.insert(key.to_string(), as_decimal(first_row.get(key)));
    }
    out
}

/// Reads a Form 123 response (`[{name, value}]`) into the fixed rows.
///
/// An item lands on the row with the same trimmed name, otherwise on the first
/// row whose name contains it or is contained in it. Unmatched items are dropped.
pub fn parse_f123(data: Option<&Value>) -> IndexMap<String, Option<Decimal>> {
    let mut out = empty_record(F123_ROWS);

    let Some(items) = data.and_then(Value::as_array) else {
        return out;
    };
    for item in items {
        let Some(name) = item.get("name").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        // An empty name would be "contained" in every row.
        if name.is_empty() {
            continue;
        }
        let value = as_decimal(item.get("value"));

        let row = F123_ROWS
            .iter()
            .find(|row| **row == name)
            .or_else(|| F123_ROWS.iter().find(|row| row.contains(name) || name.contains(**row)));
        if let Some(row) = row {
            out.insert(row.to_string(), value);
        }
    }
    out
}

pub fn parse_form(form: ReportForm, data: Option<&Value>) -> IndexMap<String, Option<Decimal>> {
    match form {
        ReportForm::Form810 => parse_f810(data),
        ReportForm::Form123 => parse_f123(data),
        ReportForm::Form101 => IndexMap::new(),
    }
}

/// Runs fixed-schema form comparisons: one query per bank for a reporting month.
pub struct FormOrchestrator {
    api: Arc<dyn ReportingApi>,
    cache: QueryCache<QueryKey, Value>,
}

impl FormOrchestrator {
    pub fn new(api: Arc<dyn ReportingApi>, stale_after: Duration) -> Self {
        Self {
            api,
            cache: QueryCache::new(stale_after),
        }
    }

    pub fn cache(&self) -> &QueryCache<QueryKey, Value> {
        &self.cache
    }

    /// Builds the bank × row matrix of `form` for `month` (`YYYY-MM`).
    ///
    /// Every bank gets every row of the form. A failed query marks all of that
    /// bank's cells as errors; other banks are unaffected.
    pub async fn compare(
        &self,
        form: ReportForm,
        banks: &[Bank],
        month: Option<&str>,
    ) -> Result<ResultMatrix<Decimal>, ComparisonError> {
        if !form.is_fixed_schema() {
            return Err(ComparisonError::NotFixedSchema(form));
        }
        let Some(dt) = month_to_api_date(month) else {
            tracing::debug!(%form, "Form comparison skipped: reporting month not resolved.");
            return Ok(ResultMatrix::new());
        };
        if banks.is_empty() {
            return Ok(ResultMatrix::new());
        }

        let reg_numbers: IndexSet<&str> = banks.iter().map(|bank| bank.reg_number.as_str()).collect();
        tracing::info!(%form, banks = reg_numbers.len(), %dt, "Running form comparison.");

        let queries = reg_numbers.iter().map(|&reg_number| {
            let key = QueryKey::Form {
                form,
                reg_number: reg_number.to_string(),
                dt,
            };
            let api = self.api.clone();
            let reg = reg_number.to_string();
            async move {
                let result = self
                    .cache
                    .get_or_fetch(key, move || async move {
                        api.fetch_form_indicators(form, &reg, dt).await
                    })
                    .await;
                (reg_number, result)
            }
        });
        let results: HashMap<_, _> = join_all(queries).await.into_iter().collect();

        let keys = vocabulary(form);
        let mut matrix = ResultMatrix::new();
        for reg_number in reg_numbers {
            match results.get(reg_number) {
                Some(Ok(raw)) => {
                    for (key, value) in parse_form(form, Some(raw)) {
                        matrix.insert(reg_number, &key, Cell::ready(value));
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(%form, reg_number, error = %e, "Form query failed.");
                    for key in &keys {
                        matrix.insert(reg_number, key, Cell::failed(e.to_string()));
                    }
                }
                None => {
                    for key in &keys {
                        matrix.insert(reg_number, key, Cell::ready(None));
                    }
                }
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn f810_reads_first_row_only() {
        let data = json!([
            {"NUM_STR": 1, "USTKAP": 1000, "EMIS_DOH": 12.5, "PER_CB": "n/a", "ITOGO_IK": null},
            {"NUM_STR": 2, "USTKAP": 9999}
        ]);
        let record = parse_f810(Some(&data));
        assert_eq!(record.len(), F810_COLUMNS.len());
        assert_eq!(record["USTKAP"], Some(dec!(1000)));
        assert_eq!(record["EMIS_DOH"], Some(dec!(12.5)));
        assert_eq!(record["PER_CB"], None);
        assert_eq!(record["ITOGO_IK"], None);
        assert_eq!(record["REZERVF"], None);
    }

    #[test]
    fn f810_non_list_is_all_empty() {
        for data in [json!({"message": "error"}), json!([]), json!("text")] {
            let record = parse_f810(Some(&data));
            assert!(record.values().all(Option::is_none));
            assert_eq!(record.len(), F810_COLUMNS.len());
        }
        assert!(parse_f810(None).values().all(Option::is_none));
    }

    #[test]
    fn f123_matches_exact_then_by_containment() {
        let data = json!([
            {"name": "  Базовый капитал ", "value": 10},
            {"name": "Дополнительный капитал, итого", "value": 20},
            {"name": "Собственные средства", "value": 30},
            {"name": "Что-то постороннее", "value": 40},
            {"name": "", "value": 50},
            {"value": 60}
        ]);
        let record = parse_f123(Some(&data));
        assert_eq!(record["Базовый капитал"], Some(dec!(10)));
        assert_eq!(record["Дополнительный капитал"], Some(dec!(20)));
        assert_eq!(record["Собственные средства (капитал)"], Some(dec!(30)));
        assert_eq!(record["Добавочный капитал"], None);
        assert_eq!(record.len(), F123_ROWS.len());
    }

    #[test]
    fn f123_null_value_stays_empty() {
        let data = json!([{"name": "Основной капитал", "value": null}]);
        assert_eq!(parse_f123(Some(&data))["Основной капитал"], None);
    }

    #[test]
    fn form_101_has_no_fixed_vocabulary() {
        assert!(vocabulary(ReportForm::Form101).is_empty());
        assert!(parse_form(ReportForm::Form101, None).is_empty());
    }
}
