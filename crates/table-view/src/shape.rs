use crate::format::format_number;
use api_client::{StatisticHeader, StatisticObservation, StatisticResponse};
use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// One date's cells. A column with a `None` value was reported as null;
/// a column that is absent was not reported at all.
pub type Row = IndexMap<String, Option<Decimal>>;

/// A date-keyed table built from flat observations, rows in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapedTable {
    rows: IndexMap<String, Row>,
}

impl ShapedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one cell, creating the row if needed. A later write to the same
    /// cell replaces the earlier one.
    pub fn set(&mut self, date: &str, column: impl Into<String>, value: Option<Decimal>) {
        self.rows
            .entry(date.to_string())
            .or_default()
            .insert(column.into(), value);
    }

    pub fn row(&self, date: &str) -> Option<&Row> {
        self.rows.get(date)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(date, row)| (date.as_str(), row))
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The union of all rows' columns: the first row's columns in order,
    /// then every column not seen yet as the later rows introduce it.
    pub fn columns(&self) -> Vec<&str> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for row in self.rows.values() {
            seen.extend(row.keys().map(String::as_str));
        }
        seen.into_iter().collect()
    }

    /// The display cells of `date` across `columns`: reported values are
    /// formatted (a reported null included) and absent columns get `placeholder`.
    pub fn normalized_row(&self, date: &str, columns: &[&str], placeholder: &str) -> Option<Vec<String>> {
        let row = self.rows.get(date)?;
        Some(
            columns
                .iter()
                .map(|column| match row.get(*column) {
                    Some(value) => format_number(*value),
                    None => placeholder.to_string(),
                })
                .collect(),
        )
    }
}

/// Column name of an observation: the header's name, or `id_<element_id>`
/// when the header is missing or unnamed.
fn column_name(element_id: i64, headers: &HashMap<i64, &str>) -> String {
    match headers.get(&element_id) {
        Some(name) if !name.is_empty() => (*name).to_string(),
        _ => format!("id_{element_id}"),
    }
}

/// Builds the date → column → value table from flat observations.
///
/// Every observation lands somewhere: unknown columns get a synthetic name.
/// If two observations share a date and column, the later one wins.
pub fn shape_observations<'a>(
    observations: impl IntoIterator<Item = &'a StatisticObservation>,
    headers: &[StatisticHeader],
) -> ShapedTable {
    let mut header_names: HashMap<i64, &str> = HashMap::with_capacity(headers.len());
    for header in headers {
        header_names.insert(header.id, header.elname.as_str());
    }

    let mut table = ShapedTable::new();
    for observation in observations {
        let column = column_name(observation.element_id, &header_names);
        table.set(&observation.dt, column, observation.obs_val);
    }
    tracing::debug!(rows = table.len(), "Shaped statistic observations.");
    table
}

pub fn shape_statistic(response: &StatisticResponse) -> ShapedTable {
    shape_observations(&response.raw_data, &response.header_data)
}
