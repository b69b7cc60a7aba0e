use indexmap::IndexMap;
use serde::Serialize;

/// One cell of a comparison: a value, nothing, or nothing because the query failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell<V> {
    pub value: Option<V>,
    pub error: Option<String>,
}

impl<V> Cell<V> {
    pub fn ready(value: Option<V>) -> Self {
        Self { value, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Bank registration number → indicator (or form row/column) → cell.
///
/// Iteration follows the selection order the matrix was built from. A matrix
/// is rebuilt for every run and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultMatrix<V> {
    banks: IndexMap<String, IndexMap<String, Cell<V>>>,
}

impl<V> Default for ResultMatrix<V> {
    fn default() -> Self {
        Self {
            banks: IndexMap::new(),
        }
    }
}

impl<V> ResultMatrix<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reg_number: &str, code: &str, cell: Cell<V>) {
        self.banks
            .entry(reg_number.to_string())
            .or_default()
            .insert(code.to_string(), cell);
    }

    pub fn get(&self, reg_number: &str, code: &str) -> Option<&Cell<V>> {
        self.banks.get(reg_number)?.get(code)
    }

    /// The resolved value, if the cell exists and holds one.
    pub fn value(&self, reg_number: &str, code: &str) -> Option<&V> {
        self.get(reg_number, code)?.value.as_ref()
    }

    pub fn is_error(&self, reg_number: &str, code: &str) -> bool {
        self.get(reg_number, code).is_some_and(Cell::is_error)
    }

    pub fn bank(&self, reg_number: &str) -> Option<&IndexMap<String, Cell<V>>> {
        self.banks.get(reg_number)
    }

    pub fn banks(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Cell<V>>)> {
        self.banks.iter().map(|(reg, row)| (reg.as_str(), row))
    }

    /// `(reg_number, code, error)` for every failed cell, in matrix order.
    pub fn failed_cells(&self) -> Vec<(&str, &str, &str)> {
        self.banks
            .iter()
            .flat_map(|(reg, row)| {
                row.iter().filter_map(move |(code, cell)| {
                    cell.error
                        .as_deref()
                        .map(|error| (reg.as_str(), code.as_str(), error))
                })
            })
            .collect()
    }

    /// Number of cells across all banks.
    pub fn len(&self) -> usize {
        self.banks.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
