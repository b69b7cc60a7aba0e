use crate::dates::{month_range_end, month_range_start, previous_month_start};
use crate::indicators::IndicatorOrchestrator;
use crate::matrix::ResultMatrix;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{Bank, Indicator, IndicatorValue, YearMonth};
use indexmap::IndexMap;
use persistence::{read_persisted, write_persisted, SelectionStore};
use std::sync::Arc;

/// Store keys of the persisted comparison state.
pub mod keys {
    pub const BANKS: &str = "banks-list";
    pub const INDICATORS: &str = "selected-indicators";
    pub const FROM_MONTH: &str = "banks-from-month";
    pub const TO_MONTH: &str = "banks-to-month";
    pub const SHOW_DYNAMICS: &str = "banks-show-dynamics";
}

/// Registration numbers selected when the user has not picked any banks yet.
pub const DEFAULT_BANK_REGS: &[&str] = &[
    "1481", // Sberbank
    "2673", // T-Bank
    "1326", // Alfa-Bank
    "1000", // VTB
    "354",  // Gazprombank
    "3349", // Rosselkhozbank
    "963",  // Sovcombank
    "3292", // Raiffeisenbank
    "2275", // Uralsib
];

/// Indicators selected on first run.
pub fn default_indicators() -> Vec<Indicator> {
    vec![
        Indicator::new("20202", "Касса кредитных организаций"),
        Indicator::new("30102", "Корреспондентские счета в Банке России"),
        Indicator::new("42301", "Депозиты до востребования физических лиц"),
        Indicator::new("45509", "Кредиты физическим лицам на срок свыше 3 лет"),
    ]
}

/// The resolved query period of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

/// The user's comparison selection, written through to a `SelectionStore`.
///
/// Everything is read once in `open`; every setter persists immediately.
pub struct ComparisonSession {
    store: Arc<dyn SelectionStore>,
    selected_banks: Vec<Bank>,
    selected_indicators: Vec<Indicator>,
    from_month: Option<String>,
    to_month: Option<String>,
    show_dynamics: bool,
}

impl ComparisonSession {
    /// Loads the persisted selection, filling gaps with defaults relative to `today`,
    /// then normalizes the month range.
    pub fn open(store: Arc<dyn SelectionStore>, today: NaiveDate) -> Self {
        let current = YearMonth::from_date(today);
        let mut session = Self {
            selected_banks: read_persisted(store.as_ref(), keys::BANKS, Vec::new()),
            selected_indicators: read_persisted(store.as_ref(), keys::INDICATORS, default_indicators()),
            from_month: read_persisted(store.as_ref(), keys::FROM_MONTH, Some(current.previous().to_string())),
            to_month: read_persisted(store.as_ref(), keys::TO_MONTH, Some(current.to_string())),
            show_dynamics: read_persisted(store.as_ref(), keys::SHOW_DYNAMICS, true),
            store,
        };
        session.normalize_months(today);
        session
    }

    pub fn selected_banks(&self) -> &[Bank] {
        &self.selected_banks
    }

    pub fn selected_indicators(&self) -> &[Indicator] {
        &self.selected_indicators
    }

    pub fn from_month(&self) -> Option<&str> {
        self.from_month.as_deref()
    }

    pub fn to_month(&self) -> Option<&str> {
        self.to_month.as_deref()
    }

    pub fn show_dynamics(&self) -> bool {
        self.show_dynamics
    }

    pub fn set_from_month(&mut self, month: Option<String>) {
        self.from_month = month;
        write_persisted(self.store.as_ref(), keys::FROM_MONTH, &self.from_month);
    }

    pub fn set_to_month(&mut self, month: Option<String>) {
        self.to_month = month;
        write_persisted(self.store.as_ref(), keys::TO_MONTH, &self.to_month);
    }

    pub fn set_show_dynamics(&mut self, show: bool) {
        self.show_dynamics = show;
        write_persisted(self.store.as_ref(), keys::SHOW_DYNAMICS, &self.show_dynamics);
    }

    /// Keeps the month range sane:
    /// - a missing, unreadable or future `to` becomes the current month;
    /// - a missing or unreadable `from` becomes the month before the current one;
    /// - a `from` after `to` is pulled back to `to`.
    pub fn normalize_months(&mut self, today: NaiveDate) {
        let current = YearMonth::from_date(today);

        let to = match self.to_month.as_deref().and_then(|m| m.parse::<YearMonth>().ok()) {
            Some(to) if to <= current => to,
            _ => {
                self.set_to_month(Some(current.to_string()));
                current
            }
        };

        match self.from_month.as_deref().and_then(|m| m.parse::<YearMonth>().ok()) {
            Some(from) if from > to => self.set_from_month(Some(to.to_string())),
            Some(_) => {}
            None => self.set_from_month(Some(current.previous().to_string())),
        }
    }

    /// The period to query.
    ///
    /// `to` is the end of the `to` month. With dynamics on, `from` is the start
    /// of the `from` month; with dynamics off, it is the start of the month
    /// before the `to` boundary (or before `today` if there is none).
    pub fn effective_range(&self, today: NaiveDate) -> EffectiveRange {
        let to = month_range_end(self.to_month());
        let from = if self.show_dynamics {
            month_range_start(self.from_month())
        } else {
            None
        };
        let from = from.or_else(|| {
            let anchor = to.map(|to| to.date()).unwrap_or(today);
            Some(previous_month_start(anchor))
        });
        EffectiveRange { from, to }
    }

    pub fn set_banks(&mut self, banks: Vec<Bank>) {
        self.selected_banks = banks;
        write_persisted(self.store.as_ref(), keys::BANKS, &self.selected_banks);
    }

    /// Appends banks not already selected (by registration number).
    pub fn add_banks(&mut self, banks: impl IntoIterator<Item = Bank>) {
        let mut selected = self.selected_banks.clone();
        for bank in banks {
            if !selected.iter().any(|b| b.reg_number == bank.reg_number) {
                selected.push(bank);
            }
        }
        self.set_banks(selected);
    }

    pub fn remove_bank(&mut self, bic: &str) {
        let remaining = self
            .selected_banks
            .iter()
            .filter(|bank| bank.bic != bic)
            .cloned()
            .collect();
        self.set_banks(remaining);
    }

    pub fn set_indicators(&mut self, indicators: Vec<Indicator>) {
        self.selected_indicators = indicators;
        write_persisted(self.store.as_ref(), keys::INDICATORS, &self.selected_indicators);
    }

    /// Selects the default banks from the directory if nothing is selected yet.
    /// Returns whether the selection changed.
    pub fn apply_default_banks(&mut self, all_banks: &[Bank]) -> bool {
        if !self.selected_banks.is_empty() {
            return false;
        }
        let defaults: Vec<Bank> = all_banks
            .iter()
            .filter(|bank| DEFAULT_BANK_REGS.contains(&bank.reg_number.as_str()))
            .cloned()
            .collect();
        if defaults.is_empty() {
            return false;
        }
        self.set_banks(defaults);
        true
    }

    /// How many times each indicator code occurs in the selection.
    pub fn indicator_code_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for indicator in &self.selected_indicators {
            *counts.entry(indicator.ind_code.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Runs the comparison for the current selection.
    pub async fn run(
        &self,
        orchestrator: &IndicatorOrchestrator,
        today: NaiveDate,
    ) -> ResultMatrix<IndicatorValue> {
        let range = self.effective_range(today);
        orchestrator
            .compare(&self.selected_banks, &self.selected_indicators, range.from, range.to)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::format_query_instant;
    use persistence::MemoryStore;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
    }

    fn open(store: &Arc<MemoryStore>) -> ComparisonSession {
        ComparisonSession::open(store.clone(), today())
    }

    #[test]
    fn defaults_on_first_open() {
        let store = Arc::new(MemoryStore::new());
        let session = open(&store);
        assert!(session.selected_banks().is_empty());
        assert_eq!(session.selected_indicators(), default_indicators().as_slice());
        assert_eq!(session.from_month(), Some("2025-03"));
        assert_eq!(session.to_month(), Some("2025-04"));
        assert!(session.show_dynamics());
    }

    #[test]
    fn selections_survive_reopening() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut session = open(&store);
            session.add_banks([Bank::new("044525225", "Sber", "1481"), Bank::new("044525974", "T", "2673")]);
            session.remove_bank("044525974");
            session.set_show_dynamics(false);
            session.set_from_month(Some("2024-11".to_string()));
        }
        let session = open(&store);
        assert_eq!(session.selected_banks().len(), 1);
        assert_eq!(session.selected_banks()[0].reg_number, "1481");
        assert!(!session.show_dynamics());
        assert_eq!(session.from_month(), Some("2024-11"));
    }

    #[test]
    fn future_to_month_is_clamped_and_inverted_range_fixed() {
        let store = Arc::new(MemoryStore::new());
        store.write_value(keys::TO_MONTH, json!("2030-01")).unwrap();
        store.write_value(keys::FROM_MONTH, json!("2029-05")).unwrap();

        let session = open(&store);
        assert_eq!(session.to_month(), Some("2025-04"));
        assert_eq!(session.from_month(), Some("2025-04"));
        assert_eq!(store.read_value(keys::FROM_MONTH).unwrap(), Some(json!("2025-04")));
    }

    #[test]
    fn malformed_stored_values_fall_back() {
        let store = Arc::new(MemoryStore::new());
        store.write_value(keys::BANKS, json!("not a list")).unwrap();
        store.write_value(keys::TO_MONTH, json!("garbage")).unwrap();
        store.write_value(keys::FROM_MONTH, json!(null)).unwrap();

        let session = open(&store);
        assert!(session.selected_banks().is_empty());
        assert_eq!(session.to_month(), Some("2025-04"));
        assert_eq!(session.from_month(), Some("2025-03"));
    }

    #[test]
    fn effective_range_follows_dynamics_toggle() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(&store);
        session.set_from_month(Some("2025-01".to_string()));
        session.set_to_month(Some("2025-03".to_string()));

        let range = session.effective_range(today());
        assert_eq!(format_query_instant(range.from.unwrap()), "2025-01-01T00:00:00");
        assert_eq!(format_query_instant(range.to.unwrap()), "2025-03-31T23:59:59");

        session.set_show_dynamics(false);
        let range = session.effective_range(today());
        assert_eq!(format_query_instant(range.from.unwrap()), "2025-02-01T00:00:00");
    }

    #[test]
    fn default_banks_apply_only_to_an_empty_selection() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(&store);
        let directory = vec![
            Bank::new("044525225", "Sber", "1481"),
            Bank::new("000000001", "Small", "9999"),
            Bank::new("044525187", "VTB", "1000"),
        ];
        assert!(session.apply_default_banks(&directory));
        let regs: Vec<&str> = session.selected_banks().iter().map(|b| b.reg_number.as_str()).collect();
        assert_eq!(regs, vec!["1481", "1000"]);
        assert!(!session.apply_default_banks(&directory));
    }

    #[test]
    fn counts_repeated_indicator_codes() {
        let store = Arc::new(MemoryStore::new());
        let mut session = open(&store);
        session.set_indicators(vec![
            Indicator::new("20202", "Cash"),
            Indicator::new("30102", "Nostro"),
            Indicator::new("20202", "Cash again"),
        ]);
        let counts = session.indicator_code_counts();
        assert_eq!(counts["20202"], 2);
        assert_eq!(counts["30102"], 1);
    }
}
