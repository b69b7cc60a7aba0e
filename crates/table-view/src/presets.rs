use api_client::{StatisticKind, StatisticParams};

/// A named interest-rate table the backend can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateTable {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: StatisticKind,
    pub publication_id: i64,
    pub dataset_id: i64,
    pub measure_id: i64,
    /// Earliest year the publication covers.
    pub min_year: i32,
    pub default_from_year: i32,
    pub default_to_year: i32,
}

impl RateTable {
    pub fn params(&self, from_year: i32, to_year: i32) -> StatisticParams {
        StatisticParams {
            publication_id: self.publication_id,
            dataset_id: self.dataset_id,
            measure_id: self.measure_id,
            from_year,
            to_year,
        }
    }
}

pub const RATE_TABLES: &[RateTable] = &[
    RateTable {
        id: "summary",
        title: "Ставки по кредитам нефинансовым организациям. В целом по РФ",
        kind: StatisticKind::CreditRates,
        publication_id: 14,
        dataset_id: 25,
        measure_id: 2,
        min_year: 2014,
        default_from_year: 2024,
        default_to_year: 2025,
    },
    RateTable {
        id: "territorial",
        title: "Ставки по кредитам нефинансовым организациям в рублях. В территориальном разрезе",
        kind: StatisticKind::CreditRates,
        publication_id: 15,
        dataset_id: 30,
        measure_id: 23,
        min_year: 2019,
        default_from_year: 2024,
        default_to_year: 2025,
    },
    RateTable {
        id: "by-activity",
        title: "Ставки по кредитам нефинансовым организациям. По видам экономической деятельности",
        kind: StatisticKind::CreditRates,
        publication_id: 16,
        dataset_id: 35,
        measure_id: 21,
        min_year: 2019,
        default_from_year: 2024,
        default_to_year: 2025,
    },
    RateTable {
        id: "deposits-summary",
        title: "Ставки по вкладам физических лиц. В целом по РФ",
        kind: StatisticKind::DepositRates,
        publication_id: 18,
        dataset_id: 37,
        measure_id: 2,
        min_year: 2014,
        default_from_year: 2024,
        default_to_year: 2025,
    },
    RateTable {
        id: "deposits-territorial",
        title: "Ставки по вкладам физических лиц в рублях. В территориальном разрезе",
        kind: StatisticKind::DepositRates,
        publication_id: 19,
        dataset_id: 39,
        measure_id: 23,
        min_year: 2019,
        default_from_year: 2024,
        default_to_year: 2025,
    },
];

pub fn rate_table(id: &str) -> Option<&'static RateTable> {
    RATE_TABLES.iter().find(|table| table.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_found_by_id() {
        let table = rate_table("deposits-summary").unwrap();
        assert_eq!(table.kind, StatisticKind::DepositRates);
        let params = table.params(2020, 2024);
        assert_eq!((params.publication_id, params.dataset_id, params.measure_id), (18, 37, 2));
        assert_eq!((params.from_year, params.to_year), (2020, 2024));
        assert!(rate_table("unknown").is_none());
    }

    #[test]
    fn ids_are_unique() {
        for (i, table) in RATE_TABLES.iter().enumerate() {
            assert!(RATE_TABLES[i + 1..].iter().all(|other| other.id != table.id));
        }
    }
}
