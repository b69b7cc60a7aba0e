//! Month tokens (`YYYY-MM`) to query boundaries.
//!
//! Every function here is total: a malformed or missing token gives `None`,
//! which callers read as "boundary not known yet" rather than as an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use core_types::YearMonth;

/// Both ends of a month, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

fn parse_period(period: Option<&str>) -> Option<YearMonth> {
    period?.parse().ok()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Local midnight on the first day of the month.
pub fn month_range_start(period: Option<&str>) -> Option<NaiveDateTime> {
    parse_period(period).map(|month| month.first_day().and_time(NaiveTime::MIN))
}

/// 23:59:59 on the last calendar day of the month.
pub fn month_range_end(period: Option<&str>) -> Option<NaiveDateTime> {
    parse_period(period).map(|month| month.last_day().and_time(end_of_day()))
}

pub fn month_range(period: Option<&str>) -> MonthRange {
    match parse_period(period) {
        Some(month) => MonthRange {
            from: Some(month.first_day().and_time(NaiveTime::MIN)),
            to: Some(month.last_day().and_time(end_of_day())),
        },
        None => MonthRange { from: None, to: None },
    }
}

/// The month before the one `date` falls in.
pub fn previous_month(date: NaiveDate) -> YearMonth {
    YearMonth::from_date(date).previous()
}

/// Midnight on the first day of the month before the one `date` falls in.
pub fn previous_month_start(date: NaiveDate) -> NaiveDateTime {
    previous_month(date).first_day().and_time(NaiveTime::MIN)
}

/// UTC midnight on the first day of the month; the `dt` of fixed-schema form queries.
///
/// Besides malformed tokens, a zero year is rejected as well.
pub fn month_to_api_date(period: Option<&str>) -> Option<DateTime<Utc>> {
    let month = parse_period(period)?;
    if month.year() == 0 {
        return None;
    }
    Some(month.first_day().and_time(NaiveTime::MIN).and_utc())
}

/// The zone-less form the backend expects for `date_from` / `date_to`.
pub fn format_query_instant(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn end_of_month_for_every_month_of_a_leap_year() {
        let expected = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (index, days) in expected.iter().enumerate() {
            let token = format!("2024-{:02}", index + 1);
            let end = month_range_end(Some(&token)).unwrap();
            assert_eq!(end.day(), *days, "{token}");
            assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        }
    }

    #[test]
    fn february_outside_a_leap_year() {
        assert_eq!(month_range_end(Some("2023-02")).unwrap().day(), 28);
        assert_eq!(month_range_end(Some("2100-02")).unwrap().day(), 28);
        assert_eq!(month_range_end(Some("2000-02")).unwrap().day(), 29);
    }

    #[test]
    fn start_is_midnight_on_the_first() {
        let start = month_range_start(Some("2025-03")).unwrap();
        assert_eq!(format_query_instant(start), "2025-03-01T00:00:00");
        let range = month_range(Some("2025-03"));
        assert_eq!(format_query_instant(range.to.unwrap()), "2025-03-31T23:59:59");
    }

    #[test]
    fn malformed_tokens_give_no_boundary() {
        for token in [None, Some(""), Some("2024"), Some("2024-xx"), Some("yyyy-01"), Some("2024-13")] {
            assert_eq!(month_range_start(token), None);
            assert_eq!(month_range_end(token), None);
            assert_eq!(month_range(token), MonthRange { from: None, to: None });
        }
    }

    #[test]
    fn previous_month_of_january_is_last_december() {
        for day in [1, 15, 31] {
            let date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
            assert_eq!(previous_month(date).to_string(), "2024-12");
        }
        let start = previous_month_start(NaiveDate::from_ymd_opt(2025, 4, 15).unwrap());
        assert_eq!(format_query_instant(start), "2025-03-01T00:00:00");
    }

    #[test]
    fn api_date_is_utc_midnight() {
        let dt = month_to_api_date(Some("2024-06")).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(dt.month(), 6);
        assert_eq!(month_to_api_date(Some("0000-06")), None);
        assert_eq!(month_to_api_date(None), None);
    }
}
