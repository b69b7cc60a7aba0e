use crate::error::YearRangeError;
use api_client::responses::StatisticDataRange;

/// A validated, inclusive range of years for statistic queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

fn parse_year(input: &str) -> Result<i32, YearRangeError> {
    input.trim().parse().map_err(|_| YearRangeError::NotANumber)
}

impl YearRange {
    /// Checks user input against `[min_year, max_year]`.
    ///
    /// Checks run in order and the first failure is reported: both present,
    /// both numeric, `from` not below the minimum, `to` not above the maximum,
    /// `from` not after `to`.
    pub fn validate(
        from: Option<&str>,
        to: Option<&str>,
        min_year: i32,
        max_year: i32,
    ) -> Result<Self, YearRangeError> {
        let (Some(from), Some(to)) = (
            from.filter(|s| !s.trim().is_empty()),
            to.filter(|s| !s.trim().is_empty()),
        ) else {
            return Err(YearRangeError::Missing);
        };
        let (from, to) = (parse_year(from)?, parse_year(to)?);

        if from < min_year {
            return Err(YearRangeError::BelowMinimum { min: min_year });
        }
        if to > max_year {
            return Err(YearRangeError::AboveMaximum { max: max_year });
        }
        if from > to {
            return Err(YearRangeError::Inverted);
        }
        Ok(Self { from, to })
    }

    /// The widest span covered by the backend's reported ranges.
    pub fn bounds_of(ranges: &[StatisticDataRange]) -> Option<Self> {
        let from = ranges.iter().map(|range| range.from_year).min()?;
        let to = ranges.iter().map(|range| range.to_year).max()?;
        Some(Self { from, to })
    }
}

/// Every year from `min_year` to `max_year` inclusive.
pub fn available_years(min_year: i32, max_year: i32) -> Vec<i32> {
    (min_year..=max_year).collect()
}

/// Years selectable as the start: not after the chosen end, if there is one.
pub fn available_from_years(min_year: i32, max_year: i32, to: Option<&str>) -> Vec<i32> {
    let to = to.and_then(|to| parse_year(to).ok());
    available_years(min_year, max_year)
        .into_iter()
        .filter(|year| to.is_none_or(|to| *year <= to))
        .collect()
}

/// Years selectable as the end: not before the chosen start, if there is one.
pub fn available_to_years(min_year: i32, max_year: i32, from: Option<&str>) -> Vec<i32> {
    let from = from.and_then(|from| parse_year(from).ok());
    available_years(min_year, max_year)
        .into_iter()
        .filter(|year| from.is_none_or(|from| *year >= from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_range_inside_the_bounds() {
        assert_eq!(
            YearRange::validate(Some("2015"), Some(" 2024 "), 2010, 2025),
            Ok(YearRange { from: 2015, to: 2024 })
        );
        assert!(YearRange::validate(Some("2024"), Some("2024"), 2010, 2025).is_ok());
    }

    #[test]
    fn rejections_follow_the_check_order() {
        let check = |from, to| YearRange::validate(from, to, 2010, 2025);
        assert_eq!(check(None, Some("2020")), Err(YearRangeError::Missing));
        assert_eq!(check(Some(""), Some("2020")), Err(YearRangeError::Missing));
        assert_eq!(check(Some("20x0"), Some("2020")), Err(YearRangeError::NotANumber));
        assert_eq!(check(Some("2001"), Some("2030")), Err(YearRangeError::BelowMinimum { min: 2010 }));
        assert_eq!(check(Some("2015"), Some("2030")), Err(YearRangeError::AboveMaximum { max: 2025 }));
        assert_eq!(check(Some("2021"), Some("2020")), Err(YearRangeError::Inverted));
    }

    #[test]
    fn year_options_respect_the_other_end() {
        assert_eq!(available_years(2020, 2023), vec![2020, 2021, 2022, 2023]);
        assert_eq!(available_from_years(2020, 2023, Some("2021")), vec![2020, 2021]);
        assert_eq!(available_to_years(2020, 2023, Some("2022")), vec![2022, 2023]);
        assert_eq!(available_to_years(2020, 2023, Some("abc")).len(), 4);
        assert_eq!(available_from_years(2020, 2023, None).len(), 4);
    }

    #[test]
    fn bounds_span_all_reported_ranges() {
        let ranges = [
            StatisticDataRange { from_year: 2014, to_year: 2020 },
            StatisticDataRange { from_year: 2012, to_year: 2019 },
        ];
        assert_eq!(YearRange::bounds_of(&ranges), Some(YearRange { from: 2012, to: 2020 }));
        assert_eq!(YearRange::bounds_of(&[]), None);
    }
}
