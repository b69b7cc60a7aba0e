use rust_decimal::{Decimal, RoundingStrategy};

/// Shown in place of a missing value.
pub const PLACEHOLDER: &str = "—";

const GROUP_SEPARATOR: char = '\u{a0}';
const DECIMAL_SEPARATOR: char = ',';
const MAX_FRACTION_DIGITS: u32 = 3;

/// Formats a value the Russian way: `1 234 567,891`.
///
/// Thousands are grouped with a no-break space, the fraction is rounded
/// half away from zero to at most three digits and trailing zeros dropped.
/// `None` becomes the placeholder dash.
pub fn format_number(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    let rounded = value
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands_with_no_break_spaces() {
        assert_eq!(format_number(Some(dec!(1234567))), "1\u{a0}234\u{a0}567");
        assert_eq!(format_number(Some(dec!(123))), "123");
        assert_eq!(format_number(Some(dec!(1000))), "1\u{a0}000");
    }

    #[test]
    fn uses_a_decimal_comma_and_three_digits_at_most() {
        assert_eq!(format_number(Some(dec!(1234.5))), "1\u{a0}234,5");
        assert_eq!(format_number(Some(dec!(0.12345))), "0,123");
        assert_eq!(format_number(Some(dec!(2.0005))), "2,001");
        assert_eq!(format_number(Some(dec!(7.100))), "7,1");
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(format_number(Some(dec!(-98765.4))), "-98\u{a0}765,4");
        assert_eq!(format_number(Some(dec!(-0.0001))), "0");
    }

    #[test]
    fn missing_value_is_a_dash() {
        assert_eq!(format_number(None), "—");
    }
}
