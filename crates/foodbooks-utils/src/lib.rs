//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an integer string with thousands separators
pub fn format_number<T: ToString>(n: T, separator: &str) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

/// Format an amount with fixed decimals and separators, e.g. `-1,250.50`
pub fn format_amount(
    value: Decimal,
    decimal_places: u32,
    thousands_separator: &str,
    decimal_separator: &str,
) -> String {
    let rounded = value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text.clone(), String::new()),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&format_number(int_part, thousands_separator));
    if decimal_places > 0 {
        let mut frac = frac_part;
        while frac.len() < decimal_places as usize {
            frac.push('0');
        }
        out.push_str(decimal_separator);
        out.push_str(&frac);
    }
    out
}

/// Attach a currency symbol before or after a formatted amount
pub fn with_symbol(formatted: &str, symbol: &str, before: bool) -> String {
    if symbol.is_empty() {
        formatted.to_string()
    } else if before {
        format!("{} {}", symbol, formatted)
    } else {
        format!("{} {}", formatted, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0, ","), "0");
        assert_eq!(format_number(999, ","), "999");
        assert_eq!(format_number(1000, ","), "1,000");
        assert_eq!(format_number(-1234567, ","), "-1,234,567");
        assert_eq!(format_number(1234567, " "), "1 234 567");
    }

    #[test]
    fn test_format_amount() {
        let v = Decimal::from_str("1250.5").unwrap();
        assert_eq!(format_amount(v, 2, ",", "."), "1,250.50");

        let v = Decimal::from_str("-0.004").unwrap();
        assert_eq!(format_amount(v, 2, ",", "."), "0.00");

        let v = Decimal::from_str("-98765.125").unwrap();
        assert_eq!(format_amount(v, 2, ".", ","), "-98.765,13");

        let v = Decimal::from_str("7.6").unwrap();
        assert_eq!(format_amount(v, 0, ",", "."), "8");
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(with_symbol("10.00", "Rs.", true), "Rs. 10.00");
        assert_eq!(with_symbol("10.00", "EUR", false), "10.00 EUR");
        assert_eq!(with_symbol("10.00", "", true), "10.00");
    }
}
