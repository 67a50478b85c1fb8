//! Lenient amount parsing and the serde adapter records use for money fields

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

const CURRENCY_MARKERS: [&str; 4] = ["Rs.", "Rs", "₹", "$"];

/// Parse a money or quantity string such as `"1,250.50"`, `"Rs. 300"` or `"-12"`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim();

    let negative = s.starts_with('-');
    if negative {
        s = s[1..].trim_start();
    }

    for marker in CURRENCY_MARKERS {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest.trim_start();
            break;
        }
    }

    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -value } else { value })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

/// `deserialize_with` adapter: numbers, numeric strings or null.
/// Malformed values become `None` instead of failing the record.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer).unwrap_or(None);
    Ok(raw.and_then(|value| match value {
        RawAmount::Int(i) => Some(Decimal::from(i)),
        RawAmount::Float(f) => parse_amount(&f.to_string()),
        RawAmount::Text(s) => parse_amount(&s),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_amount("1250.50"), Some(dec("1250.50")));
        assert_eq!(parse_amount(" 42 "), Some(dec("42")));
        assert_eq!(parse_amount("-12.5"), Some(dec("-12.5")));
    }

    #[test]
    fn test_separators_and_markers() {
        assert_eq!(parse_amount("1,250.50"), Some(dec("1250.50")));
        assert_eq!(parse_amount("Rs. 300"), Some(dec("300")));
        assert_eq!(parse_amount("₹1,00,000"), Some(dec("100000")));
        assert_eq!(parse_amount("- Rs.5"), Some(dec("-5")));
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("Rs."), None);
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Option<Decimal>,
    }

    #[test]
    fn test_lenient_amount_shapes() {
        let row: Row = serde_json::from_str(r#"{"amount": 12}"#).unwrap();
        assert_eq!(row.amount, Some(dec("12")));

        let row: Row = serde_json::from_str(r#"{"amount": 12.75}"#).unwrap();
        assert_eq!(row.amount, Some(dec("12.75")));

        let row: Row = serde_json::from_str(r#"{"amount": "1,000.00"}"#).unwrap();
        assert_eq!(row.amount, Some(dec("1000.00")));

        let row: Row = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(row.amount, None);

        let row: Row = serde_json::from_str(r#"{"amount": "n/a"}"#).unwrap();
        assert_eq!(row.amount, None);

        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(row.amount, None);
    }
}
