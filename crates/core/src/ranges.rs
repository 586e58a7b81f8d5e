//! Best-effort numeric extraction from formatted range strings
//!
//! Revenue, profit and ROI arrive from the model as formatted text like
//! "₹45,000 - ₹60,000" because the schema deliberately keeps those fields
//! human-authored. This helper recovers a `{low, high}` pair for charting.
//! It is a display convenience only and is not part of the validated
//! advisory contract; callers must tolerate `None`.

use once_cell::sync::Lazy;
use regex::Regex;

/// A numeric interval recovered from display text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub low: f64,
    pub high: f64,
}

// Hyphen is the usual range separator in model output, so a leading minus
// is never treated as a sign; negative profit text degrades to magnitudes.
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("static pattern"));

/// Extract up to two numbers from a formatted range string.
///
/// One number yields a degenerate range (`low == high`); none yields `None`.
/// Grouping commas are stripped before parsing.
pub fn parse_money_range(text: &str) -> Option<NumericRange> {
    let mut numbers = NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok());

    let first = numbers.next()?;
    let second = numbers.next().unwrap_or(first);
    let (low, high) = if first <= second { (first, second) } else { (second, first) };
    Some(NumericRange { low, high })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rupee_range() {
        let range = parse_money_range("₹10,000 - ₹15,000").unwrap();
        assert_eq!(range.low, 10_000.0);
        assert_eq!(range.high, 15_000.0);
    }

    #[test]
    fn parses_single_value() {
        let range = parse_money_range("about ₹42,500").unwrap();
        assert_eq!(range.low, 42_500.0);
        assert_eq!(range.high, 42_500.0);
    }

    #[test]
    fn parses_percentage_range() {
        let range = parse_money_range("18% - 25%").unwrap();
        assert_eq!(range.low, 18.0);
        assert_eq!(range.high, 25.0);
    }

    #[test]
    fn orders_reversed_bounds() {
        let range = parse_money_range("15,000 to 10,000").unwrap();
        assert_eq!(range.low, 10_000.0);
        assert_eq!(range.high, 15_000.0);
    }

    #[test]
    fn no_numbers_yields_none() {
        assert!(parse_money_range("depends on the season").is_none());
    }

    #[test]
    fn decimal_values() {
        let range = parse_money_range("12.5 - 17.25 quintals").unwrap();
        assert_eq!(range.low, 12.5);
        assert_eq!(range.high, 17.25);
    }
}
