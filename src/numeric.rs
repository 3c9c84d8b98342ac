//! Numeric parsing and display helpers.
//!
//! Parsing never fails: anything that does not yield a finite number
//! comes back as 0, which callers treat as "unknown".

use regex::Regex;
use std::sync::OnceLock;

fn odds_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)1\s*in\s*([0-9.,]+)").expect("odds pattern compiles"))
}

/// Parse the leading decimal number of a string made of digits and dots.
/// `"12.5.3"` reads as 12.5; no digits reads as 0.
fn parse_leading_decimal(s: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }

    if !seen_digit {
        return 0.0;
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn digits_and_dots(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Extract N from "1 in N" (case-insensitive, thousands separators allowed).
/// Falls back to every digit and dot in the text; 0 when nothing parses.
pub fn parse_odds_value(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    if let Some(caps) = odds_pattern().captures(text) {
        let n = caps[1].replace(',', "");
        return parse_leading_decimal(&n);
    }
    parse_leading_decimal(&digits_and_dots(text))
}

/// Parse a currency amount or a count by dropping everything except
/// digits and dots. `"$10,000"` → 10000, `"n/a"` → 0.
pub fn parse_currency_or_count(text: &str) -> f64 {
    parse_leading_decimal(&digits_and_dots(text))
}

/// Median of the finite values; 0 for an empty input.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Whether a prize label denotes a free replacement ticket.
pub fn is_ticket_label(label: &str) -> bool {
    label.to_lowercase().contains("ticket")
}

/// Clamp negative and non-finite quantities to 0.
pub fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn split_fixed(fixed: &str) -> (&str, Option<&str>) {
    match fixed.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (fixed, None),
    }
}

/// US-dollar display with two decimals: `-1234.5` → `"-$1,234.50"`.
/// Non-finite values render as `"n/a"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = split_fixed(&fixed);
    let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    format!(
        "{}${}.{}",
        if negative { "-" } else { "" },
        group_thousands(int),
        frac.unwrap_or("00")
    )
}

/// Grouped number with at most six fractional digits, trailing zeros
/// dropped: `7200.0` → `"7,200"`, `0.1666666666` → `"0.166667"`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.6}", value.abs());
    let (int, frac) = split_fixed(&fixed);
    let frac = frac.map(|f| f.trim_end_matches('0')).unwrap_or("");
    let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
