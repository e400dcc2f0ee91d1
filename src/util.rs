// Coercion policy and formatting helpers.
//
// Every "dirty cell" rule of the loader lives here so the rest of the code
// can assume clean, typed values and tests can pin both the happy path and
// the fallback path of each rule.
use num_format::{Locale, ToFormattedString};

/// Lower-case and trim a column header.
pub fn normalize_header(h: &str) -> String {
    // Spreadsheet exports sometimes carry a UTF-8 BOM on the first header.
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Parse a locale-formatted monetary value.
///
/// - Trims whitespace; blank cells are `None`.
/// - When a comma is present it is the decimal separator and any `.` are
///   thousands separators: `"1.234,56"` -> `1234.56`, `"10,5"` -> `10.5`.
/// - A `.` after the last comma is an English-format value (`"1,234.56"`)
///   and is rejected rather than misread.
/// - Without a comma the value is parsed as a plain period-decimal number.
/// - Rejects anything alphabetic, negative amounts and non-finite results.
pub fn parse_money(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let cleaned = match s.rfind(',') {
        Some(pos) if s[pos..].contains('.') => return None,
        Some(_) => s.replace('.', "").replace(',', "."),
        None => s.to_string(),
    };
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Money coercion policy: anything that does not parse becomes zero.
pub fn coerce_money(s: &str) -> f64 {
    parse_money(s).unwrap_or(0.0)
}

/// Parse a reference year. Spreadsheet exports often store years as floats
/// (`"2023.0"`), so a finite decimal is accepted and truncated.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let t = f.trunc();
    if t < i32::MIN as f64 || t > i32::MAX as f64 {
        return None;
    }
    Some(t as i32)
}

/// Parse a non-negative head count. Integral floats (`"12.0"`) are accepted.
pub fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if f < 0.0 || f.fract() != 0.0 || f > u64::MAX as f64 {
        return None;
    }
    Some(f as u64)
}

/// Count coercion policy: blank or malformed counts contribute zero.
pub fn coerce_count(s: &str) -> u64 {
    parse_count(s).unwrap_or(0)
}

/// Round half away from zero to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` thousands separators on the integer
    // part, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
