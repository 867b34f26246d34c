// Utility helpers for parsing and basic statistics.
//
// All "dirty" CSV handling (numbers with separators, several timestamp
// layouts, blank cells) lives here so the engine modules work on typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

use crate::types::FundedTime;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts scientific notation (`1e3`).
/// - Rejects `NaN` and infinities, which must never enter a ratio.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an identifier. Integral floats such as `653051.0` are accepted since
/// exports write ids that way once the column went through a float type.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
        Some(v as u64)
    } else {
        None
    }
}

/// Trimmed text, empty string for a missing cell.
pub fn clean_text(s: Option<String>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Normalise a `funded_time` cell.
///
/// Offsets are converted to UTC and dropped; bare dates become midnight.
pub fn parse_funded_time(s: Option<&str>) -> FundedTime {
    let Some(raw) = s.map(str::trim).filter(|v| !v.is_empty()) else {
        return FundedTime::NotFunded;
    };
    match parse_timestamp(raw) {
        Some(ts) => FundedTime::Funded(ts),
        None => FundedTime::Unparsable(raw.to_string()),
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Arithmetic mean, `None` for an empty input.
///
/// Values are summed in ascending order so the result does not depend on the
/// order the caller collected them in.
pub fn mean(mut v: Vec<f64>) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64)
}

pub fn median(mut v: Vec<f64>) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
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

/// Render a ratio as a percentage, or the `n/a` placeholder when undefined.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{}%", format_number(r * 100.0, 2)),
        _ => "n/a".to_string(),
    }
}
