use chrono::{DateTime, NaiveDateTime};

/// Whole-peso amount with a currency sign and separators: $120,000
pub fn money(val: f64) -> String {
    let grouped = number(val.abs());
    if val < 0.0 && grouped != "0" {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Whole-unit amount with separators and no currency sign: 25,000
pub fn number(val: f64) -> String {
    let rounded = format!("{:.0}", val.abs());
    let grouped = group_thousands(&rounded);
    if val < 0.0 && grouped != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Two-decimal percentage: 25.00%
pub fn percent(val: f64) -> String {
    format!("{val:.2}%")
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 or naive ISO date-times; anything else
/// is returned unchanged.
pub fn timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}
