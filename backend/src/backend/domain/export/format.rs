//! Brazilian Portuguese number and date formatting for printed documents.

use chrono::{NaiveDate, NaiveDateTime};

/// Inserts `.` every three digits from the right
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// `value` with `,` decimals and `.` grouping, rounded to `max_fraction`
/// digits and keeping at least `min_fraction` of them.
fn format_decimal(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    let rendered = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let is_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}{}", group_thousands(integer))
    } else {
        format!("{sign}{},{}", group_thousands(integer), fraction)
    }
}

/// `1234.5` → `"R$ 1.234,50"`
pub fn format_currency(value: f64) -> String {
    let amount = format_decimal(value, 2, 2);
    match amount.strip_prefix('-') {
        Some(positive) => format!("-R$ {positive}"),
        None => format!("R$ {amount}"),
    }
}

/// Quantities print with up to three decimals and no trailing zeros
pub fn format_quantity(value: f64) -> String {
    format_decimal(value, 0, 3)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%d/%m/%Y %H:%M:%S").to_string()
}
