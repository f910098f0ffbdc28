// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Conversions between the backend's spreadsheet-style date serials, form
//! input strings, and display text.
//!
//! A serial counts days from 1900-01-01 (serial 1). Fractional parts carry a
//! time of day and are truncated. The spreadsheet leap-year quirk is inherited
//! as-is, so serials map one day later than a spreadsheet would show for dates
//! after February 1900; stored data depends on this mapping.

use time::macros::{date, format_description};
use time::{Date, Duration};

use crate::error::ValidationError;
use crate::model::Numeric;

const SERIAL_EPOCH: Date = date!(1900 - 01 - 01);
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

/// Parse `12,5`, `12.5` or ` 12 ` into a finite float.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replacen(',', ".", 1);
    if normalized.is_empty() {
        return None;
    }
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn parse_serial(value: &Numeric) -> Option<f64> {
    value.value()
}

pub fn serial_to_date(serial: f64) -> Option<Date> {
    let days = (serial - 1.0).floor();
    if !days.is_finite() || days.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    SERIAL_EPOCH.checked_add(Duration::days(days as i64))
}

pub fn date_to_serial(date: Date) -> i64 {
    (date - SERIAL_EPOCH).whole_days() + 1
}

/// Resolve a backend date value. ISO `yyyy-mm-dd` text is taken as a calendar
/// date; anything else is read as a serial.
pub fn resolve_date(value: &Numeric) -> Option<Date> {
    if let Numeric::Text(text) = value
        && let Ok(date) = parse_iso_date(text.trim())
    {
        return Some(date);
    }
    parse_serial(value).and_then(serial_to_date)
}

/// `dd/mm/yyyy`; unparseable values are shown verbatim.
pub fn format_display_date(value: &Numeric) -> String {
    match resolve_date(value) {
        Some(date) => date
            .format(format_description!("[day]/[month]/[year]"))
            .unwrap_or_default(),
        None => value.to_string(),
    }
}

/// `yyyy-mm-dd` for a date input; empty when the value is unparseable.
pub fn format_input_date(value: &Numeric) -> String {
    resolve_date(value).map(format_iso_date).unwrap_or_default()
}

pub fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

pub fn format_compact_date(date: Date) -> String {
    date.format(format_description!("[year][month][day]"))
        .unwrap_or_default()
}

pub fn parse_input_date(field: &'static str, raw: &str) -> Result<Date, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    parse_iso_date(trimmed).map_err(|_| ValidationError::Unparseable {
        field,
        value: trimmed.to_owned(),
    })
}

fn parse_iso_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

/// Never returns `-0.0`.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// `10,00` (two decimals, comma separator).
pub fn format_price(value: f64) -> String {
    format!("{:.2}", round_cents(value)).replace('.', ",")
}

/// `25,00 €`
pub fn format_euros(value: f64) -> String {
    format!("{} €", format_price(value))
}
