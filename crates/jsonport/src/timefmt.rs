// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical ISO-8601 text forms for date and time values.
//!
//! Seconds precision is the baseline; microseconds are appended only when
//! nonzero, and a UTC offset only when the value carries one.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::value::DateTimeValue;

pub(crate) fn format_datetime(value: &DateTimeValue) -> String {
    match value {
        DateTimeValue::Naive(dt) => format_naive(dt),
        DateTimeValue::Zoned(dt) => {
            format!("{}{}", format_naive(&dt.naive_local()), dt.format("%:z"))
        }
    }
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: &NaiveTime) -> String {
    let base = time.format("%H:%M:%S").to_string();
    match micros_suffix(time.nanosecond()) {
        Some(frac) => format!("{base}{frac}"),
        None => base,
    }
}

pub(crate) fn parse_datetime(text: &str) -> Option<DateTimeValue> {
    // Offset-carrying form first (RFC 3339 covers `Z` and `+HH:MM`), then
    // the naive form with an optional fractional part.
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(text) {
        return Some(DateTimeValue::Zoned(dt));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(DateTimeValue::Naive)
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

pub(crate) fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()
}

fn format_naive(dt: &NaiveDateTime) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    match micros_suffix(dt.nanosecond()) {
        Some(frac) => format!("{base}{frac}"),
        None => base,
    }
}

fn micros_suffix(nanos: u32) -> Option<String> {
    let micros = nanos / 1_000;
    (micros != 0).then(|| format!(".{micros:06}"))
}
