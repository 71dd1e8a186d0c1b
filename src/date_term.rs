// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Date Term Resolver
//!
//! Resolves a single range endpoint into a UTC instant.
//!
//! # Forms (first match wins)
//!
//! ```text
//! 2023_10_01                 - ISO date, '_' instead of '-'
//! 2023_10_01T12:30:45Z       - ISO date-time, '_' instead of '-'
//! 1699834414                 - epoch seconds (<= 10 digits)
//! 1699834414000              - epoch milliseconds (> 10 digits)
//! now                        - current time
//! now_add_5d / now_sub_2w    - relative days / weeks
//! ```
//!
//! Hyphenated ISO strings are rejected: `-` separates the two endpoints of a
//! range token. Anything unrecognised, or outside years 0000-9999, resolves
//! to `None`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Source of "now" for relative expressions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

const MAX_EPOCH_SECONDS_DIGITS: usize = 10;

/// Years that render as a plain four-digit ISO year.
const RENDERABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

struct Patterns {
    iso_date: Regex,
    iso_datetime: Regex,
    epoch: Regex,
    relative: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    iso_date: Regex::new(r"^\d{4}_\d{2}_\d{2}$").expect("valid iso date regex"),
    iso_datetime: Regex::new(
        r"^\d{4}_\d{2}_\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("valid iso datetime regex"),
    epoch: Regex::new(r"^-?\d+$").expect("valid epoch regex"),
    relative: Regex::new(r"^now_(add|sub)_(\d+)([dw])$").expect("valid relative regex"),
});

/// Resolve `term` against the wall clock.
pub fn parse_date_term(term: &str) -> Option<DateTime<Utc>> {
    parse_date_term_at(term, &SystemClock)
}

/// Resolve `term`, reading "now" from `clock`. The clock is only consulted
/// for `now`-based forms.
pub fn parse_date_term_at(term: &str, clock: &dyn Clock) -> Option<DateTime<Utc>> {
    if term.is_empty() {
        return None;
    }

    parse_iso(term)
        .or_else(|| parse_epoch(term))
        .or_else(|| parse_relative(term, clock))
        .filter(|date| RENDERABLE_YEARS.contains(&date.year()))
}

/// Render an instant the way the engine expects range bounds:
/// `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_iso(term: &str) -> Option<DateTime<Utc>> {
    let p = &*PATTERNS;
    if p.iso_date.is_match(term) {
        let normalized = term.replace('_', "-");
        let date = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if !p.iso_datetime.is_match(term) {
        return None;
    }

    // Only the date part carries underscores
    let normalized = term.replace('_', "-");
    let (body, offset) = split_offset(&normalized);
    match offset {
        None => NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|dt| dt.and_utc()),
        Some(offset) => {
            let offset = if offset == "Z" || offset.contains(':') {
                offset.to_string()
            } else {
                format!("{}:{}", &offset[..3], &offset[3..])
            };
            DateTime::parse_from_rfc3339(&format!("{body}{offset}"))
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Split a normalized date-time into body and optional `Z` / `±hh[:]mm` suffix.
fn split_offset(datetime: &str) -> (&str, Option<&str>) {
    if let Some(body) = datetime.strip_suffix('Z') {
        return (body, Some("Z"));
    }
    // The time part starts after 'T'; a sign there can only begin an offset.
    let time_start = datetime.find('T').map(|i| i + 1).unwrap_or(datetime.len());
    match datetime[time_start..].find(&['+', '-'][..]) {
        Some(i) => {
            let at = time_start + i;
            (&datetime[..at], Some(&datetime[at..]))
        }
        None => (datetime, None),
    }
}

fn parse_epoch(term: &str) -> Option<DateTime<Utc>> {
    if !PATTERNS.epoch.is_match(term) {
        return None;
    }

    let epoch: i64 = term.parse().ok()?;
    let digits = term.trim_start_matches('-').len();
    if digits <= MAX_EPOCH_SECONDS_DIGITS {
        DateTime::from_timestamp(epoch, 0)
    } else {
        DateTime::from_timestamp_millis(epoch)
    }
}

fn parse_relative(term: &str, clock: &dyn Clock) -> Option<DateTime<Utc>> {
    if term == "now" {
        return Some(clock.now());
    }

    let caps = PATTERNS.relative.captures(term)?;
    let amount: i64 = caps[2].parse().ok()?;
    let delta = match &caps[3] {
        "d" => Duration::try_days(amount)?,
        _ => Duration::try_weeks(amount)?,
    };

    let now = clock.now();
    match &caps[1] {
        "add" => now.checked_add_signed(delta),
        _ => now.checked_sub_signed(delta),
    }
}
