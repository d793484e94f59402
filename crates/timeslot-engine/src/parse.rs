//! Literal parsing for partial date-times and durations.
//!
//! Hosts usually build [`PartialDateTime`] values from their own parse
//! trees, but literals are convenient in configuration, logs and tests.
//! Parsing is deterministic: a token that cannot be read, or two tokens
//! that set the same field to different values, is an error rather than a
//! guess.
//!
//! # Partial date-time grammar
//!
//! Whitespace-separated tokens, in any order:
//!
//! - ISO dates: `2020-12-05`, `2020-12`
//! - years: `2020`
//! - month names: `december`, `dec`
//! - weekday names: `monday`, `mon`
//! - days of month: `5th`, `22nd`, or a bare `1`..`31`
//! - clock times: `9am`, `2:30pm`, `14:00`
//! - named times: `morning`, `noon`, `afternoon`, `evening`, `night`, `midnight`
//!
//! Filler words (`the`, `on`, `at`, `of`) and commas are ignored.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};

use crate::datetime::PartialDateTime;
use crate::error::{Result, TemporalError};

/// Parse a partial date-time literal.
///
/// # Errors
///
/// Returns [`TemporalError::InvalidExpression`] for unreadable or
/// conflicting tokens, and [`TemporalError::InvalidTemporalValue`] if the
/// assembled value fails range validation.
///
/// # Examples
///
/// ```
/// use timeslot_engine::parse::parse_partial;
///
/// let v = parse_partial("Monday 9am").unwrap();
/// assert_eq!(v.day_of_week, Some(1));
/// assert_eq!(v.hour, Some(9));
/// ```
pub fn parse_partial(s: &str) -> Result<PartialDateTime> {
    let normalized = normalize_expression(s);
    if normalized.is_empty() {
        return Err(TemporalError::InvalidExpression("empty expression".to_string()));
    }

    let mut builder = FieldBuilder::new(s);
    for token in normalized.split(' ') {
        apply_token(&mut builder, token)?;
    }
    builder.value.validated()
}

impl FromStr for PartialDateTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self> {
        parse_partial(s)
    }
}

/// Accumulates fields, rejecting a second, different value for a field.
struct FieldBuilder<'a> {
    source: &'a str,
    value: PartialDateTime,
}

impl<'a> FieldBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            value: PartialDateTime::new(),
        }
    }

    fn set<T: PartialEq + Copy + std::fmt::Display>(
        slot: &mut Option<T>,
        v: T,
        name: &str,
        source: &str,
    ) -> Result<()> {
        match *slot {
            Some(existing) if existing != v => Err(TemporalError::InvalidExpression(format!(
                "conflicting {name} ({existing} and {v}) in '{source}'"
            ))),
            _ => {
                *slot = Some(v);
                Ok(())
            }
        }
    }

    fn year(&mut self, v: i32) -> Result<()> {
        Self::set(&mut self.value.year, v, "year", self.source)
    }

    fn month(&mut self, v: u32) -> Result<()> {
        Self::set(&mut self.value.month, v, "month", self.source)
    }

    fn day(&mut self, v: u32) -> Result<()> {
        Self::set(&mut self.value.day, v, "day", self.source)
    }

    fn day_of_week(&mut self, v: u32) -> Result<()> {
        Self::set(&mut self.value.day_of_week, v, "day of week", self.source)
    }

    fn time(&mut self, t: NaiveTime) -> Result<()> {
        Self::set(&mut self.value.hour, t.hour(), "hour", self.source)?;
        Self::set(&mut self.value.minute, t.minute(), "minute", self.source)
    }
}

fn apply_token(b: &mut FieldBuilder<'_>, token: &str) -> Result<()> {
    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        b.year(date.year())?;
        b.month(date.month())?;
        return b.day(date.day());
    }
    if let Some((year, month)) = parse_year_month(token) {
        b.year(year)?;
        return b.month(month);
    }
    if token.len() == 4 {
        if let Ok(year) = token.parse::<i32>() {
            return b.year(year);
        }
    }
    if let Some(month) = parse_month(token) {
        return b.month(month);
    }
    if let Some(dow) = parse_weekday(token) {
        return b.day_of_week(dow);
    }
    if let Some(day) = parse_day_of_month(token) {
        return b.day(day);
    }
    if let Some(t) = named_time(token).or_else(|| parse_time_string(token)) {
        return b.time(t);
    }
    Err(TemporalError::InvalidExpression(format!(
        "cannot parse '{token}' in '{}'",
        b.source
    )))
}

/// Trim, lowercase, drop filler words, and glue a trailing am/pm onto its
/// number.
fn normalize_expression(s: &str) -> String {
    let s = s.trim().to_lowercase().replace(',', " ");
    let tokens: Vec<&str> = s
        .split_whitespace()
        .filter(|t| !matches!(*t, "the" | "on" | "at" | "of"))
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if matches!(token, "am" | "pm") {
            if let Some(prev) = out.last_mut() {
                prev.push_str(token);
                continue;
            }
        }
        out.push(token.to_string());
    }
    out.join(" ")
}

fn parse_year_month(s: &str) -> Option<(i32, u32)> {
    let (y, m) = s.split_once('-')?;
    if y.len() != 4 || m.is_empty() || m.len() > 2 {
        return None;
    }
    Some((y.parse().ok()?, m.parse().ok()?))
}

/// Weekday name to 1 (Monday) .. 7 (Sunday).
fn parse_weekday(s: &str) -> Option<u32> {
    match s {
        "monday" | "mon" => Some(1),
        "tuesday" | "tue" | "tues" => Some(2),
        "wednesday" | "wed" => Some(3),
        "thursday" | "thu" | "thurs" => Some(4),
        "friday" | "fri" => Some(5),
        "saturday" | "sat" => Some(6),
        "sunday" | "sun" => Some(7),
        _ => None,
    }
}

/// Month name to number (1-12).
fn parse_month(s: &str) -> Option<u32> {
    match s {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// "5th", "1st", "22nd", or a bare number in 1..=31.
fn parse_day_of_month(s: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn named_time(s: &str) -> Option<NaiveTime> {
    match s {
        "morning" | "sob" => NaiveTime::from_hms_opt(9, 0, 0),
        "noon" | "lunch" => NaiveTime::from_hms_opt(12, 0, 0),
        "afternoon" => NaiveTime::from_hms_opt(13, 0, 0),
        "eob" => NaiveTime::from_hms_opt(17, 0, 0),
        "evening" => NaiveTime::from_hms_opt(18, 0, 0),
        "night" => NaiveTime::from_hms_opt(21, 0, 0),
        "midnight" => NaiveTime::from_hms_opt(0, 0, 0),
        _ => None,
    }
}

/// "2pm", "2:30pm", "14:00".
fn parse_time_string(s: &str) -> Option<NaiveTime> {
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        return Some(t);
    }

    let (time_part, is_pm) = if let Some(t) = s.strip_suffix("pm") {
        (t, true)
    } else if let Some(t) = s.strip_suffix("am") {
        (t, false)
    } else {
        return None;
    };

    let (hour, minute) = match time_part.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (time_part.parse::<u32>().ok()?, 0),
    };
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour24 = match (hour, is_pm) {
        (12, true) => 12,
        (12, false) => 0,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

// ── Durations ───────────────────────────────────────────────────────────────

/// Parse a compact duration such as `30m`, `1h30m`, `+2d`, `-1w`.
///
/// Units: `w` weeks, `d` days, `h` hours, `m` minutes. A leading sign is
/// optional. Seconds are not accepted; the engine works at minute
/// resolution.
///
/// # Errors
///
/// Returns [`TemporalError::InvalidDuration`] if the string cannot be parsed.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TemporalError::InvalidDuration("empty duration".to_string()));
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i64, &s[1..]),
        Some(b'-') => (-1i64, &s[1..]),
        _ => (1i64, s),
    };
    if rest.is_empty() {
        return Err(TemporalError::InvalidDuration(format!(
            "duration has no components: '{s}'"
        )));
    }

    let mut minutes = 0i64;
    let mut num_buf = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return Err(TemporalError::InvalidDuration(format!(
                "expected number before '{ch}' in '{s}'"
            )));
        }
        let n: i64 = num_buf
            .parse()
            .map_err(|_| TemporalError::InvalidDuration(format!("invalid number in '{s}'")))?;
        num_buf.clear();

        let unit = match ch.to_ascii_lowercase() {
            'w' => 7 * 24 * 60,
            'd' => 24 * 60,
            'h' => 60,
            'm' => 1,
            _ => {
                return Err(TemporalError::InvalidDuration(format!(
                    "unknown unit '{ch}' in '{s}'"
                )));
            }
        };
        minutes = n
            .checked_mul(unit)
            .and_then(|v| minutes.checked_add(v))
            .ok_or_else(|| TemporalError::InvalidDuration(format!("duration too large: '{s}'")))?;
    }

    if !num_buf.is_empty() {
        return Err(TemporalError::InvalidDuration(format!(
            "number without unit at end of '{s}'"
        )));
    }

    Ok(Duration::minutes(sign * minutes))
}

/// Human-readable duration, e.g. "1 day, 2 hours, 30 minutes".
pub fn format_duration(d: Duration) -> String {
    let total = d.num_minutes();
    let abs = total.unsigned_abs();
    let days = abs / (24 * 60);
    let hours = (abs % (24 * 60)) / 60;
    let minutes = abs % 60;

    let plural = |n: u64, unit: &str| format!("{n} {unit}{}", if n == 1 { "" } else { "s" });
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(plural(minutes, "minute"));
    }

    let joined = parts.join(", ");
    if total < 0 {
        format!("minus {joined}")
    } else {
        joined
    }
}
