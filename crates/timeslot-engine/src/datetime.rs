//! Partially specified points in time.
//!
//! A [`PartialDateTime`] holds up to six calendar fields, each of which may
//! be unset. An unset field means "any value", so two partial values are
//! not always orderable: "9AM" and "Wednesday" share no field at all, and
//! "the 5th" versus "the 6th" cannot be ordered until the month is known.
//!
//! # Comparison model
//!
//! Ordering walks the fields from most to least significant
//! (year → month → day → hour → minute) and stops at the first difference.
//! How absent fields are treated is controlled by a [`Strictness`] level.
//! The result of an ordering query is a [`Fuzzy`] truth value; the boolean
//! helpers ([`PartialDateTime::is_before`] and friends) collapse
//! [`Fuzzy::Maybe`] to `false`.
//!
//! # Day of week
//!
//! `day_of_week` takes the place of `day` in the ordered walk when neither
//! side has a day of month, so "Monday" sorts before "Thursday".

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::{MAX_VALID_YEAR, MIN_VALID_YEAR};
use crate::error::{Result, TemporalError};

// ── Fields ──────────────────────────────────────────────────────────────────

/// One of the six fields of a [`PartialDateTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalField {
    Year,
    Month,
    Day,
    DayOfWeek,
    Hour,
    Minute,
}

impl TemporalField {
    /// Fields that take part in chronological ordering, most significant first.
    pub const ORDERED: [TemporalField; 5] = [
        TemporalField::Year,
        TemporalField::Month,
        TemporalField::Day,
        TemporalField::Hour,
        TemporalField::Minute,
    ];

    pub const ALL: [TemporalField; 6] = [
        TemporalField::Year,
        TemporalField::Month,
        TemporalField::Day,
        TemporalField::DayOfWeek,
        TemporalField::Hour,
        TemporalField::Minute,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemporalField::Year => "year",
            TemporalField::Month => "month",
            TemporalField::Day => "day",
            TemporalField::DayOfWeek => "day_of_week",
            TemporalField::Hour => "hour",
            TemporalField::Minute => "minute",
        }
    }

    /// Inclusive valid range for the field.
    pub fn valid_range(self) -> (i64, i64) {
        match self {
            TemporalField::Year => (MIN_VALID_YEAR as i64, MAX_VALID_YEAR as i64),
            TemporalField::Month => (1, 12),
            TemporalField::Day => (1, 31),
            TemporalField::DayOfWeek => (1, 7),
            TemporalField::Hour => (0, 24),
            TemporalField::Minute => (0, 60),
        }
    }

    /// Approximate span of one unit in minutes. Months are 30 days and years
    /// 365 days; this is not calendar-exact.
    pub(crate) fn approx_minutes(self) -> i64 {
        match self {
            TemporalField::Year => 365 * MINUTES_PER_DAY,
            TemporalField::Month => 30 * MINUTES_PER_DAY,
            TemporalField::Day | TemporalField::DayOfWeek => MINUTES_PER_DAY,
            TemporalField::Hour => 60,
            TemporalField::Minute => 1,
        }
    }
}

pub(crate) const MINUTES_PER_DAY: i64 = 24 * 60;

// ── Strictness and three-valued results ─────────────────────────────────────

/// How much field absence two values may tolerate before they are declared
/// incomparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strictness {
    /// Every field down to the first difference must be set on both sides.
    NoMissing,
    /// A field may be unset only when it is unset on both sides.
    SymmetricMissing,
    /// Unset fields on either side are skipped. Meant for comparing a
    /// complete value against a constraint.
    Lax,
    /// Comparable iff the two values share at least one populated field.
    #[default]
    SharedField,
    /// Like [`Strictness::SymmetricMissing`] but tolerates an asymmetric
    /// minute, and inspects every field. Guards [`PartialDateTime::delta_to`].
    SymmetricIgnoringMinute,
}

/// Three-valued truth for comparisons over partial values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fuzzy {
    True,
    False,
    /// Not decidable from the fields present.
    Maybe,
}

impl Fuzzy {
    pub fn is_true(self) -> bool {
        self == Fuzzy::True
    }

    pub fn is_false(self) -> bool {
        self == Fuzzy::False
    }

    pub fn is_maybe(self) -> bool {
        self == Fuzzy::Maybe
    }
}

impl From<bool> for Fuzzy {
    fn from(b: bool) -> Self {
        if b {
            Fuzzy::True
        } else {
            Fuzzy::False
        }
    }
}

// ── PartialDateTime ─────────────────────────────────────────────────────────

/// A point in time with any subset of its fields specified.
///
/// `day_of_week` runs from 1 (Monday) to 7 (Sunday). Hour 24 and minute 60
/// are accepted and roll over into the next unit when converted to a
/// concrete point in time.
///
/// # Examples
///
/// ```
/// use timeslot_engine::{Fuzzy, PartialDateTime, Strictness};
///
/// let june = PartialDateTime::new().with_month(6);
/// let july = PartialDateTime::new().with_month(7);
/// assert_eq!(
///     june.fuzzy_less_than(&july, Some(Strictness::SymmetricMissing)),
///     Fuzzy::True
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PartialDateTime {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub day_of_week: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
}

impl PartialDateTime {
    /// An empty value with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_day_of_week(mut self, day_of_week: u32) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    /// Run the explicit validity check, returning the value on success.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::InvalidTemporalValue`] if any populated field
    /// lies outside its range.
    pub fn validated(self) -> Result<Self> {
        self.is_valid()?;
        Ok(self)
    }

    /// A complete value for a concrete point in time. Seconds are dropped.
    pub fn from_point_in_time(dt: NaiveDateTime) -> Self {
        Self {
            year: Some(dt.year()),
            month: Some(dt.month()),
            day: Some(dt.day()),
            day_of_week: None,
            hour: Some(dt.hour()),
            minute: Some(dt.minute()),
        }
    }

    /// A date-only value.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new()
            .with_year(date.year())
            .with_month(date.month())
            .with_day(date.day())
    }

    /// A time-only value.
    pub fn from_time(hour: u32, minute: u32) -> Self {
        Self::new().with_hour(hour).with_minute(minute)
    }

    /// Combine two values; fields set on `self` win over `source`.
    pub fn merge(&self, source: &PartialDateTime) -> PartialDateTime {
        PartialDateTime {
            year: self.year.or(source.year),
            month: self.month.or(source.month),
            day: self.day.or(source.day),
            day_of_week: self.day_of_week.or(source.day_of_week),
            hour: self.hour.or(source.hour),
            minute: self.minute.or(source.minute),
        }
    }

    /// Fill unset fields from `defaults`, in place.
    pub fn fill_missing(&mut self, defaults: &PartialDateTime) {
        *self = self.merge(defaults);
    }

    /// The raw value of a field, widened for arithmetic.
    pub fn get(&self, field: TemporalField) -> Option<i64> {
        match field {
            TemporalField::Year => self.year.map(i64::from),
            TemporalField::Month => self.month.map(i64::from),
            TemporalField::Day => self.day.map(i64::from),
            TemporalField::DayOfWeek => self.day_of_week.map(i64::from),
            TemporalField::Hour => self.hour.map(i64::from),
            TemporalField::Minute => self.minute.map(i64::from),
        }
    }

    // ── Shape queries ───────────────────────────────────────────────────

    /// Check every populated field against its valid range.
    pub fn is_valid(&self) -> Result<()> {
        for field in TemporalField::ALL {
            if let Some(v) = self.get(field) {
                let (lo, hi) = field.valid_range();
                if v < lo || v > hi {
                    return Err(TemporalError::InvalidTemporalValue(format!(
                        "{} {v} outside {lo}..={hi}",
                        field.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Year, month, day, hour and minute are all set.
    pub fn is_complete(&self) -> bool {
        self.year.is_some()
            && self.month.is_some()
            && self.day.is_some()
            && self.hour.is_some()
            && self.minute.is_some()
    }

    pub fn is_empty(&self) -> bool {
        TemporalField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    fn has_date_field(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some() || self.day_of_week.is_some()
    }

    fn has_time_field(&self) -> bool {
        self.hour.is_some() || self.minute.is_some()
    }

    /// Some date field is set and no time field is.
    pub fn has_only_date(&self) -> bool {
        self.has_date_field() && !self.has_time_field()
    }

    /// Some time field is set and no date field is.
    pub fn has_only_time(&self) -> bool {
        self.has_time_field() && !self.has_date_field()
    }

    /// Indices into [`TemporalField::ORDERED`] of the most and least
    /// significant populated fields, or `None` when no ordered field is set.
    pub fn msf_lsf(&self) -> Option<(usize, usize)> {
        let populated = |i: &usize| self.get(TemporalField::ORDERED[*i]).is_some();
        let msf = (0..TemporalField::ORDERED.len()).find(populated)?;
        let lsf = (0..TemporalField::ORDERED.len()).rev().find(populated)?;
        Some((msf, lsf))
    }

    /// Day of week, explicit or derived from a full date (1 = Monday).
    pub fn weekday(&self) -> Option<u32> {
        self.day_of_week.or_else(|| self.date_weekday())
    }

    fn date_weekday(&self) -> Option<u32> {
        let date = NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)?;
        Some(date.weekday().number_from_monday())
    }

    /// The concrete point in time for a complete value.
    ///
    /// Returns `None` when the value is incomplete or names a date that does
    /// not exist (e.g. February 30).
    pub fn to_point_in_time(&self) -> Option<NaiveDateTime> {
        if !self.is_complete() {
            return None;
        }
        let midnight = NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)?
            .and_hms_opt(0, 0, 0)?;
        let offset = Duration::hours(i64::from(self.hour?)) + Duration::minutes(i64::from(self.minute?));
        midnight.checked_add_signed(offset)
    }

    // ── Boundary validity ───────────────────────────────────────────────

    /// Whether this value makes sense as the edge of an interval.
    ///
    /// Rejected shapes: year with a day or weekday but no month; month with
    /// a weekday but no day; minute without hour alongside date fields;
    /// hour without day alongside month or year.
    pub fn valid_boundary(&self) -> bool {
        self.boundary_problem().is_none()
    }

    /// Like [`valid_boundary`](Self::valid_boundary), but names the problem.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::InvalidIntervalBoundary`].
    pub fn check_boundary(&self) -> Result<()> {
        match self.boundary_problem() {
            None => Ok(()),
            Some(problem) => Err(TemporalError::InvalidIntervalBoundary(format!(
                "{self}: {problem}"
            ))),
        }
    }

    fn boundary_problem(&self) -> Option<&'static str> {
        if self.year.is_some()
            && (self.day.is_some() || self.day_of_week.is_some())
            && self.month.is_none()
        {
            return Some("year with day but no month");
        }
        if self.month.is_some() && self.day_of_week.is_some() && self.day.is_none() {
            return Some("month with weekday but no day");
        }
        if self.minute.is_some() && self.hour.is_none() && self.has_date_field() {
            return Some("minute without hour on a dated value");
        }
        if self.hour.is_some()
            && self.day.is_none()
            && (self.month.is_some() || self.year.is_some())
        {
            return Some("hour without day on a value with month or year");
        }
        None
    }

    // ── Comparability ───────────────────────────────────────────────────

    /// Field triples for the ordered walk. The day slot carries the weekday
    /// when neither side has a day of month.
    fn walk(&self, other: &PartialDateTime) -> Vec<(TemporalField, Option<i64>, Option<i64>)> {
        let span = match (self.msf_lsf(), other.msf_lsf()) {
            (Some((a0, a1)), Some((b0, b1))) => a0.min(b0)..a1.max(b1) + 1,
            (Some((a0, a1)), None) => a0..a1 + 1,
            (None, Some((b0, b1))) => b0..b1 + 1,
            (None, None) => 0..0,
        };
        let use_weekday = self.day.is_none()
            && other.day.is_none()
            && self.day_of_week.is_some()
            && other.day_of_week.is_some();

        let mut steps: Vec<_> = TemporalField::ORDERED[span]
            .iter()
            .map(|&field| {
                let field = if field == TemporalField::Day && use_weekday {
                    TemporalField::DayOfWeek
                } else {
                    field
                };
                (field, self.get(field), other.get(field))
            })
            .collect();
        if use_weekday && !steps.iter().any(|(f, _, _)| *f == TemporalField::DayOfWeek) {
            steps.push((
                TemporalField::DayOfWeek,
                self.get(TemporalField::DayOfWeek),
                other.get(TemporalField::DayOfWeek),
            ));
            steps.sort_by_key(|(f, _, _)| walk_rank(*f));
        }
        steps
    }

    /// Whether the two values may be ordered at all under `strictness`.
    pub fn comparable(&self, other: &PartialDateTime, strictness: Strictness) -> bool {
        match strictness {
            Strictness::Lax => true,
            Strictness::SharedField => TemporalField::ALL
                .iter()
                .any(|f| self.get(*f).is_some() && other.get(*f).is_some()),
            Strictness::NoMissing => {
                for field in TemporalField::ORDERED {
                    match (self.get(field), other.get(field)) {
                        (Some(a), Some(b)) if a != b => return true,
                        (Some(_), Some(_)) => continue,
                        _ => return false,
                    }
                }
                true
            }
            Strictness::SymmetricMissing => {
                for (_, a, b) in self.walk(other) {
                    match (a, b) {
                        (Some(a), Some(b)) if a != b => return true,
                        (Some(_), None) | (None, Some(_)) => return false,
                        _ => continue,
                    }
                }
                true
            }
            Strictness::SymmetricIgnoringMinute => self
                .walk(other)
                .iter()
                .all(|(field, a, b)| *field == TemporalField::Minute || a.is_some() == b.is_some()),
        }
    }

    /// Any field set on both sides carries different values, or a full date
    /// falls on a different weekday than the other side names.
    pub fn contradicts(&self, other: &PartialDateTime) -> bool {
        let field_clash = TemporalField::ALL.iter().any(|f| {
            matches!((self.get(*f), other.get(*f)), (Some(a), Some(b)) if a != b)
        });
        let weekday_clash = |date: &PartialDateTime, named: &PartialDateTime| {
            matches!((date.date_weekday(), named.day_of_week), (Some(a), Some(b)) if a != b)
        };
        field_clash || weekday_clash(self, other) || weekday_clash(other, self)
    }

    /// Comparable and field-for-field identical.
    pub fn equals(&self, other: &PartialDateTime) -> bool {
        self.comparable(other, Strictness::SharedField) && self == other
    }

    // ── Ordering ────────────────────────────────────────────────────────

    /// The ordering mode used when the caller does not pick one: lax when
    /// exactly one side is complete and the other is a usable boundary,
    /// otherwise symmetric.
    fn default_order_mode(&self, other: &PartialDateTime) -> Strictness {
        let lax = match (self.is_complete(), other.is_complete()) {
            (true, false) => other.valid_boundary(),
            (false, true) => self.valid_boundary(),
            _ => false,
        };
        if lax {
            Strictness::Lax
        } else {
            Strictness::SymmetricMissing
        }
    }

    /// Whether `self` is strictly earlier than `other`.
    ///
    /// Two complete values compare chronologically. Otherwise fields are
    /// walked from year to minute. A field set on one side only yields
    /// [`Fuzzy::Maybe`] under the symmetric modes and is skipped under the
    /// lax ones. The first differing field decides, provided its parent is
    /// pinned: a day needs a month, a minute needs an hour.
    pub fn fuzzy_less_than(&self, other: &PartialDateTime, mode: Option<Strictness>) -> Fuzzy {
        if let (Some(a), Some(b)) = (self.to_point_in_time(), other.to_point_in_time()) {
            return Fuzzy::from(a < b);
        }

        let mode = mode.unwrap_or_else(|| self.default_order_mode(other));
        let skip_gaps = matches!(mode, Strictness::Lax | Strictness::SharedField);

        let mut compared_any = false;
        for (field, a, b) in self.walk(other) {
            match (a, b) {
                (Some(a), Some(b)) => {
                    compared_any = true;
                    if a == b {
                        continue;
                    }
                    if !self.parent_pinned(other, field) {
                        return Fuzzy::Maybe;
                    }
                    return Fuzzy::from(a < b);
                }
                (None, None) => continue,
                _ => {
                    if skip_gaps
                        || (mode == Strictness::SymmetricIgnoringMinute
                            && field == TemporalField::Minute)
                    {
                        continue;
                    }
                    return Fuzzy::Maybe;
                }
            }
        }

        if compared_any {
            Fuzzy::False
        } else {
            Fuzzy::Maybe
        }
    }

    fn parent_pinned(&self, other: &PartialDateTime, field: TemporalField) -> bool {
        match field {
            TemporalField::Day => self.month.is_some() || other.month.is_some(),
            TemporalField::Minute => self.hour.is_some() || other.hour.is_some(),
            _ => true,
        }
    }

    /// `self < other`, with `Maybe` read as `false`.
    pub fn is_before(&self, other: &PartialDateTime) -> bool {
        self.fuzzy_less_than(other, None).is_true()
    }

    /// `self > other`, with `Maybe` read as `false`.
    pub fn is_after(&self, other: &PartialDateTime) -> bool {
        other.is_before(self)
    }

    /// `self <= other`: `other < self` is decidedly false.
    pub fn is_at_or_before(&self, other: &PartialDateTime) -> bool {
        other.fuzzy_less_than(self, None).is_false()
    }

    /// `self >= other`: `self < other` is decidedly false.
    pub fn is_at_or_after(&self, other: &PartialDateTime) -> bool {
        self.fuzzy_less_than(other, None).is_false()
    }

    /// Neither value is decidedly before the other.
    pub fn coincides_with(&self, other: &PartialDateTime) -> bool {
        self.is_at_or_before(other) && self.is_at_or_after(other)
    }

    // ── Interval edge synthesis ─────────────────────────────────────────

    /// Every populated field replaced by its smallest value.
    pub(crate) fn floor(&self) -> PartialDateTime {
        PartialDateTime {
            year: self.year.map(|_| MIN_VALID_YEAR),
            month: self.month.map(|_| 1),
            day: self.day.map(|_| 1),
            day_of_week: self.day_of_week.map(|_| 1),
            hour: self.hour.map(|_| 0),
            minute: self.minute.map(|_| 0),
        }
    }

    /// Every populated field replaced by its largest sensible value.
    pub(crate) fn ceiling(&self) -> PartialDateTime {
        PartialDateTime {
            year: self.year.map(|_| MAX_VALID_YEAR),
            month: self.month.map(|_| 12),
            day: self.day.map(|_| 31),
            day_of_week: self.day_of_week.map(|_| 7),
            hour: self.hour.map(|_| 23),
            minute: self.minute.map(|_| 59),
        }
    }
}

fn walk_rank(field: TemporalField) -> usize {
    match field {
        TemporalField::Year => 0,
        TemporalField::Month => 1,
        TemporalField::Day | TemporalField::DayOfWeek => 2,
        TemporalField::Hour => 3,
        TemporalField::Minute => 4,
    }
}

/// Number of days in `month` of `year`, 31 if the pair is not a real month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

impl fmt::Display for PartialDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(f: &mut fmt::Formatter<'_>, v: Option<i64>, width: usize) -> fmt::Result {
            match v {
                Some(v) => write!(f, "{v:0width$}"),
                None => write!(f, "{}", "*".repeat(width)),
            }
        }
        part(f, self.get(TemporalField::Year), 4)?;
        f.write_str("-")?;
        part(f, self.get(TemporalField::Month), 2)?;
        f.write_str("-")?;
        part(f, self.get(TemporalField::Day), 2)?;
        f.write_str(" ")?;
        part(f, self.get(TemporalField::Hour), 2)?;
        f.write_str(":")?;
        part(f, self.get(TemporalField::Minute), 2)?;
        if let Some(dow) = self.day_of_week {
            const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
            match NAMES.get((dow as usize).wrapping_sub(1)) {
                Some(name) => write!(f, " ({name})")?,
                None => write!(f, " (dow {dow})")?,
            }
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymdhm(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> PartialDateTime {
        PartialDateTime::new()
            .with_year(y)
            .with_month(mo)
            .with_day(d)
            .with_hour(h)
            .with_minute(mi)
    }

    fn hour(h: u32) -> PartialDateTime {
        PartialDateTime::new().with_hour(h)
    }

    // ── Validity and shape ──────────────────────────────────────────────

    #[test]
    fn test_empty_is_valid() {
        assert!(PartialDateTime::new().is_valid().is_ok());
        assert!(PartialDateTime::new().is_empty());
    }

    #[test]
    fn test_month_13_invalid() {
        let err = PartialDateTime::new().with_month(13).validated().unwrap_err();
        assert!(matches!(err, TemporalError::InvalidTemporalValue(_)));
        assert!(err.to_string().contains("month 13"), "got: {err}");
    }

    #[test]
    fn test_year_outside_range_invalid() {
        assert!(PartialDateTime::new().with_year(1999).is_valid().is_err());
        assert!(PartialDateTime::new().with_year(2031).is_valid().is_err());
        assert!(PartialDateTime::new().with_year(2030).is_valid().is_ok());
    }

    #[test]
    fn test_hour_24_and_minute_60_valid() {
        assert!(PartialDateTime::from_time(24, 60).is_valid().is_ok());
        assert!(PartialDateTime::new().with_day_of_week(0).is_valid().is_err());
    }

    #[test]
    fn test_complete_and_shape_queries() {
        let full = ymdhm(2020, 12, 5, 9, 30);
        assert!(full.is_complete());
        assert!(!full.has_only_date());
        assert!(!full.has_only_time());

        let date = PartialDateTime::new().with_month(12).with_day(5);
        assert!(date.has_only_date());
        assert!(!date.is_complete());

        let time = PartialDateTime::from_time(9, 0);
        assert!(time.has_only_time());
    }

    #[test]
    fn test_msf_lsf() {
        let v = PartialDateTime::new().with_month(3).with_hour(9);
        assert_eq!(v.msf_lsf(), Some((1, 3)));
        assert_eq!(PartialDateTime::new().with_day_of_week(2).msf_lsf(), None);
    }

    #[test]
    fn test_merge_explicit_wins() {
        let a = PartialDateTime::new().with_hour(9);
        let b = PartialDateTime::new().with_hour(10).with_minute(15);
        let merged = a.merge(&b);
        assert_eq!(merged.hour, Some(9));
        assert_eq!(merged.minute, Some(15));
    }

    #[test]
    fn test_fill_missing_in_place() {
        let mut v = PartialDateTime::new().with_hour(9);
        v.fill_missing(&PartialDateTime::from_time(0, 0));
        assert_eq!(v, PartialDateTime::from_time(9, 0));
    }

    #[test]
    fn test_to_point_in_time_rolls_hour_24() {
        let v = ymdhm(2020, 12, 31, 24, 0);
        let p = v.to_point_in_time().unwrap();
        assert_eq!(p.to_string(), "2021-01-01 00:00:00");
    }

    #[test]
    fn test_to_point_in_time_rejects_impossible_date() {
        assert!(ymdhm(2021, 2, 30, 9, 0).to_point_in_time().is_none());
    }

    #[test]
    fn test_weekday_derived_from_date() {
        // 2020-12-07 was a Monday.
        let v = PartialDateTime::new().with_year(2020).with_month(12).with_day(7);
        assert_eq!(v.weekday(), Some(1));
    }

    // ── Boundaries ──────────────────────────────────────────────────────

    #[test]
    fn test_boundary_year_weekday_without_month() {
        let v = PartialDateTime::new().with_year(2020).with_day_of_week(1);
        assert!(!v.valid_boundary());
        let err = v.check_boundary().unwrap_err();
        assert!(matches!(err, TemporalError::InvalidIntervalBoundary(_)));
    }

    #[test]
    fn test_boundary_month_weekday_without_day() {
        let v = PartialDateTime::new().with_month(6).with_day_of_week(1);
        assert!(!v.valid_boundary());
    }

    #[test]
    fn test_boundary_minute_without_hour_on_date() {
        let v = PartialDateTime::new().with_day(5).with_minute(30);
        assert!(!v.valid_boundary());
        assert!(PartialDateTime::new().with_minute(30).valid_boundary());
    }

    #[test]
    fn test_boundary_hour_without_day() {
        let v = PartialDateTime::new().with_month(6).with_hour(9);
        assert!(!v.valid_boundary());
        assert!(PartialDateTime::new().with_day_of_week(1).with_hour(9).valid_boundary());
    }

    // ── Comparability ───────────────────────────────────────────────────

    #[test]
    fn test_scenario_hour_vs_weekday_incomparable() {
        let nine = hour(9);
        let wednesday = PartialDateTime::new().with_day_of_week(3);
        assert!(!nine.comparable(&wednesday, Strictness::SharedField));
        assert!(!nine.is_before(&wednesday));
        assert!(!wednesday.is_before(&nine));
    }

    #[test]
    fn test_no_missing_requires_leading_fields() {
        let june = PartialDateTime::new().with_month(6);
        let july = PartialDateTime::new().with_month(7);
        assert!(!june.comparable(&july, Strictness::NoMissing));
        let a = PartialDateTime::new().with_year(2020).with_month(6);
        let b = PartialDateTime::new().with_year(2020).with_month(7);
        assert!(a.comparable(&b, Strictness::NoMissing));
    }

    #[test]
    fn test_symmetric_missing_rejects_asymmetric_gap() {
        let a = PartialDateTime::new().with_month(6).with_day(1);
        let b = PartialDateTime::new().with_day(2);
        assert!(!a.comparable(&b, Strictness::SymmetricMissing));
        assert!(a.comparable(&b, Strictness::Lax));
    }

    #[test]
    fn test_symmetric_ignoring_minute() {
        let a = PartialDateTime::from_time(9, 30);
        let b = hour(9);
        assert!(a.comparable(&b, Strictness::SymmetricIgnoringMinute));
        assert!(!a.comparable(&b, Strictness::SymmetricMissing));
        // A decided hour makes the trailing gap irrelevant.
        assert!(a.comparable(&hour(10), Strictness::SymmetricMissing));
    }

    #[test]
    fn test_contradicts() {
        let a = PartialDateTime::new().with_month(6).with_day(1);
        let b = PartialDateTime::new().with_month(6).with_day(2);
        let c = PartialDateTime::new().with_month(6).with_hour(9);
        assert!(a.contradicts(&b));
        assert!(!a.contradicts(&c));
    }

    #[test]
    fn test_contradicts_weekday_of_date() {
        // 2020-12-07 was a Monday; Tuesday contradicts it.
        let date = PartialDateTime::new().with_year(2020).with_month(12).with_day(7);
        let tuesday = PartialDateTime::new().with_day_of_week(2);
        let monday = PartialDateTime::new().with_day_of_week(1);
        assert!(date.contradicts(&tuesday));
        assert!(!date.contradicts(&monday));
    }

    #[test]
    fn test_equals_requires_shared_field() {
        let empty = PartialDateTime::new();
        assert!(!empty.equals(&empty));
        let nine = hour(9);
        assert!(nine.equals(&nine));
        assert!(!nine.equals(&PartialDateTime::from_time(9, 0)));
    }

    // ── Ordering ────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_month_order_symmetric() {
        let june = PartialDateTime::new().with_month(6);
        let july = PartialDateTime::new().with_month(7);
        assert_eq!(
            june.fuzzy_less_than(&july, Some(Strictness::SymmetricMissing)),
            Fuzzy::True
        );
        assert_eq!(
            july.fuzzy_less_than(&june, Some(Strictness::SymmetricMissing)),
            Fuzzy::False
        );
    }

    #[test]
    fn test_day_without_month_is_maybe() {
        let fifth = PartialDateTime::new().with_day(5);
        let sixth = PartialDateTime::new().with_day(6);
        assert_eq!(fifth.fuzzy_less_than(&sixth, None), Fuzzy::Maybe);
        assert!(!fifth.is_before(&sixth));
    }

    #[test]
    fn test_day_with_month_decides() {
        let a = PartialDateTime::new().with_month(1).with_day(5);
        let b = PartialDateTime::new().with_month(1).with_day(6);
        assert_eq!(a.fuzzy_less_than(&b, None), Fuzzy::True);
    }

    #[test]
    fn test_asymmetric_gap_maybe_then_lax_skips() {
        let a = PartialDateTime::from_time(9, 30);
        let b = hour(9);
        assert_eq!(a.fuzzy_less_than(&b, None), Fuzzy::Maybe);
        assert_eq!(b.fuzzy_less_than(&a, Some(Strictness::Lax)), Fuzzy::False);
    }

    #[test]
    fn test_complete_against_constraint_uses_lax() {
        let full = ymdhm(2020, 1, 5, 9, 0);
        let sixth = PartialDateTime::new().with_month(1).with_day(6);
        assert_eq!(full.fuzzy_less_than(&sixth, None), Fuzzy::True);
        assert_eq!(sixth.fuzzy_less_than(&full, None), Fuzzy::False);
    }

    #[test]
    fn test_weekday_order() {
        let monday = PartialDateTime::new().with_day_of_week(1);
        let thursday = PartialDateTime::new().with_day_of_week(4);
        assert!(monday.is_before(&thursday));
        assert!(thursday.is_after(&monday));
    }

    #[test]
    fn test_equal_values_not_less() {
        let a = PartialDateTime::from_time(9, 0);
        assert_eq!(a.fuzzy_less_than(&a, None), Fuzzy::False);
        assert!(a.is_at_or_before(&a));
        assert!(a.coincides_with(&a));
    }

    #[test]
    fn test_time_order() {
        let nine = PartialDateTime::from_time(9, 0);
        let five = PartialDateTime::from_time(17, 0);
        assert!(nine.is_before(&five));
        assert!(five.is_at_or_after(&nine));
        assert!(!five.is_at_or_before(&nine));
    }

    #[test]
    fn test_display_marks_unset() {
        let v = PartialDateTime::new().with_month(12).with_day(5).with_day_of_week(6);
        assert_eq!(v.to_string(), "****-12-05 **:** (Sat)");
    }

    #[test]
    fn test_floor_and_ceiling_keep_populated_fields() {
        let v = PartialDateTime::new().with_month(2).with_day(10);
        assert_eq!(v.floor(), PartialDateTime::new().with_month(1).with_day(1));
        assert_eq!(v.ceiling(), PartialDateTime::new().with_month(12).with_day(31));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2021, 12), 31);
    }

    // ── Properties ──────────────────────────────────────────────────────

    fn arb_partial() -> impl Strategy<Value = PartialDateTime> {
        (
            proptest::option::of(MIN_VALID_YEAR..=MAX_VALID_YEAR),
            proptest::option::of(1u32..=12),
            proptest::option::of(1u32..=28),
            proptest::option::of(1u32..=7),
            proptest::option::of(0u32..=23),
            proptest::option::of(0u32..=59),
        )
            .prop_map(|(year, month, day, day_of_week, hour, minute)| PartialDateTime {
                year,
                month,
                day,
                day_of_week,
                hour,
                minute,
            })
    }

    fn arb_complete() -> impl Strategy<Value = PartialDateTime> {
        (
            MIN_VALID_YEAR..=MAX_VALID_YEAR,
            1u32..=12,
            1u32..=28,
            0u32..=23,
            0u32..=59,
        )
            .prop_map(|(y, mo, d, h, mi)| ymdhm(y, mo, d, h, mi))
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            max_global_rejects: 8192,
            ..ProptestConfig::default()
        })]

        #[test]
        fn prop_self_comparable_and_equal(x in arb_partial()) {
            prop_assume!(!x.is_empty());
            prop_assert!(x.comparable(&x, Strictness::SharedField));
            prop_assert!(x.equals(&x));
        }

        #[test]
        fn prop_complete_values_order_chronologically(x in arb_complete(), y in arb_complete()) {
            let expected = x.to_point_in_time() < y.to_point_in_time();
            prop_assert_eq!(x.fuzzy_less_than(&y, None), Fuzzy::from(expected));
            prop_assert_eq!(
                x.fuzzy_less_than(&y, Some(Strictness::SymmetricMissing)),
                Fuzzy::from(expected)
            );
        }

        #[test]
        fn prop_disjoint_fields_incomparable(x in arb_partial(), y in arb_partial()) {
            let disjoint = TemporalField::ALL
                .iter()
                .all(|f| x.get(*f).is_none() || y.get(*f).is_none());
            prop_assume!(disjoint && !x.is_empty() && !y.is_empty());
            prop_assert!(!x.comparable(&y, Strictness::SharedField));
        }

        #[test]
        fn prop_strict_order_is_asymmetric(x in arb_partial(), y in arb_partial()) {
            prop_assert!(!(x.is_before(&y) && y.is_before(&x)));
        }
    }
}
