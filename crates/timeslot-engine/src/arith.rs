//! Duration arithmetic on partial date-times.
//!
//! Partial values have no fixed position on the timeline, so arithmetic
//! anchors them at a reference point, moves the anchor, and projects the
//! originally populated fields back out. Overflow past the natural cycle of
//! the value (a year for month-only dates, a day for time-only values) is
//! either wrapped or clamped, see [`Overflow`].

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::{reference_date, MIN_VALID_YEAR};
use crate::datetime::{days_in_month, PartialDateTime, Strictness, TemporalField, MINUTES_PER_DAY};

/// What [`PartialDateTime::add_delta`] does when a partial value runs past
/// the end of its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Overflow {
    /// Stop at the cycle edge in the direction of travel (Dec 31 / Jan 1,
    /// 23:59 / 00:00).
    #[default]
    Clamp,
    /// Wrap around modulo the cycle.
    Wrap,
}

impl PartialDateTime {
    /// Signed duration from `self` to `other`.
    ///
    /// Two complete values subtract exactly. Otherwise the values must be
    /// comparable under [`Strictness::SymmetricIgnoringMinute`], and the
    /// result sums the differences of jointly populated fields with a month
    /// counted as 30 days and a year as 365.
    pub fn delta_to(&self, other: &PartialDateTime) -> Option<Duration> {
        if let (Some(a), Some(b)) = (self.to_point_in_time(), other.to_point_in_time()) {
            return Some(b - a);
        }
        if !self.comparable(other, Strictness::SymmetricIgnoringMinute) {
            return None;
        }

        let weekday_only = self.day.is_none() && other.day.is_none();
        let mut minutes = 0i64;
        let mut any = false;
        for field in TemporalField::ALL {
            if field == TemporalField::DayOfWeek && !weekday_only {
                continue;
            }
            if let (Some(a), Some(b)) = (self.get(field), other.get(field)) {
                minutes += (b - a) * field.approx_minutes();
                any = true;
            }
        }
        any.then(|| Duration::minutes(minutes))
    }

    /// How much time a closed edge at `self` still covers: a whole day (or
    /// month, or year) when the least significant populated field is
    /// coarser than an hour, zero otherwise.
    pub(crate) fn granule(&self) -> Duration {
        if self.hour.is_some() || self.minute.is_some() {
            return Duration::zero();
        }
        TemporalField::ALL
            .iter()
            .rev()
            .find(|f| self.get(**f).is_some())
            .map_or_else(Duration::zero, |f| Duration::minutes(f.approx_minutes()))
    }

    /// Move the value by `delta`, keeping only the fields it started with.
    ///
    /// Sub-minute parts of `delta` are ignored, and date-only values move
    /// by whole days.
    pub fn add_delta(&self, delta: Duration, overflow: Overflow) -> PartialDateTime {
        let minutes = delta.num_minutes();
        if minutes == 0 || self.is_empty() {
            return *self;
        }
        if let Some(point) = self.to_point_in_time() {
            return self.project(point + Duration::minutes(minutes));
        }
        if self.has_only_date() {
            if let Some(moved) = self.add_to_date(delta.num_days(), overflow) {
                return moved;
            }
        }
        if self.has_only_time() {
            return self.add_to_time(minutes, overflow);
        }
        self.add_anchored(minutes)
    }

    /// Date-only shapes: full date, year and month, or month without year.
    /// Returns `None` for shapes handled by the generic anchor.
    fn add_to_date(&self, days: i64, overflow: Overflow) -> Option<PartialDateTime> {
        if days == 0 {
            return Some(*self);
        }
        match (self.year, self.month, self.day) {
            (Some(year), Some(month), Some(day)) => {
                let date = clamped_date(year, month, day)?;
                Some(self.project_date(date.checked_add_signed(Duration::days(days))?))
            }
            (Some(year), Some(month), None) => {
                let date = clamped_date(year, month, 1)?;
                Some(self.project_date(date.checked_add_signed(Duration::days(days))?))
            }
            (None, Some(month), day) => {
                let anchor = clamped_date(MIN_VALID_YEAR, month, day.unwrap_or(1))?;
                let moved = anchor.checked_add_signed(Duration::days(days))?;
                let moved = if moved.year() == anchor.year() {
                    moved
                } else {
                    match overflow {
                        Overflow::Wrap => moved,
                        Overflow::Clamp if days > 0 => NaiveDate::from_ymd_opt(anchor.year(), 12, 31)?,
                        Overflow::Clamp => NaiveDate::from_ymd_opt(anchor.year(), 1, 1)?,
                    }
                };
                Some(self.project_date(moved))
            }
            _ => None,
        }
    }

    /// Time-only values move within a single day.
    fn add_to_time(&self, minutes: i64, overflow: Overflow) -> PartialDateTime {
        let start = i64::from(self.hour.unwrap_or(0)) * 60 + i64::from(self.minute.unwrap_or(0));
        let mut total = start + minutes;
        if !(0..MINUTES_PER_DAY).contains(&total) {
            total = match overflow {
                Overflow::Wrap => total.rem_euclid(MINUTES_PER_DAY),
                Overflow::Clamp if minutes > 0 => MINUTES_PER_DAY - 1,
                Overflow::Clamp => 0,
            };
        }
        PartialDateTime {
            hour: self.hour.map(|_| (total / 60) as u32),
            minute: self.minute.map(|_| (total % 60) as u32),
            ..*self
        }
    }

    /// Any other shape: anchor at the reference date-time, move, project.
    fn add_anchored(&self, minutes: i64) -> PartialDateTime {
        let base = reference_date();
        let date = if self.year.is_some() || self.month.is_some() || self.day.is_some() {
            clamped_date(
                self.year.unwrap_or(base.year()),
                self.month.unwrap_or(base.month()),
                self.day.unwrap_or(1),
            )
        } else {
            let offset = i64::from(self.day_of_week.unwrap_or(1)) - 1;
            base.checked_add_signed(Duration::days(offset))
        };
        let Some(midnight) = date.and_then(|d| d.and_hms_opt(0, 0, 0)) else {
            return *self;
        };
        let anchor = midnight
            + Duration::hours(i64::from(self.hour.unwrap_or(0)))
            + Duration::minutes(i64::from(self.minute.unwrap_or(0)));
        match anchor.checked_add_signed(Duration::minutes(minutes)) {
            Some(moved) => self.project(moved),
            None => *self,
        }
    }

    /// Copy the populated fields of `self` out of a concrete point.
    fn project(&self, point: NaiveDateTime) -> PartialDateTime {
        PartialDateTime {
            year: self.year.map(|_| point.year()),
            month: self.month.map(|_| point.month()),
            day: self.day.map(|_| point.day()),
            day_of_week: self.day_of_week.map(|_| point.weekday().number_from_monday()),
            hour: self.hour.map(|_| point.hour()),
            minute: self.minute.map(|_| point.minute()),
        }
    }

    fn project_date(&self, date: NaiveDate) -> PartialDateTime {
        PartialDateTime {
            year: self.year.map(|_| date.year()),
            month: self.month.map(|_| date.month()),
            day: self.day.map(|_| date.day()),
            day_of_week: self.day_of_week.map(|_| date.weekday().number_from_monday()),
            ..*self
        }
    }
}

/// A real date, pulling `day` back to the last day of the month if needed.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}
