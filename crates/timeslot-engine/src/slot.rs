//! Time-slot constraint entries and the per-field compatibility predicates.
//!
//! One event's time slot is constrained along five fields: when it starts,
//! when it ends, how long it lasts, a range it must fit inside (`Bound`),
//! and a range it must overlap (`Intersect`). Each surviving constraint is a
//! [`SlotInterval`] tagged with the turn that produced it.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};
use crate::interval::{Comparison, PartialInterval};
use crate::parse::format_duration;

/// Which aspect of the slot a constraint restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotField {
    Start,
    End,
    Duration,
    Bound,
    Intersect,
}

impl SlotField {
    pub const ALL: [SlotField; 5] = [
        SlotField::Start,
        SlotField::End,
        SlotField::Duration,
        SlotField::Bound,
        SlotField::Intersect,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            SlotField::Start => 0,
            SlotField::End => 1,
            SlotField::Duration => 2,
            SlotField::Bound => 3,
            SlotField::Intersect => 4,
        }
    }
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotField::Start => "start",
            SlotField::End => "end",
            SlotField::Duration => "duration",
            SlotField::Bound => "bound",
            SlotField::Intersect => "intersect",
        };
        f.write_str(name)
    }
}

// ── Duration constraints ────────────────────────────────────────────────────

/// A duration constraint: `length <cmp> minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DurationBound {
    pub minutes: i64,
    pub comparison: Comparison,
}

impl DurationBound {
    /// # Errors
    ///
    /// Returns [`TemporalError::InvalidDuration`] for a negative duration.
    pub fn new(value: Duration, comparison: Comparison) -> Result<Self> {
        let minutes = value.num_minutes();
        if minutes < 0 {
            return Err(TemporalError::InvalidDuration(format!(
                "slot duration cannot be negative: {}",
                format_duration(value)
            )));
        }
        Ok(Self {
            minutes,
            comparison,
        })
    }

    pub fn value(&self) -> Duration {
        Duration::minutes(self.minutes)
    }

    /// Smallest and largest admissible length in minutes. `NotEq` reports
    /// the full range; its hole is handled separately.
    fn feasible(&self) -> (i64, Option<i64>) {
        let d = self.minutes;
        match self.comparison {
            Comparison::Eq => (d, Some(d)),
            Comparison::Lt => (0, Some(d - 1)),
            Comparison::Le => (0, Some(d)),
            Comparison::Gt => (d + 1, None),
            Comparison::Ge => (d, None),
            Comparison::NotEq => (0, None),
        }
    }

    /// The shortest length the constraint admits.
    pub fn min_required(&self) -> Duration {
        Duration::minutes(self.feasible().0)
    }

    /// The longest length the constraint admits, if bounded.
    pub fn max_allowed(&self) -> Option<Duration> {
        self.feasible().1.map(Duration::minutes)
    }

    /// Whether a slot of exactly `length` satisfies the constraint.
    pub fn admits(&self, length: Duration) -> bool {
        let m = length.num_minutes();
        if self.comparison == Comparison::NotEq {
            return m != self.minutes;
        }
        let (lo, hi) = self.feasible();
        m >= lo && hi.is_none_or(|hi| m <= hi)
    }

    /// Whether some admissible length fits into `room`.
    pub fn fits_within(&self, room: Duration) -> bool {
        self.min_required() <= room
    }
}

impl fmt::Display for DurationBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::Eq => "=",
            Comparison::NotEq => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        };
        write!(f, "{op} {}", format_duration(self.value()))
    }
}

/// Whether two duration constraints can hold together. Two exclusions of
/// the same length are duplicates and count as incompatible.
pub fn compatible_dur(a: &DurationBound, b: &DurationBound) -> bool {
    match (a.comparison, b.comparison) {
        (Comparison::NotEq, Comparison::NotEq) => a.minutes != b.minutes,
        (Comparison::NotEq, _) => !b.admits(a.value()),
        (_, Comparison::NotEq) => !a.admits(b.value()),
        _ => {
            let (a_lo, a_hi) = a.feasible();
            let (b_lo, b_hi) = b.feasible();
            let lo = a_lo.max(b_lo);
            let hi = match (a_hi, b_hi) {
                (Some(x), Some(y)) => Some(x.min(y)),
                (x, y) => x.or(y),
            };
            hi.is_none_or(|hi| lo <= hi)
        }
    }
}

/// Whether two bounding ranges can hold together.
pub fn compatible_bound(a: &PartialInterval, b: &PartialInterval, min_duration: Option<Duration>) -> bool {
    a.compatible(b, false, false, min_duration)
}

/// Intersect constraints accumulate; only an identical repeat replaces an
/// earlier one.
pub fn compatible_inter(a: &PartialInterval, b: &PartialInterval) -> bool {
    !(a.comparable(b) && a == b)
}

// ── Entries ─────────────────────────────────────────────────────────────────

/// One field constraint extracted from a dialogue turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SlotConstraint {
    Start(PartialInterval),
    End(PartialInterval),
    Duration(DurationBound),
    Bound(PartialInterval),
    Intersect(PartialInterval),
}

impl SlotConstraint {
    pub fn field(&self) -> SlotField {
        match self {
            SlotConstraint::Start(_) => SlotField::Start,
            SlotConstraint::End(_) => SlotField::End,
            SlotConstraint::Duration(_) => SlotField::Duration,
            SlotConstraint::Bound(_) => SlotField::Bound,
            SlotConstraint::Intersect(_) => SlotField::Intersect,
        }
    }

    /// The interval, for every field but `Duration`.
    pub fn interval(&self) -> Option<&PartialInterval> {
        match self {
            SlotConstraint::Start(i)
            | SlotConstraint::End(i)
            | SlotConstraint::Bound(i)
            | SlotConstraint::Intersect(i) => Some(i),
            SlotConstraint::Duration(_) => None,
        }
    }

    pub fn duration(&self) -> Option<&DurationBound> {
        match self {
            SlotConstraint::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Same field, and for interval fields, comparable boundaries.
    pub fn field_comparable(&self, other: &SlotConstraint) -> bool {
        if self.field() != other.field() {
            return false;
        }
        match (self.interval(), other.interval()) {
            (Some(a), Some(b)) => a.comparable(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SlotConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotConstraint::Duration(d) => write!(f, "duration {d}"),
            other => match other.interval() {
                Some(i) => write!(f, "{} {i}", other.field()),
                None => Ok(()),
            },
        }
    }
}

/// Identifier the pruner hands out to each admitted constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A constraint with its identity and the turn that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotInterval {
    pub id: EntryId,
    pub created_turn: usize,
    pub constraint: SlotConstraint,
}

impl SlotInterval {
    pub fn field(&self) -> SlotField {
        self.constraint.field()
    }

    /// Later turn wins; within a turn, the later entry.
    pub fn is_newer_than(&self, other: &SlotInterval) -> bool {
        (self.created_turn, self.id) > (other.created_turn, other.id)
    }
}

impl fmt::Display for SlotInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (turn {}) {}", self.id, self.created_turn, self.constraint)
    }
}
