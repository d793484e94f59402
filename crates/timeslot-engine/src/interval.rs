//! Typed intervals over partial date-times.
//!
//! A [`PartialInterval`] is a point (`Eq`), a ray (`Lt`, `Le`, `Gt`, `Ge`),
//! a bounded range, or the negation of a point or range. Every interval
//! stores two concrete boundaries: rays get their open side synthesized
//! from the anchor, either by a companion duration or by pushing every
//! populated field to its floor or ceiling. "Before 9:00" becomes
//! `[00:00, 09:00)` and "from January 5th" becomes `[01-05, 12-31]`.
//!
//! Boundaries compare with the fuzzy ordering of
//! [`PartialDateTime`], so every predicate here reads an undecidable
//! comparison as "no".

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::arith::Overflow;
use crate::datetime::{PartialDateTime, Strictness};
use crate::error::{Result, TemporalError};

// ── Kinds ───────────────────────────────────────────────────────────────────

/// A single-value comparison, as reported by the host for a leaf constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn negated(self) -> Comparison {
        match self {
            Comparison::Eq => Comparison::NotEq,
            Comparison::NotEq => Comparison::Eq,
            Comparison::Lt => Comparison::Ge,
            Comparison::Ge => Comparison::Lt,
            Comparison::Le => Comparison::Gt,
            Comparison::Gt => Comparison::Le,
        }
    }
}

/// The shape of a [`PartialInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKind {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Range,
    NotRange,
}

impl IntervalKind {
    /// The fixed negation table: `Lt↔Ge`, `Le↔Gt`, `Eq↔NotEq`, `Range↔NotRange`.
    pub fn negated(self) -> IntervalKind {
        match self {
            IntervalKind::Eq => IntervalKind::NotEq,
            IntervalKind::NotEq => IntervalKind::Eq,
            IntervalKind::Lt => IntervalKind::Ge,
            IntervalKind::Ge => IntervalKind::Lt,
            IntervalKind::Le => IntervalKind::Gt,
            IntervalKind::Gt => IntervalKind::Le,
            IntervalKind::Range => IntervalKind::NotRange,
            IntervalKind::NotRange => IntervalKind::Range,
        }
    }

    /// `NotEq` and `NotRange`, which may describe a non-contiguous set.
    pub fn is_negative(self) -> bool {
        matches!(self, IntervalKind::NotEq | IntervalKind::NotRange)
    }

    /// `Eq` and `NotEq`.
    pub fn is_point(self) -> bool {
        matches!(self, IntervalKind::Eq | IntervalKind::NotEq)
    }

    /// `Eq` and `Range`.
    pub fn is_pinned(self) -> bool {
        matches!(self, IntervalKind::Eq | IntervalKind::Range)
    }

    /// The set a negative kind excludes; positive kinds map to themselves.
    pub fn positive(self) -> IntervalKind {
        match self {
            IntervalKind::NotEq => IntervalKind::Eq,
            IntervalKind::NotRange => IntervalKind::Range,
            other => other,
        }
    }
}

impl From<Comparison> for IntervalKind {
    fn from(c: Comparison) -> Self {
        match c {
            Comparison::Eq => IntervalKind::Eq,
            Comparison::NotEq => IntervalKind::NotEq,
            Comparison::Lt => IntervalKind::Lt,
            Comparison::Le => IntervalKind::Le,
            Comparison::Gt => IntervalKind::Gt,
            Comparison::Ge => IntervalKind::Ge,
        }
    }
}

/// Which edges of a range belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Inclusion {
    Open,
    #[default]
    Closed,
    OpenClosed,
    ClosedOpen,
}

impl Inclusion {
    pub fn from_edges(start_closed: bool, end_closed: bool) -> Inclusion {
        match (start_closed, end_closed) {
            (true, true) => Inclusion::Closed,
            (false, false) => Inclusion::Open,
            (false, true) => Inclusion::OpenClosed,
            (true, false) => Inclusion::ClosedOpen,
        }
    }

    pub fn start_closed(self) -> bool {
        matches!(self, Inclusion::Closed | Inclusion::ClosedOpen)
    }

    pub fn end_closed(self) -> bool {
        matches!(self, Inclusion::Closed | Inclusion::OpenClosed)
    }

    /// The same edges read in the opposite direction.
    fn reversed(self) -> Inclusion {
        Inclusion::from_edges(self.end_closed(), self.start_closed())
    }
}

/// Knobs for [`PartialInterval::intersect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntersectOptions {
    /// Treat every edge as closed.
    pub ignore_inclusion: bool,
    /// Overlaps shorter than this do not count.
    pub min_duration: Option<Duration>,
    /// Unfold `NotRange` into two rays and `NotEq` into "anything but this
    /// point" instead of reading negative kinds as their stored range.
    pub handle_negation: bool,
}

// ── PartialInterval ─────────────────────────────────────────────────────────

/// An interval between two partial date-times.
///
/// Immutable once built; `start` never follows `end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PartialInterval {
    start: PartialDateTime,
    end: PartialDateTime,
    kind: IntervalKind,
    inclusion: Inclusion,
}

impl PartialInterval {
    /// Build an interval from one or two boundaries.
    ///
    /// For rays the anchor is `end` for `Lt`/`Le` and `start` for `Gt`/`Ge`;
    /// whichever side is given is used if the expected one is missing. The
    /// open side is `anchor ∓ companion` when a companion duration is
    /// given, else the anchor's floor or ceiling. `inclusion` is only read
    /// for `Range` and `NotRange`.
    ///
    /// # Errors
    ///
    /// - [`TemporalError::IncompatibleIntervalBoundaries`] if neither boundary
    ///   is given, or the two given boundaries share no field.
    /// - [`TemporalError::InvalidIntervalBoundary`] if a given boundary is not
    ///   a valid interval edge.
    pub fn new(
        start: Option<PartialDateTime>,
        end: Option<PartialDateTime>,
        kind: IntervalKind,
        inclusion: Inclusion,
        companion: Option<Duration>,
    ) -> Result<Self> {
        for boundary in [start.as_ref(), end.as_ref()].into_iter().flatten() {
            boundary.check_boundary()?;
        }
        if let (Some(s), Some(e)) = (start.as_ref(), end.as_ref()) {
            if !s.comparable(e, Strictness::SharedField) {
                return Err(TemporalError::IncompatibleIntervalBoundaries(format!(
                    "{s} and {e} share no field"
                )));
            }
        }

        let (start, end, inclusion) = match (kind, start, end) {
            (_, None, None) => {
                return Err(TemporalError::IncompatibleIntervalBoundaries(
                    "neither boundary supplied".to_string(),
                ));
            }
            (IntervalKind::Eq | IntervalKind::NotEq, Some(s), Some(e)) if !s.equals(&e) => {
                return Err(TemporalError::IncompatibleIntervalBoundaries(format!(
                    "point interval given two different boundaries {s} and {e}"
                )));
            }
            (IntervalKind::Eq | IntervalKind::NotEq, s, e) => {
                let p = s.or(e).unwrap_or_default();
                (p, p, Inclusion::Closed)
            }
            (IntervalKind::Lt | IntervalKind::Le, s, e) => {
                let anchor = e.or(s).unwrap_or_default();
                let lower = match (s, e) {
                    (Some(s), Some(_)) => s,
                    _ => synthesize_start(&anchor, companion),
                };
                let inclusion = if kind == IntervalKind::Lt {
                    Inclusion::ClosedOpen
                } else {
                    Inclusion::Closed
                };
                (lower, anchor, inclusion)
            }
            (IntervalKind::Gt | IntervalKind::Ge, s, e) => {
                let anchor = s.or(e).unwrap_or_default();
                let upper = match (s, e) {
                    (Some(_), Some(e)) => e,
                    _ => synthesize_end(&anchor, companion),
                };
                let inclusion = if kind == IntervalKind::Gt {
                    Inclusion::OpenClosed
                } else {
                    Inclusion::Closed
                };
                (anchor, upper, inclusion)
            }
            (IntervalKind::Range | IntervalKind::NotRange, s, e) => {
                let s2 = s.unwrap_or_else(|| e.map(|e| synthesize_start(&e, companion)).unwrap_or_default());
                let e2 = e.unwrap_or_else(|| synthesize_end(&s2, companion));
                (s2, e2, inclusion)
            }
        };

        if end.is_before(&start) {
            // Ray edges follow the kind, not the argument order.
            let inclusion = match kind {
                IntervalKind::Range | IntervalKind::NotRange => inclusion.reversed(),
                _ => inclusion,
            };
            return Ok(Self::from_parts(end, start, kind, inclusion));
        }
        Ok(Self::from_parts(start, end, kind, inclusion))
    }

    /// A single point (`Eq`).
    pub fn point(at: PartialDateTime) -> Result<Self> {
        Self::new(Some(at), None, IntervalKind::Eq, Inclusion::Closed, None)
    }

    /// A constraint of the form `slot <cmp> anchor`.
    pub fn ray(cmp: Comparison, anchor: PartialDateTime, companion: Option<Duration>) -> Result<Self> {
        let kind = IntervalKind::from(cmp);
        match kind {
            IntervalKind::Lt | IntervalKind::Le => {
                Self::new(None, Some(anchor), kind, Inclusion::Closed, companion)
            }
            _ => Self::new(Some(anchor), None, kind, Inclusion::Closed, companion),
        }
    }

    /// A bounded range.
    pub fn range(start: PartialDateTime, end: PartialDateTime, inclusion: Inclusion) -> Result<Self> {
        Self::new(Some(start), Some(end), IntervalKind::Range, inclusion, None)
    }

    /// Everything outside a bounded range.
    pub fn not_range(start: PartialDateTime, end: PartialDateTime, inclusion: Inclusion) -> Result<Self> {
        Self::new(Some(start), Some(end), IntervalKind::NotRange, inclusion, None)
    }

    fn from_parts(
        start: PartialDateTime,
        end: PartialDateTime,
        kind: IntervalKind,
        inclusion: Inclusion,
    ) -> Self {
        Self {
            start,
            end,
            kind,
            inclusion,
        }
    }

    pub fn start(&self) -> &PartialDateTime {
        &self.start
    }

    pub fn end(&self) -> &PartialDateTime {
        &self.end
    }

    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    pub fn inclusion(&self) -> Inclusion {
        self.inclusion
    }

    pub fn negated_kind(&self) -> IntervalKind {
        self.kind.negated()
    }

    fn start_closed(&self) -> bool {
        self.inclusion.start_closed()
    }

    fn end_closed(&self) -> bool {
        self.inclusion.end_closed()
    }

    /// The logical negation, by the fixed kind table. Rays flip to the other
    /// side of their anchor.
    pub fn negate(&self) -> PartialInterval {
        let kind = self.kind.negated();
        match self.kind {
            IntervalKind::Lt => Self::from_parts(self.end, self.end.ceiling(), kind, Inclusion::Closed),
            IntervalKind::Le => Self::from_parts(self.end, self.end.ceiling(), kind, Inclusion::OpenClosed),
            IntervalKind::Gt => Self::from_parts(self.start.floor(), self.start, kind, Inclusion::Closed),
            IntervalKind::Ge => Self::from_parts(self.start.floor(), self.start, kind, Inclusion::ClosedOpen),
            IntervalKind::Eq
            | IntervalKind::NotEq
            | IntervalKind::Range
            | IntervalKind::NotRange => Self::from_parts(self.start, self.end, kind, self.inclusion),
        }
    }

    /// The excluded set of a negative kind, or `self` for positive kinds.
    fn positive_part(&self) -> PartialInterval {
        Self::from_parts(self.start, self.end, self.kind.positive(), self.inclusion)
    }

    /// Both boundaries share a field with the other interval's boundaries.
    pub fn comparable(&self, other: &PartialInterval) -> bool {
        self.start.comparable(&other.start, Strictness::SharedField)
            && self.end.comparable(&other.end, Strictness::SharedField)
    }

    /// Approximate length, see [`PartialDateTime::delta_to`]. A closed
    /// date-only end covers its whole day, so `Jan 5..Jan 5` lasts a day.
    pub fn length(&self) -> Option<Duration> {
        self.extent_from(&self.start)
    }

    /// Time from `from` to the last moment the interval covers.
    pub(crate) fn extent_from(&self, from: &PartialDateTime) -> Option<Duration> {
        let delta = from.delta_to(&self.end)?;
        if self.end_closed() {
            Some(delta + self.end.granule())
        } else {
            Some(delta)
        }
    }

    /// Whether both constraints, each optionally negated, can hold at once.
    ///
    /// Incomparable intervals constrain different aspects of a slot and are
    /// always compatible. A negative kind is compatible with anything its
    /// excluded set does not meet. A positive `Eq` or `Range` pins the slot
    /// down, so it is compatible with no other comparable positive
    /// interval. Two rays are compatible when they overlap for at least
    /// `min_duration`.
    pub fn compatible(
        &self,
        other: &PartialInterval,
        negate_self: bool,
        negate_other: bool,
        min_duration: Option<Duration>,
    ) -> bool {
        let a = if negate_self { self.negate() } else { self.clone() };
        let b = if negate_other { other.negate() } else { other.clone() };
        if !a.comparable(&b) {
            return true;
        }

        let plain = IntersectOptions::default();
        match (a.kind.is_negative(), b.kind.is_negative()) {
            (true, true) => !a.positive_part().intersect(&b.positive_part(), plain),
            (true, false) => !a.positive_part().intersect(&b, plain),
            (false, true) => !b.positive_part().intersect(&a, plain),
            (false, false) if a.kind.is_pinned() || b.kind.is_pinned() => false,
            (false, false) => a.intersect(
                &b,
                IntersectOptions {
                    min_duration,
                    ..plain
                },
            ),
        }
    }

    /// Whether the two intervals share at least one point.
    pub fn intersect(&self, other: &PartialInterval, opts: IntersectOptions) -> bool {
        if !self.comparable(other) {
            return false;
        }

        if opts.handle_negation {
            if let Some(rays) = self.unfold_not_range() {
                return rays.iter().any(|r| r.intersect(other, opts));
            }
            if let Some(rays) = other.unfold_not_range() {
                return rays.iter().any(|r| self.intersect(r, opts));
            }
            if self.kind == IntervalKind::NotEq || other.kind == IntervalKind::NotEq {
                let same_point = self.kind.is_point()
                    && other.kind.is_point()
                    && self.start.coincides_with(&other.start);
                return !same_point;
            }
        }

        let ic = opts.ignore_inclusion;
        let overlaps = reaches(&self.end, self.end_closed(), &other.start, other.start_closed(), ic)
            && reaches(&other.end, other.end_closed(), &self.start, self.start_closed(), ic);
        if !overlaps {
            return false;
        }

        match (opts.min_duration, self.overlap_length(other)) {
            (Some(min), Some(len)) => len >= min,
            _ => true,
        }
    }

    /// The overlapping part of two positive intervals. An edge is closed
    /// when the input supplying it is closed there, or both are when the
    /// inputs share the edge.
    pub fn intersection(&self, other: &PartialInterval, ignore_inclusion: bool) -> Option<PartialInterval> {
        if self.kind.is_negative() || other.kind.is_negative() {
            return None;
        }
        let opts = IntersectOptions {
            ignore_inclusion,
            ..IntersectOptions::default()
        };
        if !self.intersect(other, opts) {
            return None;
        }

        let (start, start_closed) = if self.start.is_before(&other.start) {
            (other.start, other.start_closed())
        } else if other.start.is_before(&self.start) {
            (self.start, self.start_closed())
        } else {
            (self.start, self.start_closed() && other.start_closed())
        };
        let (end, end_closed) = if self.end.is_before(&other.end) {
            (self.end, self.end_closed())
        } else if other.end.is_before(&self.end) {
            (other.end, other.end_closed())
        } else {
            (self.end, self.end_closed() && other.end_closed())
        };

        let inclusion = if ignore_inclusion {
            Inclusion::Closed
        } else {
            Inclusion::from_edges(start_closed, end_closed)
        };
        let kind = if start.coincides_with(&end) && inclusion == Inclusion::Closed {
            IntervalKind::Eq
        } else {
            IntervalKind::Range
        };
        Some(Self::from_parts(start, end, kind, inclusion))
    }

    /// Whether `other` lies wholly inside `self`. Equal endpoints count only
    /// if `self` is closed there or `other` is open there.
    pub fn bounds(&self, other: &PartialInterval) -> bool {
        if !self.comparable(other) || other.kind.is_negative() {
            return false;
        }
        if self.kind.is_negative() {
            return !self.positive_part().intersect(other, IntersectOptions::default());
        }

        let start_ok = self.start.is_before(&other.start)
            || (self.start.coincides_with(&other.start)
                && (self.start_closed() || !other.start_closed()));
        let end_ok = other.end.is_before(&self.end)
            || (other.end.coincides_with(&self.end) && (self.end_closed() || !other.end_closed()));
        start_ok && end_ok
    }

    /// Every point of `self` precedes every point of `other`. Always `false`
    /// for negative kinds.
    pub fn strictly_before(&self, other: &PartialInterval) -> bool {
        if self.kind.is_negative() || other.kind.is_negative() || !self.comparable(other) {
            return false;
        }
        self.end.is_before(&other.start)
            || (self.end.coincides_with(&other.start)
                && !(self.end_closed() && other.start_closed()))
    }

    /// Every point of `self` follows every point of `other`. Always `false`
    /// for negative kinds.
    pub fn strictly_after(&self, other: &PartialInterval) -> bool {
        other.strictly_before(self)
    }

    /// `NotRange` as the two rays either side of its excluded range.
    fn unfold_not_range(&self) -> Option<[PartialInterval; 2]> {
        if self.kind != IntervalKind::NotRange {
            return None;
        }
        let (below_kind, below_incl) = if self.start_closed() {
            (IntervalKind::Lt, Inclusion::ClosedOpen)
        } else {
            (IntervalKind::Le, Inclusion::Closed)
        };
        let (above_kind, above_incl) = if self.end_closed() {
            (IntervalKind::Gt, Inclusion::OpenClosed)
        } else {
            (IntervalKind::Ge, Inclusion::Closed)
        };
        Some([
            Self::from_parts(self.start.floor(), self.start, below_kind, below_incl),
            Self::from_parts(self.end, self.end.ceiling(), above_kind, above_incl),
        ])
    }

    fn overlap_length(&self, other: &PartialInterval) -> Option<Duration> {
        let later_start = if self.start.is_before(&other.start) {
            &other.start
        } else {
            &self.start
        };
        let earlier = if other.end.is_before(&self.end) { other } else { self };
        earlier.extent_from(later_start)
    }
}

/// An interval ending at `end` reaches one starting at `start`.
fn reaches(
    end: &PartialDateTime,
    end_closed: bool,
    start: &PartialDateTime,
    start_closed: bool,
    ignore_inclusion: bool,
) -> bool {
    start.is_before(end)
        || (start.coincides_with(end) && (ignore_inclusion || (end_closed && start_closed)))
}

fn synthesize_start(anchor: &PartialDateTime, companion: Option<Duration>) -> PartialDateTime {
    match companion {
        Some(d) => anchor.add_delta(-d, Overflow::Clamp),
        None => anchor.floor(),
    }
}

fn synthesize_end(anchor: &PartialDateTime, companion: Option<Duration>) -> PartialDateTime {
    match companion {
        Some(d) => anchor.add_delta(d, Overflow::Clamp),
        None => anchor.ceiling(),
    }
}

impl fmt::Display for PartialInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.start_closed() { '[' } else { '(' };
        let close = if self.end_closed() { ']' } else { ')' };
        write!(f, "{:?} {open}{}, {}{close}", self.kind, self.start, self.end)
    }
}
