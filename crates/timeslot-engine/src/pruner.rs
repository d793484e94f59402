//! Incremental pruning of one event's time-slot constraints.
//!
//! The dialogue host feeds the constraints of each turn, oldest turn first.
//! The pruner keeps the surviving constraints per [`SlotField`] and decides
//! which earlier ones a new turn supersedes or contradicts. It never touches
//! the host's own representation: superseded entries collect in
//! [`pending_evictions`](TimeSlotPruner::pending_evictions) for the host to
//! remove.
//!
//! Per new entry:
//!
//! 1. Same field: older entries that cannot hold together with the new one
//!    are evicted, then the entry is admitted.
//! 2. Other fields: start and end must stay inside bounds and on the right
//!    side of each other, durations must fit the room left, and a start/end
//!    pair that contradicts a duration loses its older member.
//!
//! Disjunctive turns ([`Turn::AnyOf`]) are never reasoned through. A
//! cluster is dropped whole as soon as any of its branches touches a field
//! constrained by another turn.

use std::mem;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::PruneOptions;
use crate::interval::{IntersectOptions, PartialInterval};
use crate::slot::{
    compatible_bound, compatible_dur, compatible_inter, DurationBound, EntryId, SlotConstraint,
    SlotField, SlotInterval,
};

/// The constraints one dialogue turn contributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Constraints that all hold.
    Constraints(Vec<SlotConstraint>),
    /// Alternatives, at least one of which holds.
    AnyOf(Vec<SlotConstraint>),
}

/// The surviving branches of an [`Turn::AnyOf`] turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrCluster {
    pub turn: usize,
    pub branches: Vec<SlotInterval>,
}

/// Stateful pruner over a chronological sequence of turns.
#[derive(Debug, Clone, Default)]
pub struct TimeSlotPruner {
    options: PruneOptions,
    turn: usize,
    next_id: u64,
    active: [Vec<SlotInterval>; 5],
    clusters: Vec<OrCluster>,
    evicted: Vec<SlotInterval>,
}

impl TimeSlotPruner {
    pub fn new(options: PruneOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Number of turns processed so far.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Surviving plain constraints of one field, oldest first.
    pub fn active(&self, field: SlotField) -> &[SlotInterval] {
        &self.active[field.index()]
    }

    /// Surviving disjunctive turns.
    pub fn clusters(&self) -> &[OrCluster] {
        &self.clusters
    }

    /// Entries evicted since the last [`take_evictions`](Self::take_evictions).
    pub fn pending_evictions(&self) -> &[SlotInterval] {
        &self.evicted
    }

    /// Hand the pending evictions to the caller.
    pub fn take_evictions(&mut self) -> Vec<SlotInterval> {
        mem::take(&mut self.evicted)
    }

    /// Process the next turn and return the ids assigned to its entries.
    pub fn process_turn(&mut self, turn: Turn) -> Vec<EntryId> {
        self.turn += 1;
        match turn {
            Turn::Constraints(constraints) => {
                let entries = self.tag(constraints);
                trace!(turn = self.turn, entries = entries.len(), "processing turn");
                let ids = entries.iter().map(|e| e.id).collect();
                self.evict_clusters_touching(&entries);
                for entry in entries {
                    self.admit(entry);
                }
                ids
            }
            Turn::AnyOf(branches) => {
                let branches = self.tag(branches);
                trace!(turn = self.turn, branches = branches.len(), "processing disjunctive turn");
                let ids = branches.iter().map(|e| e.id).collect();
                if branches.is_empty() {
                    return ids;
                }
                self.evict_clusters_touching(&branches);
                let clashes = self
                    .active
                    .iter()
                    .flatten()
                    .any(|a| touches(&branches, a));
                if clashes {
                    debug!(
                        event = "evict_cluster",
                        turn = self.turn,
                        reason = "branch meets an earlier constraint",
                        "pruned disjunctive turn"
                    );
                    self.evicted.extend(branches);
                } else {
                    self.clusters.push(OrCluster {
                        turn: self.turn,
                        branches,
                    });
                }
                ids
            }
        }
    }

    fn tag(&mut self, constraints: Vec<SlotConstraint>) -> Vec<SlotInterval> {
        let created_turn = self.turn;
        constraints
            .into_iter()
            .map(|constraint| {
                let id = EntryId(self.next_id);
                self.next_id += 1;
                SlotInterval {
                    id,
                    created_turn,
                    constraint,
                }
            })
            .collect()
    }

    fn min_overlap(&self) -> Option<Duration> {
        self.options.min_overlap()
    }

    // ── Admission ───────────────────────────────────────────────────────

    fn admit(&mut self, entry: SlotInterval) {
        let field = entry.field();
        let stale: Vec<EntryId> = self.active[field.index()]
            .iter()
            .filter(|old| !self.same_field_compatible(&old.constraint, &entry.constraint))
            .map(|old| old.id)
            .collect();
        self.evict(field, &stale, "superseded in its own field");
        self.active[field.index()].push(entry.clone());

        match &entry.constraint {
            SlotConstraint::Bound(b) => self.after_bound(b),
            SlotConstraint::Intersect(x) => self.after_intersect(x),
            SlotConstraint::Start(s) => self.after_start(s),
            SlotConstraint::End(e) => self.after_end(e),
            SlotConstraint::Duration(d) => self.after_duration(d),
        }
    }

    fn same_field_compatible(&self, old: &SlotConstraint, new: &SlotConstraint) -> bool {
        match (old, new) {
            (SlotConstraint::Start(a), SlotConstraint::Start(b))
            | (SlotConstraint::End(a), SlotConstraint::End(b)) => {
                a.compatible(b, false, false, self.min_overlap())
            }
            (SlotConstraint::Duration(a), SlotConstraint::Duration(b)) => compatible_dur(a, b),
            (SlotConstraint::Bound(a), SlotConstraint::Bound(b)) => {
                compatible_bound(a, b, self.min_overlap())
            }
            (SlotConstraint::Intersect(a), SlotConstraint::Intersect(b)) => compatible_inter(a, b),
            _ => true,
        }
    }

    fn after_bound(&mut self, b: &PartialInterval) {
        let missed = self.select_intervals(SlotField::Intersect, |x| misses(x, b));
        self.evict(SlotField::Intersect, &missed, "does not meet new bound");

        for field in [SlotField::Start, SlotField::End] {
            let outside = self.select_intervals(field, |x| x.strictly_before(b) || x.strictly_after(b));
            self.evict(field, &outside, "outside new bound");
        }

        if !b.kind().is_negative() {
            if let Some(len) = b.length() {
                self.evict_unfitting_durations(&[len], "longer than new bound");
            }
        }
    }

    fn after_intersect(&mut self, x: &PartialInterval) {
        let missed = self.select_intervals(SlotField::Bound, |b| misses(b, x));
        self.evict(SlotField::Bound, &missed, "does not meet new intersect");

        let late = self.select_intervals(SlotField::Start, |s| s.strictly_after(x));
        self.evict(SlotField::Start, &late, "starts after new intersect");
        let early = self.select_intervals(SlotField::End, |e| e.strictly_before(x));
        self.evict(SlotField::End, &early, "ends before new intersect");
    }

    fn after_start(&mut self, s: &PartialInterval) {
        let outside = self.select_intervals(SlotField::Bound, |b| s.strictly_before(b) || s.strictly_after(b));
        self.evict(SlotField::Bound, &outside, "new start outside bound");
        let passed = self.select_intervals(SlotField::Intersect, |x| s.strictly_after(x));
        self.evict(SlotField::Intersect, &passed, "new start after intersect");
        let early = self.select_intervals(SlotField::End, |e| e.strictly_before(s));
        self.evict(SlotField::End, &early, "ends before new start");

        if !s.kind().is_negative() {
            let rooms: Vec<Duration> = self
                .positive_bounds()
                .filter_map(|b| b.extent_from(s.start()))
                .collect();
            self.evict_unfitting_durations(&rooms, "no room after new start");
        }

        let mut losers = Vec::new();
        for end in &self.active[SlotField::End.index()] {
            let Some(e) = end.constraint.interval() else { continue };
            if !e.comparable(s) {
                continue;
            }
            for dur in &self.active[SlotField::Duration.index()] {
                let Some(d) = dur.constraint.duration() else { continue };
                if lengths_conflict(s, e, d) {
                    losers.push(older(end, dur));
                }
            }
        }
        self.evict_each(&losers, "older side of end/duration conflict");
    }

    fn after_end(&mut self, e: &PartialInterval) {
        let outside = self.select_intervals(SlotField::Bound, |b| e.strictly_before(b) || e.strictly_after(b));
        self.evict(SlotField::Bound, &outside, "new end outside bound");
        let early = self.select_intervals(SlotField::Intersect, |x| e.strictly_before(x));
        self.evict(SlotField::Intersect, &early, "new end before intersect");
        let late = self.select_intervals(SlotField::Start, |s| s.strictly_after(e));
        self.evict(SlotField::Start, &late, "starts after new end");

        if !e.kind().is_negative() {
            let rooms: Vec<Duration> = self
                .positive_bounds()
                .filter_map(|b| e.extent_from(b.start()))
                .collect();
            self.evict_unfitting_durations(&rooms, "no room before new end");
        }

        let mut losers = Vec::new();
        for start in &self.active[SlotField::Start.index()] {
            let Some(s) = start.constraint.interval() else { continue };
            if !s.comparable(e) {
                continue;
            }
            for dur in &self.active[SlotField::Duration.index()] {
                let Some(d) = dur.constraint.duration() else { continue };
                if lengths_conflict(s, e, d) {
                    losers.push(older(start, dur));
                }
            }
        }
        self.evict_each(&losers, "older side of start/duration conflict");
    }

    fn after_duration(&mut self, d: &DurationBound) {
        let tight = self.select_intervals(SlotField::Bound, |b| {
            !b.kind().is_negative() && b.length().is_some_and(|len| !d.fits_within(len))
        });
        self.evict(SlotField::Bound, &tight, "shorter than new duration");

        let bounds: Vec<PartialInterval> = self.positive_bounds().cloned().collect();
        let late = self.select_intervals(SlotField::Start, |s| {
            !s.kind().is_negative()
                && bounds.iter().any(|b| {
                    b.extent_from(s.start())
                        .is_some_and(|room| !d.fits_within(room))
                })
        });
        self.evict(SlotField::Start, &late, "no room for new duration after start");
        let early = self.select_intervals(SlotField::End, |e| {
            !e.kind().is_negative()
                && bounds.iter().any(|b| {
                    e.extent_from(b.start())
                        .is_some_and(|room| !d.fits_within(room))
                })
        });
        self.evict(SlotField::End, &early, "no room for new duration before end");

        let mut losers = Vec::new();
        for start in &self.active[SlotField::Start.index()] {
            let Some(s) = start.constraint.interval() else { continue };
            for end in &self.active[SlotField::End.index()] {
                let Some(e) = end.constraint.interval() else { continue };
                if s.comparable(e) && lengths_conflict(s, e, d) {
                    losers.push(older(start, end));
                }
            }
        }
        self.evict_each(&losers, "older side of start/end conflict");
    }

    // ── Selection and eviction ──────────────────────────────────────────

    fn select_intervals(
        &self,
        field: SlotField,
        pred: impl Fn(&PartialInterval) -> bool,
    ) -> Vec<EntryId> {
        self.active[field.index()]
            .iter()
            .filter(|entry| entry.constraint.interval().is_some_and(|i| pred(i)))
            .map(|entry| entry.id)
            .collect()
    }

    fn positive_bounds(&self) -> impl Iterator<Item = &PartialInterval> + '_ {
        self.active[SlotField::Bound.index()]
            .iter()
            .filter_map(|entry| entry.constraint.interval())
            .filter(|b| !b.kind().is_negative())
    }

    fn evict_unfitting_durations(&mut self, rooms: &[Duration], reason: &'static str) {
        let ids: Vec<EntryId> = self.active[SlotField::Duration.index()]
            .iter()
            .filter(|entry| {
                entry
                    .constraint
                    .duration()
                    .is_some_and(|d| rooms.iter().any(|room| !d.fits_within(*room)))
            })
            .map(|entry| entry.id)
            .collect();
        self.evict(SlotField::Duration, &ids, reason);
    }

    fn evict_each(&mut self, losers: &[(SlotField, EntryId)], reason: &'static str) {
        for (field, id) in losers {
            self.evict(*field, &[*id], reason);
        }
    }

    fn evict(&mut self, field: SlotField, ids: &[EntryId], reason: &'static str) {
        if ids.is_empty() {
            return;
        }
        let set = &mut self.active[field.index()];
        let (gone, kept): (Vec<_>, Vec<_>) = mem::take(set)
            .into_iter()
            .partition(|entry| ids.contains(&entry.id));
        *set = kept;
        for entry in gone {
            debug!(event = "evict", entry = %entry, reason, "pruned time-slot constraint");
            self.evicted.push(entry);
        }
    }

    fn evict_clusters_touching(&mut self, entries: &[SlotInterval]) {
        let (gone, kept): (Vec<_>, Vec<_>) = mem::take(&mut self.clusters)
            .into_iter()
            .partition(|cluster| cluster.branches.iter().any(|b| touches(entries, b)));
        self.clusters = kept;
        for cluster in gone {
            debug!(
                event = "evict_cluster",
                turn = cluster.turn,
                reason = "later turn constrains the same field",
                "pruned disjunctive turn"
            );
            self.evicted.extend(cluster.branches);
        }
    }
}

/// Run a whole dialogue through a fresh pruner and return every evicted
/// entry, in eviction order.
pub fn prune(turns: impl IntoIterator<Item = Turn>, options: PruneOptions) -> Vec<SlotInterval> {
    let mut pruner = TimeSlotPruner::new(options);
    for turn in turns {
        pruner.process_turn(turn);
    }
    pruner.take_evictions()
}

fn touches(entries: &[SlotInterval], other: &SlotInterval) -> bool {
    entries
        .iter()
        .any(|e| e.constraint.field_comparable(&other.constraint))
}

/// Comparable, and no point in common.
fn misses(a: &PartialInterval, b: &PartialInterval) -> bool {
    let opts = IntersectOptions {
        handle_negation: true,
        ..IntersectOptions::default()
    };
    a.comparable(b) && !a.intersect(b, opts)
}

fn older(a: &SlotInterval, b: &SlotInterval) -> (SlotField, EntryId) {
    let loser = if a.is_newer_than(b) { b } else { a };
    (loser.field(), loser.id)
}

/// Whether every slot running from inside `s` to inside `e` violates `d`.
fn lengths_conflict(s: &PartialInterval, e: &PartialInterval, d: &DurationBound) -> bool {
    if s.kind().is_negative() || e.kind().is_negative() {
        return false;
    }
    let longest = e.extent_from(s.start());
    let shortest = s.end().delta_to(e.start());

    let too_short = longest.is_some_and(|l| l < d.min_required());
    let too_long = matches!((shortest, d.max_allowed()), (Some(sh), Some(max)) if sh > max);
    let excluded = longest.is_some() && longest == shortest && longest.is_some_and(|l| !d.admits(l));
    too_short || too_long || excluded
}
