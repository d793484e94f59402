//! # timeslot-engine
//!
//! Reasoning over partially specified time for dialogue calendars.
//!
//! Users describe events piecemeal: "9AM", "next Monday", "sometime in
//! December", "not before lunch". The engine represents such values as
//! partial date-times, orders them with a three-valued comparison, builds
//! typed intervals over them, and prunes the time-slot constraints of a
//! single event as the dialogue proceeds.
//!
//! ## Modules
//!
//! - [`datetime`]: `PartialDateTime`, validity, comparability and fuzzy ordering
//! - [`arith`]: approximate deltas and duration arithmetic on partial values
//! - [`interval`]: typed intervals, compatibility, intersection and containment
//! - [`slot`]: time-slot constraint entries and per-field compatibility
//! - [`pruner`]: the incremental multi-field pruning engine
//! - [`parse`]: literal parsing of partial date-times and durations
//! - [`config`]: valid year range and pruner options
//! - [`error`]: Error types
//!
//! ```
//! use timeslot_engine::{Fuzzy, PartialDateTime, Strictness};
//!
//! let june = PartialDateTime::new().with_month(6);
//! let july = PartialDateTime::new().with_month(7);
//! assert_eq!(june.fuzzy_less_than(&july, Some(Strictness::SymmetricMissing)), Fuzzy::True);
//!
//! let nine = timeslot_engine::parse::parse_partial("9am").unwrap();
//! let wednesday = PartialDateTime::new().with_day_of_week(3);
//! assert!(!nine.comparable(&wednesday, Strictness::SharedField));
//! assert!(!nine.is_before(&wednesday));
//! ```

pub mod arith;
pub mod config;
pub mod datetime;
pub mod error;
pub mod interval;
pub mod parse;
pub mod pruner;
pub mod slot;

pub use arith::Overflow;
pub use config::{PruneOptions, MAX_VALID_YEAR, MIN_VALID_YEAR};
pub use datetime::{Fuzzy, PartialDateTime, Strictness, TemporalField};
pub use error::{Result, TemporalError};
pub use interval::{Comparison, Inclusion, IntersectOptions, IntervalKind, PartialInterval};
pub use parse::{format_duration, parse_duration, parse_partial};
pub use pruner::{prune, OrCluster, TimeSlotPruner, Turn};
pub use slot::{
    compatible_bound, compatible_dur, compatible_inter, DurationBound, EntryId, SlotConstraint,
    SlotField, SlotInterval,
};
