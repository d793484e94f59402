//! Compile-time bounds and pruner options.
//!
//! The valid year range is fixed at build time. Everything a host may want
//! to tune per deployment lives in [`PruneOptions`], which deserializes from
//! JSON so it can sit next to the rest of the host's dialogue configuration.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TemporalError};

/// Smallest year a [`PartialDateTime`](crate::PartialDateTime) may carry.
pub const MIN_VALID_YEAR: i32 = 2000;

/// Largest year a [`PartialDateTime`](crate::PartialDateTime) may carry.
pub const MAX_VALID_YEAR: i32 = 2030;

/// Day 1 of the anchor used for arithmetic on values that lack a date.
/// 2000-01-03 is a Monday, so weekday offsets map onto day offsets directly.
const REFERENCE_YMD: (i32, u32, u32) = (MIN_VALID_YEAR, 1, 3);

/// Anchor date for arithmetic and weekday projection on partial values.
pub(crate) fn reference_date() -> NaiveDate {
    let (y, m, d) = REFERENCE_YMD;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Options for [`TimeSlotPruner`](crate::TimeSlotPruner).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PruneOptions {
    /// Overlaps shorter than this many minutes count as contradictions when
    /// deciding whether two ordered constraints can both hold. `None` keeps
    /// every non-empty overlap, including single-point ones.
    pub min_overlap_minutes: Option<i64>,
}

impl PruneOptions {
    /// Parse options from a JSON document.
    ///
    /// ```
    /// use timeslot_engine::PruneOptions;
    ///
    /// let opts = PruneOptions::from_json_str(r#"{ "min_overlap_minutes": 5 }"#).unwrap();
    /// assert_eq!(opts.min_overlap_minutes, Some(5));
    /// ```
    pub fn from_json_str(s: &str) -> Result<Self> {
        let opts: PruneOptions =
            serde_json::from_str(s).map_err(|e| TemporalError::InvalidConfig(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject negative thresholds.
    pub fn validate(&self) -> Result<()> {
        match self.min_overlap_minutes {
            Some(m) if m < 0 => Err(TemporalError::InvalidConfig(format!(
                "min_overlap_minutes must be non-negative, got {m}"
            ))),
            _ => Ok(()),
        }
    }

    /// The minimum-overlap threshold as a duration.
    pub fn min_overlap(&self) -> Option<Duration> {
        self.min_overlap_minutes.map(Duration::minutes)
    }
}
