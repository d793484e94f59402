//! Error types for timeslot-engine operations.
//!
//! Only constructors and parsers fail. Comparison, intersection and pruning
//! report incomparability as a value (`Fuzzy::Maybe`, `false`, or no
//! surviving constraint), never as an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid temporal value: {0}")]
    InvalidTemporalValue(String),

    #[error("Incompatible interval boundaries: {0}")]
    IncompatibleIntervalBoundaries(String),

    #[error("Invalid interval boundary: {0}")]
    InvalidIntervalBoundary(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TemporalError>;
