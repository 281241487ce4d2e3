use std::result::Result as StdResult;

use thiserror::Error;

use crate::fiscal::Period;

/// Fatal settings problems. Raised while loading settings, before any period is computed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate `{field}` has no unit; use {{\"value\": .., \"unit\": \"percent|basis_points|ppm\"}}")]
    AmbiguousRateUnit { field: String },
    #[error("rate `{field}` is outside 0..=100% ({basis_points} bp)")]
    RateOutOfRange { field: String, basis_points: i64 },
    #[error("rate `{field}` = {value} does not land on a whole basis point")]
    LossyRate { field: String, value: String },
    #[error("rate `{field}` is configured twice with different values")]
    ConflictingRates { field: String },
    #[error("treasury buffer {cents} cents must not be negative")]
    NegativeBuffer { cents: i64 },
    #[error("day `{field}` = {day} must be between 1 and 28")]
    InvalidDay { field: String, day: u32 },
    #[error("settings could not be parsed: {0}")]
    Parse(String),
}

/// Error type shared by the engines and the service layer.
#[derive(Debug, Error)]
pub enum FiscalError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No calculated result supplied for period {0}")]
    MissingPeriodResult(Period),
    #[error("Operation source failed: {0}")]
    Source(String),
    #[error("Operation source timed out after {elapsed_ms} ms")]
    SourceTimeout { elapsed_ms: u64 },
    #[error("Serialization error: {0}")]
    Serde(String),
}

pub type Result<T> = StdResult<T, FiscalError>;

impl From<serde_json::Error> for FiscalError {
    fn from(err: serde_json::Error) -> Self {
        FiscalError::Serde(err.to_string())
    }
}
