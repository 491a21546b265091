use crate::config::MetricKey;

/// A single metric range that fails the well-formedness checks.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RangeError {
    #[error("bounds must be finite with min < max and a finite span, got [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },

    #[error("decimal_places is {decimal_places}, at most {max} is supported")]
    TooManyDecimalPlaces { decimal_places: usize, max: usize },

    #[error("zone list is empty")]
    NoZones,

    #[error("zone {index} is inverted: start {start} > end {end}")]
    InvertedZone { index: usize, start: f64, end: f64 },

    #[error("zone {index} starts at {start} but the previous zone ends at {previous_end}")]
    Discontinuous {
        index: usize,
        previous_end: f64,
        start: f64,
    },

    #[error("zones cover [{first_start}, {last_end}] instead of [{min}, {max}]")]
    Coverage {
        min: f64,
        max: f64,
        first_start: f64,
        last_end: f64,
    },
}

/// Failures while building or loading a reference table.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid range for {metric}: {source}")]
    InvalidRange {
        metric: MetricKey,
        #[source]
        source: RangeError,
    },

    #[error("reference table has no entry for {0}")]
    MissingMetric(MetricKey),

    #[error("unknown metric identifier: {0:?}")]
    UnknownMetric(String),

    #[error("failed to read reference table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse reference table: {0}")]
    Json(#[from] serde_json::Error),
}
