//! Error type shared across the crate.

/// Recoverable failures raised while building instruments or running optimizations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("instrument needs at least two bore points, found {0}")]
    TooFewBorePoints(usize),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("lower bound {lower} exceeds upper bound {upper} in dimension {dimension}")]
    InvertedBounds {
        dimension: usize,
        lower: f64,
        upper: f64,
    },
    #[error("optimization bounds have not been set")]
    MissingBounds,
    #[error("objective function has no dimensions to optimize")]
    NoDimensions,
    #[error("invalid search band: {0}")]
    InvalidSearchBand(String),
    #[error("fingering {name:?} has {actual} hole states, instrument has {expected} holes")]
    FingeringMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid physical parameters: {0}")]
    InvalidPhysicalParameters(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
