//! Error types for plan construction and projection

use thiserror::Error;

/// Problems detected while turning raw plan input into validated domain types.
///
/// These fail fast: no schedule is built from a plan that produces one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("projection_years must be a positive finite number, got {0}")]
    InvalidProjectionYears(f64),

    #[error("base_year {base_year} cannot carry a {projection_years}-year horizon")]
    InvalidBaseYear { base_year: i32, projection_years: f64 },

    #[error("{field} must be greater than -1, got {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("item '{item}' has no timing (start/end years, occurrence years, interval or one-time year)")]
    MissingTiming { item: String },

    #[error("item '{item}' declares more than one timing variant")]
    ConflictingTiming { item: String },

    #[error("item '{item}' has start_year {start} after end_year {end}")]
    InvertedYearRange { item: String, start: i32, end: i32 },

    #[error("item '{item}' has an empty occurrence year list")]
    EmptyOccurrences { item: String },

    #[error("item '{item}' needs either a unit cost or a cost range")]
    MissingCost { item: String },

    #[error("item '{item}' declares both a unit cost and a cost range")]
    ConflictingCost { item: String },

    #[error("item '{item}': {field} cannot be negative ({value})")]
    NegativeValue { item: String, field: &'static str, value: f64 },

    #[error("item '{item}' cost range low {low} exceeds high {high}")]
    InvertedCostRange { item: String, low: f64, high: f64 },

    #[error("item '{item}': {reason}")]
    InvalidDistribution { item: String, reason: String },

    #[error("item '{item}': {reason}")]
    InvalidInterval { item: String, reason: String },

    #[error("duplicate category name '{0}'")]
    DuplicateCategory(String),

    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("scenario '{0}' already exists")]
    DuplicateScenario(String),

    #[error("the baseline scenario cannot be {0}")]
    BaselineProtected(&'static str),

    #[error("{0}")]
    InvalidField(String),
}

/// Top-level error for the crate
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A growth or discount factor came out zero or non-finite.
    #[error("computation error: {0}")]
    Computation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid item CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
