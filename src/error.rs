//! Error types for the multilevel-power library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum PowerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Variance cannot be less than 0 ({context}: {value})")]
    NegativeVariance { context: String, value: f64 },

    #[error("Design {design} requires a unit count for level {level}")]
    MissingUnits { design: String, level: String },

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, PowerError>;
