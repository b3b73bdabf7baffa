//! Error types for the catplot crate

use thiserror::Error;

/// Errors that can occur when rendering a chart
#[derive(Error, Debug)]
pub enum ChartError {
    /// Series, categories or palette do not satisfy the render preconditions
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Stacked bar series were assigned to both axes
    #[error("All stacked bar series must be either primary or secondary")]
    MixedStackedAxes,

    /// The zero rows of the two y-axes disagree after reconciliation
    #[error("Secondary y-axis not aligned with primary y-axis: {secondary} != {primary}")]
    AxisMisaligned { primary: f64, secondary: f64 },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::Serialization(err.to_string())
    }
}

/// Result type for chart operations
pub type ChartResult<T> = Result<T, ChartError>;
