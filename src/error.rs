use thiserror::Error;

/// Errors raised while turning an upload into a dashboard.
///
/// Only `Parse` aborts a whole render pass. The other variants are caught by
/// the dashboard pipeline and degraded to a warning for the affected section.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Aggregation error on column '{column}': {reason}")]
    Aggregation { column: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn aggregation(column: &str, reason: impl Into<String>) -> Self {
        DashboardError::Aggregation {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
