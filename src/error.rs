//! Error taxonomy for loading census data.

use thiserror::Error;

/// Errors raised while turning a raw census resource into a series.
///
/// The split between [`LoadError::NotFound`] and [`LoadError::Read`]
/// matters for diagnostics: an absent resource is not retriable without
/// user intervention, while a read failure may be transient.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The resource does not exist: missing local path, HTTP 404, or a
    /// connection that could not be established at all.
    #[error("could not find census data at {source_id}")]
    NotFound { source_id: String },

    /// The resource exists but could not be read: permission denied,
    /// transient network fault, or a decode failure.
    #[error("could not retrieve census data from {source_id}: {reason}")]
    Read { source_id: String, reason: String },

    /// The resource was read but its contents do not match the expected
    /// schema. Names the offending column; not retriable.
    #[error("invalid data in {source_id}: column '{column}': {detail}")]
    InvalidData {
        source_id: String,
        column: String,
        detail: String,
    },
}

impl LoadError {
    pub fn invalid(source_id: &str, column: &str, detail: impl Into<String>) -> Self {
        LoadError::InvalidData {
            source_id: source_id.to_string(),
            column: column.to_string(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_names_source() {
        let err = LoadError::NotFound {
            source_id: "data/missing.csv".to_string(),
        };
        assert_eq!(err.to_string(), "could not find census data at data/missing.csv");
    }

    #[test]
    fn test_read_display() {
        let err = LoadError::Read {
            source_id: "data/fto.csv".to_string(),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/fto.csv"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_invalid_data_display_names_column() {
        let err = LoadError::invalid("data/fto.csv", "Population", "column not present");
        let msg = err.to_string();
        assert!(msg.contains("'Population'"));
        assert!(msg.contains("data/fto.csv"));
    }
}
