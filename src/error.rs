//! Error types for projection-morph

use thiserror::Error;

/// Result type alias for projection-morph operations
pub type Result<T> = std::result::Result<T, MorphError>;

/// Main error type for the animation pipeline
#[derive(Error, Debug)]
pub enum MorphError {
    #[error("Shape mismatch in '{name}': expected {expected} points, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MorphError {
    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl ToString,
        reason: &str,
    ) -> Self {
        MorphError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for MorphError {
    fn from(err: polars::error::PolarsError) -> Self {
        MorphError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for MorphError {
    fn from(err: serde_json::Error) -> Self {
        MorphError::SerializationError(err.to_string())
    }
}

impl From<image::ImageError> for MorphError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => MorphError::IoError(io),
            other => MorphError::EncodingError(other.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for MorphError {
    fn from(err: tempfile::PersistError) -> Self {
        MorphError::IoError(err.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MorphError::ShapeMismatch {
            name: "tsne".to_string(),
            expected: 10,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch in 'tsne': expected 10 points, got 12"
        );

        let err = MorphError::InsufficientData("need 2 embeddings".to_string());
        assert_eq!(err.to_string(), "Insufficient data: need 2 embeddings");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MorphError = io_err.into();
        assert!(matches!(err, MorphError::IoError(_)));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = MorphError::invalid_parameter("marker_opacity", 1.5, "must be in [0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: marker_opacity = 1.5, must be in [0, 1]"
        );
    }
}
