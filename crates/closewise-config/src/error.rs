//! # Config Error Types
//!
//! Errors raised while loading jurisdiction profiles from disk.

use std::path::PathBuf;
use thiserror::Error;

use closewise_core::EngineError;

/// Errors from the profile-loading layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile directory (or a file in it) could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A profile file is not valid JSON for the profile schema.
    #[error("failed to parse profile {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A parsed profile failed engine-level validation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Convenience type alias for Results with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_file() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::Parse {
            file: "pa.json".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("failed to parse profile pa.json"));
    }
}
