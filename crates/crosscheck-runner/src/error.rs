//! Error types for crosscheck-runner

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or reporting a run.
///
/// Divergences and hangs are *not* errors; they are the run's verdict.
/// Harness programming errors (malformed registry use, double resolution)
/// panic immediately instead of surfacing here.
#[derive(Debug, Error)]
pub enum Error {
    /// Run configuration failed validation
    #[error("Invalid run configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = Error::InvalidConfig("command_budget must be positive".to_string());
        assert!(err.to_string().contains("Invalid run configuration"));
        assert!(err.to_string().contains("command_budget"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [unclosed").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(err.to_string().contains("YAML error"));
    }
}
