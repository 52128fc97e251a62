//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the dupehash application.
///
/// - 0: Success (scan completed, with or without duplicates)
/// - 1: General error (unexpected failure)
/// - 2: Configuration error (rejected before scanning started)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Configuration error: Invalid settings, nothing was scanned.
    ConfigError = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DH000",
            Self::GeneralError => "DH001",
            Self::ConfigError => "DH002",
        }
    }

    /// Pick the exit code for a fatal error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<crate::config::ConfigError>().is_some() {
            Self::ConfigError
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DH001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::ConfigError.as_i32(), 2);
        assert_eq!(ExitCode::ConfigError.code_prefix(), "DH002");
    }

    #[test]
    fn test_config_errors_map_to_config_exit() {
        let err = anyhow::Error::new(ConfigError::InvalidWorkerCount(0));
        assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);

        let err = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_structured_error_serializes() {
        let err = anyhow::Error::new(ConfigError::InvalidWorkerCount(-3));
        let structured = StructuredError::new(&err, ExitCode::ConfigError);
        let json = serde_json::to_string(&structured).unwrap();

        assert!(json.contains("\"code\":\"DH002\""));
        assert!(json.contains("\"exit_code\":2"));
        assert!(json.contains("must be >= 1"));
    }
}
