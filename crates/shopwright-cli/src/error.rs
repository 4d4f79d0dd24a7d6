//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// A browser run was requested from a build without Chromium support
    #[error("Browser support not compiled in; rebuild with --features browser or pass --offline")]
    BrowserUnavailable,

    /// The run was cancelled with Ctrl-C
    #[error("Interrupted")]
    Interrupted,

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shopwright library error
    #[error(transparent)]
    Shopwright(#[from] shopwright::E2eError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for this error: 130 after Ctrl-C, 2 otherwise
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => 130,
            _ => 2,
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_library_errors_pass_through() {
        let err: CliError = shopwright::E2eError::config("workers must be at least 1").into();
        assert!(err.to_string().contains("workers must be at least 1"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Interrupted.exit_code(), 130);
        assert_eq!(CliError::config("bad").exit_code(), 2);
        assert_eq!(CliError::BrowserUnavailable.exit_code(), 2);
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = CliError::invalid_argument("no journey matches \"checkout\"");
        assert_eq!(
            err.to_string(),
            "Invalid argument: no journey matches \"checkout\""
        );
    }
}
