//! Result and error types for Shopwright.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for Shopwright operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Title and URL of the page at the moment something went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Document title, if it could be read
    pub title: Option<String>,
    /// Current URL, if it could be read
    pub url: Option<String>,
}

impl PageState {
    /// Create a page state snapshot
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "title={:?}, url={:?}",
            self.title.as_deref().unwrap_or("<unknown>"),
            self.url.as_deref().unwrap_or("<unknown>")
        )
    }
}

/// Coarse error classification used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No element matched within the wait budget
    ElementNotFound,
    /// An unnarrowed locator matched several elements
    StrictModeViolation,
    /// An expected visible state did not hold
    AssertionFailed,
    /// The site reported that the resource already exists
    DuplicateResource,
    /// The browser session crashed, disconnected or failed to launch
    DriverFault,
    /// Navigation failed
    Navigation,
    /// Bad configuration or fixture
    Config,
    /// I/O or serialization failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ElementNotFound => "element-not-found",
            Self::StrictModeViolation => "strict-mode-violation",
            Self::AssertionFailed => "assertion-failed",
            Self::DuplicateResource => "duplicate-resource",
            Self::DriverFault => "driver-fault",
            Self::Navigation => "navigation",
            Self::Config => "config",
            Self::Io => "io",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in Shopwright
#[derive(Debug, Error)]
pub enum E2eError {
    /// A locator matched zero elements within the wait budget
    #[error("Element not found: {selector} (action: {action}, waited {timeout_ms}ms)")]
    ElementNotFound {
        /// Description of the locator
        selector: String,
        /// Action that was attempted
        action: String,
        /// Wait budget in milliseconds
        timeout_ms: u64,
    },

    /// An unnarrowed locator matched more than one element
    #[error("Strict mode violation: {selector} resolved to {count} elements (action: {action})")]
    StrictModeViolation {
        /// Description of the locator
        selector: String,
        /// Action that was attempted
        action: String,
        /// Number of matches
        count: usize,
    },

    /// An expected visible state did not hold
    #[error("Assertion failed: expected {expectation}, got {actual} [{page}]")]
    AssertionFailed {
        /// What was expected
        expectation: String,
        /// What was observed
        actual: String,
        /// Page state at failure time
        page: PageState,
    },

    /// The site reported that the resource already exists
    #[error("Duplicate {resource}: {message}")]
    DuplicateResource {
        /// Kind of resource (e.g. "account")
        resource: String,
        /// Message shown by the site
        message: String,
    },

    /// Browser session crashed, disconnected or could not be launched
    #[error("Driver fault: {message}")]
    DriverFault {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid title or URL pattern
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl E2eError {
    /// Create a driver fault
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverFault {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Self::StrictModeViolation { .. } => ErrorKind::StrictModeViolation,
            Self::AssertionFailed { .. } => ErrorKind::AssertionFailed,
            Self::DuplicateResource { .. } => ErrorKind::DuplicateResource,
            Self::DriverFault { .. } => ErrorKind::DriverFault,
            Self::Navigation { .. } => ErrorKind::Navigation,
            Self::Config { .. } | Self::Url(_) | Self::Pattern(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => ErrorKind::Io,
        }
    }

    /// Page state attached to the error, if any
    #[must_use]
    pub const fn page_state(&self) -> Option<&PageState> {
        match self {
            Self::AssertionFailed { page, .. } => Some(page),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_names_selector_and_action() {
        let err = E2eError::ElementNotFound {
            selector: "css=#missing".to_string(),
            action: "click".to_string(),
            timeout_ms: 250,
        };
        let text = err.to_string();
        assert!(text.contains("css=#missing"));
        assert!(text.contains("click"));
        assert!(text.contains("250ms"));
        assert_eq!(err.kind(), ErrorKind::ElementNotFound);
    }

    #[test]
    fn test_assertion_failed_carries_page_state() {
        let err = E2eError::AssertionFailed {
            expectation: "title \"Automation Exercise\"".to_string(),
            actual: "\"Oops\"".to_string(),
            page: PageState::new("Oops", "https://automationexercise.com/login"),
        };
        assert!(err.to_string().contains("/login"));
        assert_eq!(
            err.page_state().and_then(|p| p.title.as_deref()),
            Some("Oops")
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(E2eError::driver("gone").kind(), ErrorKind::DriverFault);
        assert_eq!(E2eError::config("bad").kind(), ErrorKind::Config);
        let io: E2eError = std::io::Error::new(std::io::ErrorKind::NotFound, "x").into();
        assert_eq!(io.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_unknown_page_state_display() {
        let state = PageState::default();
        assert_eq!(state.to_string(), "title=\"<unknown>\", url=\"<unknown>\"");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::DuplicateResource.to_string(), "duplicate-resource");
    }
}
