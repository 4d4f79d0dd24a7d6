//! One browser session owned by one scenario run.
//!
//! A [`Session`] pairs a [`Driver`] with the per-run settings every page
//! object needs: the site's base URL, wait budgets and the artifact
//! directory. Page objects borrow it; the harness owns it and closes it on
//! every exit path.

use crate::dialog::{Dialog, DialogPolicy};
use crate::driver::{Driver, ScreenshotTarget};
use crate::element::ElementSet;
use crate::locator::{Locator, DEFAULT_TIMEOUT_MS};
use crate::result::{E2eResult, PageState};
use crate::wait::DEFAULT_POLL_INTERVAL_MS;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Default target site
pub const DEFAULT_BASE_URL: &str = "https://automationexercise.com";

static SCREENSHOT_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Settings shared by everything running on a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    base_url: Url,
    /// Budget for locating an actionable element
    pub action_timeout: Duration,
    /// Budget for `expect` assertions
    pub expect_timeout: Duration,
    /// Delay between probes
    pub poll_interval: Duration,
    /// Where screenshots are written
    pub artifacts_dir: PathBuf,
}

impl SessionConfig {
    /// Create a config for `base_url` with default budgets
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL
    pub fn new(base_url: &str) -> E2eResult<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            action_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            expect_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            artifacts_dir: PathBuf::from("screenshots"),
        })
    }

    /// Set the action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set the expect timeout
    #[must_use]
    pub const fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Base URL of the site under test
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a site path
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined
    pub fn url_for(&self, path: &str) -> E2eResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Compare two URLs ignoring scheme, default ports and a trailing slash.
///
/// The demo site answers on both `http` and `https`, so journeys compare
/// locations rather than exact strings.
#[must_use]
pub fn same_location(a: &str, b: &str) -> bool {
    location_key(a) == location_key(b)
}

fn location_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let path = url.path().trim_end_matches('/');
            let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();
            format!(
                "{}{}{}",
                url.host_str().unwrap_or_default().trim_start_matches("www."),
                path,
                query
            )
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

/// A live browser session
#[derive(Debug)]
pub struct Session {
    id: String,
    driver: Box<dyn Driver>,
    config: SessionConfig,
}

impl Session {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, config: SessionConfig) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        tracing::debug!(session = %id, driver = driver.name(), "session opened");
        Self { id, driver, config }
    }

    /// Short identifier used in logs and artifact names
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Session settings
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Navigate to a path relative to the base URL (or an absolute URL)
    pub async fn goto(&self, path: &str) -> E2eResult<()> {
        let url = self.config.url_for(path)?;
        tracing::info!(session = %self.id, url = %url, "navigate");
        self.driver.goto(url.as_str()).await
    }

    /// Current document title
    pub async fn title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Current URL
    pub async fn url(&self) -> E2eResult<String> {
        self.driver.url().await
    }

    /// Whether the session is currently at `path` on the site
    pub async fn is_at(&self, path: &str) -> E2eResult<bool> {
        let expected = self.config.url_for(path)?;
        Ok(same_location(&self.url().await?, expected.as_str()))
    }

    /// Lazily bind a locator to this session; performs no I/O
    #[must_use]
    pub fn locate(&self, locator: &Locator) -> ElementSet<'_> {
        ElementSet::new(self, locator.clone())
    }

    /// Title and URL right now; unreadable fields are left empty
    pub async fn page_state(&self) -> PageState {
        PageState {
            title: self.driver.title().await.ok(),
            url: self.driver.url().await.ok(),
        }
    }

    /// Decide how native dialogs are answered from now on
    pub fn on_dialog(&self, policy: DialogPolicy) {
        self.driver.set_dialog_policy(policy);
    }

    /// Dialogs seen so far
    #[must_use]
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.driver.dialogs()
    }

    /// Capture a screenshot into the artifacts directory.
    ///
    /// Files are named `{unix millis}-{seq}-{name}.png`.
    pub async fn screenshot(&self, target: &ScreenshotTarget, name: &str) -> E2eResult<PathBuf> {
        let png = self.driver.screenshot(target).await?;
        let file_name = format!(
            "{}-{}-{}.png",
            chrono::Utc::now().timestamp_millis(),
            SCREENSHOT_SEQ.fetch_add(1, Ordering::Relaxed),
            name
        );
        let path = write_artifact(&self.config.artifacts_dir, &file_name, &png).await?;
        tracing::info!(
            session = %self.id,
            target = target.label(),
            path = %path.display(),
            bytes = png.len(),
            "screenshot saved"
        );
        Ok(path)
    }

    /// Release the browser session
    pub async fn close(&self) -> E2eResult<()> {
        tracing::debug!(session = %self.id, "session closing");
        self.driver.close().await
    }
}

async fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> E2eResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SessionConfig::new(DEFAULT_BASE_URL).unwrap();
            assert_eq!(config.action_timeout, Duration::from_secs(5));
            assert_eq!(config.artifacts_dir, PathBuf::from("screenshots"));
        }

        #[test]
        fn test_url_for_joins_paths() {
            let config = SessionConfig::new("https://automationexercise.com").unwrap();
            assert_eq!(
                config.url_for("/login").unwrap().as_str(),
                "https://automationexercise.com/login"
            );
            assert_eq!(
                config.url_for("product_details/2").unwrap().as_str(),
                "https://automationexercise.com/product_details/2"
            );
        }

        #[test]
        fn test_rejects_relative_base() {
            assert!(SessionConfig::new("automationexercise.com").is_err());
        }
    }

    mod location_tests {
        use super::*;

        #[test]
        fn test_scheme_and_trailing_slash_are_ignored() {
            assert!(same_location(
                "http://automationexercise.com/",
                "https://automationexercise.com"
            ));
            assert!(same_location(
                "https://www.automationexercise.com/login/",
                "https://automationexercise.com/login"
            ));
        }

        #[test]
        fn test_paths_differ() {
            assert!(!same_location(
                "https://automationexercise.com/login",
                "https://automationexercise.com/"
            ));
        }
    }
}
