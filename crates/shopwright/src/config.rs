//! Run configuration.
//!
//! Settings are layered: defaults, then an optional YAML file, then
//! environment variables. The CLI applies its flags last.

use crate::driver::BrowserConfig;
use crate::locator::DEFAULT_TIMEOUT_MS;
use crate::result::{E2eError, E2eResult};
use crate::session::{SessionConfig, DEFAULT_BASE_URL};
use crate::wait::DEFAULT_POLL_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "SHOPWRIGHT_BASE_URL";
/// Environment variable overriding headless mode (`true`/`false`/`1`/`0`)
pub const ENV_HEADLESS: &str = "SHOPWRIGHT_HEADLESS";
/// Environment variable pointing at a Chromium binary
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";
/// Environment variable overriding the worker count
pub const ENV_WORKERS: &str = "SHOPWRIGHT_WORKERS";

/// Everything a suite run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Site under test
    pub base_url: String,
    /// Run Chromium without a window
    pub headless: bool,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Chromium sandbox; disable inside containers
    pub sandbox: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Concurrent scenarios, each on its own session
    pub workers: usize,
    /// Stop starting scenarios after the first failure
    pub fail_fast: bool,
    /// Run against the in-memory storefront instead of a browser
    pub offline: bool,
    pub action_timeout_ms: u64,
    pub expect_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Screenshots and attachments go here
    pub artifacts_dir: PathBuf,
    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let browser = BrowserConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: browser.headless,
            chromium_path: None,
            sandbox: browser.sandbox,
            viewport_width: browser.viewport_width,
            viewport_height: browser.viewport_height,
            workers: 1,
            fail_fast: false,
            offline: false,
            action_timeout_ms: DEFAULT_TIMEOUT_MS,
            expect_timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            artifacts_dir: PathBuf::from("screenshots"),
            screenshot_on_failure: true,
        }
    }
}

fn parse_bool(name: &str, raw: &str) -> E2eResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::config(format!("{name}: expected a boolean, got {other:?}"))),
    }
}

impl RunConfig {
    /// Load defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.with_env(|name| std::env::var(name).ok())
    }

    /// Read a YAML config file; missing keys keep their defaults
    pub fn from_yaml_file(path: &Path) -> E2eResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective configuration
    pub fn to_yaml(&self) -> E2eResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> E2eResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_HEADLESS) {
            self.headless = parse_bool(ENV_HEADLESS, &raw)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            self.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_WORKERS) {
            self.workers = raw.trim().parse().map_err(|_| {
                E2eError::config(format!("{ENV_WORKERS}: expected a number, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings no run can use
    pub fn validate(&self) -> E2eResult<()> {
        if self.workers == 0 {
            return Err(E2eError::config("workers must be at least 1"));
        }
        if self.action_timeout_ms == 0 || self.expect_timeout_ms == 0 {
            return Err(E2eError::config("timeouts must be positive"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| E2eError::config(format!("base_url {:?}: {e}", self.base_url)))?;
        Ok(())
    }

    /// Session settings derived from this run
    pub fn session_config(&self) -> E2eResult<SessionConfig> {
        Ok(SessionConfig::new(&self.base_url)?
            .with_action_timeout(Duration::from_millis(self.action_timeout_ms))
            .with_expect_timeout(Duration::from_millis(self.expect_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_artifacts_dir(&self.artifacts_dir))
    }

    /// Chromium launch settings derived from this run
    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        let mut browser = BrowserConfig::default()
            .with_headless(self.headless)
            .with_viewport(self.viewport_width, self.viewport_height);
        if let Some(path) = &self.chromium_path {
            browser = browser.with_chromium_path(path);
        }
        if !self.sandbox {
            browser = browser.with_no_sandbox();
        }
        browser
    }
}
