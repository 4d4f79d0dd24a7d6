//! Abstract browser capability.
//!
//! Page objects and verification never talk to a browser directly; they go
//! through a [`Driver`], which exposes only the primitives a user journey
//! needs. Two implementations exist:
//!
//! - [`ChromiumDriver`](chromium::ChromiumDriver): real Chromium over CDP
//!   (feature `browser`)
//! - [`MockDriver`](mock::MockDriver): scripted in-memory DOM for offline runs
//!   and tests
//!
//! Element primitives address a single element as `(selector, index)` where
//! `index` is a position in the ordered match list. Choosing the index
//! (first/nth/last, strictness) is the caller's job.

#[cfg(feature = "browser")]
pub mod chromium;
pub mod mock;

use crate::dialog::{Dialog, DialogPolicy};
use crate::locator::Selector;
use crate::result::E2eResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a screenshot should capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotTarget {
    /// The visible viewport
    Viewport,
    /// The whole scrollable page
    FullPage,
    /// A single element
    Element {
        /// Element selector
        selector: Selector,
        /// Position among the matches
        index: usize,
    },
}

impl ScreenshotTarget {
    /// Short label used in logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::FullPage => "full-page",
            Self::Element { .. } => "element",
        }
    }
}

/// Browser launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Browser capability used by sessions.
///
/// All methods take `&self`; implementations synchronize internally so a
/// session can be borrowed by several page objects at once.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Implementation name for logs
    fn name(&self) -> &'static str;

    /// Navigate to an absolute URL and wait for the load to finish
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Current document title
    async fn title(&self) -> E2eResult<String>;

    /// Current URL
    async fn url(&self) -> E2eResult<String>;

    /// Number of elements currently matching the selector
    async fn count(&self, selector: &Selector) -> E2eResult<usize>;

    /// Whether the element exists and is rendered visibly
    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool>;

    /// Text content of the element, `None` if it does not exist
    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>>;

    /// Click the element
    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()>;

    /// Replace the value of an input or textarea
    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> E2eResult<()>;

    /// Check a checkbox or radio button
    async fn check(&self, selector: &Selector, index: usize) -> E2eResult<()>;

    /// Select an option of a `<select>` by value or label
    async fn select_option(&self, selector: &Selector, index: usize, value: &str)
        -> E2eResult<()>;

    /// Attach files to a file input
    async fn set_input_files(
        &self,
        selector: &Selector,
        index: usize,
        files: &[PathBuf],
    ) -> E2eResult<()>;

    /// Capture a PNG screenshot
    async fn screenshot(&self, target: &ScreenshotTarget) -> E2eResult<Vec<u8>>;

    /// Decide how future native dialogs are answered
    fn set_dialog_policy(&self, policy: DialogPolicy);

    /// Dialogs seen so far
    fn dialogs(&self) -> Vec<Dialog>;

    /// Release the browser session; later calls fail with a driver fault
    async fn close(&self) -> E2eResult<()>;
}

/// Shared drivers: lets a caller keep a handle on a driver a session owns.
#[async_trait]
impl<D: Driver + ?Sized> Driver for std::sync::Arc<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        (**self).goto(url).await
    }

    async fn title(&self) -> E2eResult<String> {
        (**self).title().await
    }

    async fn url(&self) -> E2eResult<String> {
        (**self).url().await
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        (**self).count(selector).await
    }

    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool> {
        (**self).is_visible(selector, index).await
    }

    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>> {
        (**self).text_content(selector, index).await
    }

    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        (**self).click(selector, index).await
    }

    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> E2eResult<()> {
        (**self).fill(selector, index, value).await
    }

    async fn check(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        (**self).check(selector, index).await
    }

    async fn select_option(&self, selector: &Selector, index: usize, value: &str)
        -> E2eResult<()> {
        (**self).select_option(selector, index, value).await
    }

    async fn set_input_files(
        &self,
        selector: &Selector,
        index: usize,
        files: &[PathBuf],
    ) -> E2eResult<()> {
        (**self).set_input_files(selector, index, files).await
    }

    async fn screenshot(&self, target: &ScreenshotTarget) -> E2eResult<Vec<u8>> {
        (**self).screenshot(target).await
    }

    fn set_dialog_policy(&self, policy: DialogPolicy) {
        (**self).set_dialog_policy(policy);
    }

    fn dialogs(&self) -> Vec<Dialog> {
        (**self).dialogs()
    }

    async fn close(&self) -> E2eResult<()> {
        (**self).close().await
    }
}
