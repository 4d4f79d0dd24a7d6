//! Real Chromium over the Chrome `DevTools` Protocol.
//!
//! Each [`ChromiumDriver`] owns one browser process with a private profile
//! directory and a single page, so parallel sessions never share cookies.
//! The profile is a [`TempDir`]: it is removed on `close()` and also when the
//! driver is dropped without closing, e.g. when a run is cancelled.
//! Element primitives compile the selector to JavaScript with
//! [`Selector::to_js_all`] and act on the element at the requested index.
//! Clicks, uploads and element screenshots go through a CDP element handle,
//! found by tagging the target with a one-off attribute.

#![allow(clippy::significant_drop_tightening)]

use super::{BrowserConfig, Driver, ScreenshotTarget};
use crate::dialog::{Dialog, DialogLog, DialogPolicy, DialogType};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::PoisonError;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const TARGET_ATTRIBUTE: &str = "data-shopwright-target";
const EVAL_ATTEMPTS: usize = 3;
const PROFILE_PREFIX: &str = "shopwright-";

/// Chromium-backed driver
#[derive(Debug)]
pub struct ChromiumDriver {
    config: BrowserConfig,
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    dialogs: DialogLog,
    handler: JoinHandle<()>,
    dialog_task: JoinHandle<()>,
    closed: AtomicBool,
    profile_path: PathBuf,
    // Declared after `browser` so it is dropped after the process is killed
    profile: std::sync::Mutex<Option<TempDir>>,
}

fn new_profile() -> E2eResult<TempDir> {
    Ok(tempfile::Builder::new().prefix(PROFILE_PREFIX).tempdir()?)
}

impl ChromiumDriver {
    /// Launch a new browser instance with one blank page
    ///
    /// # Errors
    ///
    /// Returns a driver fault if the browser cannot be launched
    pub async fn launch(config: BrowserConfig) -> E2eResult<Self> {
        let profile = new_profile()?;

        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .user_data_dir(profile.path())
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-dev-shm-usage");

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| E2eError::driver(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| E2eError::driver(format!("failed to launch chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::driver(format!("failed to open page: {e}")))?;

        let dialogs = DialogLog::new();
        let mut events = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| E2eError::driver(format!("failed to watch dialogs: {e}")))?;
        let dialog_page = page.clone();
        let dialog_log = dialogs.clone();
        let dialog_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let dialog = dialog_log.handle(
                    DialogType::from_cdp(event.r#type.as_ref()),
                    event.message.clone(),
                );
                let params = HandleJavaScriptDialogParams::new(dialog.accepted());
                if let Err(e) = dialog_page.execute(params).await {
                    tracing::warn!(error = %e, "failed to answer dialog");
                }
            }
        });

        tracing::info!(
            headless = config.headless,
            profile = %profile.path().display(),
            "chromium launched"
        );

        Ok(Self {
            config,
            browser: Mutex::new(browser),
            page,
            dialogs,
            handler,
            dialog_task,
            closed: AtomicBool::new(false),
            profile_path: profile.path().to_path_buf(),
            profile: std::sync::Mutex::new(Some(profile)),
        })
    }

    /// Launch configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Private profile directory of this browser
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        &self.profile_path
    }

    fn remove_profile(&self) {
        let profile = self
            .profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(profile) = profile {
            if let Err(e) = profile.close() {
                tracing::warn!(error = %e, profile = %self.profile_path.display(), "failed to remove profile");
            }
        }
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(E2eError::driver("browser session is closed"));
        }
        Ok(())
    }

    /// Evaluate an expression, retrying while a navigation swaps the
    /// execution context.
    async fn eval<T: DeserializeOwned>(&self, js: String) -> E2eResult<T> {
        self.ensure_open()?;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.page.evaluate(js.as_str()).await {
                Ok(result) => {
                    return result
                        .into_value::<T>()
                        .map_err(|e| E2eError::driver(format!("unexpected script result: {e}")));
                }
                Err(e) if attempt < EVAL_ATTEMPTS && e.to_string().contains("context") => {
                    tracing::debug!(error = %e, attempt, "execution context changed, retrying");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Err(e) => return Err(E2eError::driver(format!("script failed: {e}"))),
            }
        }
    }

    /// Run a statement against the element at `index`; the body sees it as `el`
    /// and returns a status string.
    async fn with_element(
        &self,
        selector: &Selector,
        index: usize,
        action: &str,
        body: &str,
    ) -> E2eResult<String> {
        let js = format!(
            "(() => {{ const el = ({})[{index}]; if (!el) return 'missing'; {body} }})()",
            selector.to_js_all()
        );
        let status: String = self.eval(js).await?;
        if status == "missing" {
            return Err(missing(selector, index, action));
        }
        Ok(status)
    }

    async fn element_handle(
        &self,
        selector: &Selector,
        index: usize,
        action: &str,
    ) -> E2eResult<Element> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let body = format!(
            "el.scrollIntoView({{block: 'center'}}); el.setAttribute({TARGET_ATTRIBUTE:?}, {token:?}); return 'ok';"
        );
        self.with_element(selector, index, action, &body).await?;
        self.page
            .find_element(format!("[{TARGET_ATTRIBUTE}=\"{token}\"]"))
            .await
            .map_err(|_| missing(selector, index, action))
    }
}

fn missing(selector: &Selector, index: usize, action: &str) -> E2eError {
    E2eError::ElementNotFound {
        selector: format!("{selector} >> nth={index}"),
        action: action.to_string(),
        timeout_ms: 0,
    }
}

fn js_literal(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

#[async_trait]
impl Driver for ChromiumDriver {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.ensure_open()?;
        tracing::debug!(driver = "chromium", url, "goto");
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        self.ensure_open()?;
        let title = self
            .page
            .get_title()
            .await
            .map_err(|e| E2eError::driver(format!("failed to read title: {e}")))?;
        Ok(title.unwrap_or_default())
    }

    async fn url(&self) -> E2eResult<String> {
        self.ensure_open()?;
        let url = self
            .page
            .url()
            .await
            .map_err(|e| E2eError::driver(format!("failed to read url: {e}")))?;
        Ok(url.unwrap_or_default())
    }

    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        self.eval(format!("({}).length", selector.to_js_all())).await
    }

    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool> {
        self.eval(format!(
            "(() => {{ const el = ({})[{index}]; if (!el) return false; \
             const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
             return s.visibility !== 'hidden' && s.display !== 'none' && r.width > 0 && r.height > 0; }})()",
            selector.to_js_all()
        ))
        .await
    }

    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>> {
        self.eval(format!(
            "(() => {{ const el = ({})[{index}]; return el ? el.textContent : null; }})()",
            selector.to_js_all()
        ))
        .await
    }

    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        tracing::debug!(driver = "chromium", %selector, index, "click");
        let element = self.element_handle(selector, index, "click").await?;
        element
            .click()
            .await
            .map_err(|e| E2eError::driver(format!("click on {selector} failed: {e}")))?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, index: usize, value: &str) -> E2eResult<()> {
        tracing::debug!(driver = "chromium", %selector, index, "fill");
        let body = format!(
            "if (!('value' in el) || el.tagName === 'SELECT' || el.tagName === 'BUTTON') return 'not-fillable'; \
             el.focus(); el.value = {}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return 'ok';",
            js_literal(value)
        );
        match self.with_element(selector, index, "fill", &body).await?.as_str() {
            "ok" => Ok(()),
            _ => Err(E2eError::driver(format!("{selector} is not a fillable input"))),
        }
    }

    async fn check(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        tracing::debug!(driver = "chromium", %selector, index, "check");
        let body = "if (el.type !== 'checkbox' && el.type !== 'radio') return 'not-checkable'; \
                    if (!el.checked) el.click(); return el.checked ? 'ok' : 'unchanged';";
        match self.with_element(selector, index, "check", body).await?.as_str() {
            "ok" => Ok(()),
            "unchanged" => Err(E2eError::driver(format!("{selector} did not become checked"))),
            _ => Err(E2eError::driver(format!(
                "{selector} is not a checkbox or radio button"
            ))),
        }
    }

    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> E2eResult<()> {
        tracing::debug!(driver = "chromium", %selector, index, value, "select_option");
        let body = format!(
            "const v = {}; const opt = Array.from(el.options || []).find(o => o.value === v || o.label === v || o.text.trim() === v); \
             if (!opt) return 'no-option'; el.value = opt.value; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return 'ok';",
            js_literal(value)
        );
        match self
            .with_element(selector, index, "select_option", &body)
            .await?
            .as_str()
        {
            "ok" => Ok(()),
            _ => Err(E2eError::ElementNotFound {
                selector: format!("{selector} >> option={value:?}"),
                action: "select_option".to_string(),
                timeout_ms: 0,
            }),
        }
    }

    async fn set_input_files(
        &self,
        selector: &Selector,
        index: usize,
        files: &[PathBuf],
    ) -> E2eResult<()> {
        tracing::debug!(driver = "chromium", %selector, index, files = files.len(), "set_input_files");
        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            paths.push(file.canonicalize()?.to_string_lossy().into_owned());
        }
        let element = self.element_handle(selector, index, "set_input_files").await?;
        let params = SetFileInputFilesParams::builder()
            .files(paths)
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(|e| E2eError::driver(format!("invalid upload request: {e}")))?;
        self.page
            .execute(params)
            .await
            .map_err(|e| E2eError::driver(format!("upload to {selector} failed: {e}")))?;
        Ok(())
    }

    async fn screenshot(&self, target: &ScreenshotTarget) -> E2eResult<Vec<u8>> {
        self.ensure_open()?;
        tracing::debug!(driver = "chromium", target = target.label(), "screenshot");
        match target {
            ScreenshotTarget::Viewport | ScreenshotTarget::FullPage => {
                let params = ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(matches!(target, ScreenshotTarget::FullPage))
                    .build();
                self.page
                    .screenshot(params)
                    .await
                    .map_err(|e| E2eError::driver(format!("screenshot failed: {e}")))
            }
            ScreenshotTarget::Element { selector, index } => {
                let element = self.element_handle(selector, *index, "screenshot").await?;
                element
                    .screenshot(CaptureScreenshotFormat::Png)
                    .await
                    .map_err(|e| E2eError::driver(format!("screenshot of {selector} failed: {e}")))
            }
        }
    }

    fn set_dialog_policy(&self, policy: DialogPolicy) {
        self.dialogs.set_policy(policy);
    }

    fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.dialogs()
    }

    async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.dialog_task.abort();
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "failed to reap chromium process");
        }
        self.handler.abort();
        self.remove_profile();
        closed
            .map(|_| ())
            .map_err(|e| E2eError::driver(format!("failed to close chromium: {e}")))
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.dialog_task.abort();
        self.handler.abort();
    }
}
