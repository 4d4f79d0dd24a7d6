//! Test harness for running scenario suites.
//!
//! The harness owns every session: it opens one per scenario from a
//! [`SessionFactory`], runs the scenario, captures diagnostics on failure and
//! closes the session on every exit path (success, error or panic) before
//! the result is recorded. Up to `workers` scenarios run concurrently, each on
//! its own session; results are reported in suite order.

use crate::driver::ScreenshotTarget;
use crate::result::{E2eError, E2eResult, ErrorKind, PageState};
use crate::session::{Session, SessionConfig};
use crate::simulator::StorefrontSimulator;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One user journey.
///
/// A scenario signals success by returning `Ok(())`; the first error aborts
/// it. It must not depend on state left behind by other scenarios.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Unique name used for filtering and reports
    fn name(&self) -> &str;

    /// One-line summary
    fn description(&self) -> &str;

    /// Drive the journey on a fresh session
    async fn run(&self, session: &Session) -> E2eResult<()>;
}

/// Signature of a journey function
pub type JourneyFn = for<'a> fn(&'a Session) -> BoxFuture<'a, E2eResult<()>>;

/// Scenario backed by a plain function
#[derive(Clone, Copy)]
pub struct Journey {
    name: &'static str,
    description: &'static str,
    run: JourneyFn,
}

impl Journey {
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, run: JourneyFn) -> Self {
        Self {
            name,
            description,
            run,
        }
    }
}

impl fmt::Debug for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journey").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Scenario for Journey {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn run(&self, session: &Session) -> E2eResult<()> {
        (self.run)(session).await
    }
}

/// A test suite containing multiple scenarios
#[derive(Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    scenarios: Vec<Arc<dyn Scenario>>,
}

impl fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("scenarios", &self.names())
            .finish()
    }
}

impl TestSuite {
    /// Create a new test suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
        }
    }

    /// Register a scenario
    pub fn add(&mut self, scenario: impl Scenario + 'static) {
        self.scenarios.push(Arc::new(scenario));
    }

    /// Register a scenario, builder style
    #[must_use]
    pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
        self.add(scenario);
        self
    }

    /// Scenarios whose name contains `pattern`
    #[must_use]
    pub fn filter(&self, pattern: &str) -> Self {
        Self {
            name: self.name.clone(),
            scenarios: self
                .scenarios
                .iter()
                .filter(|s| s.name().contains(pattern))
                .cloned()
                .collect(),
        }
    }

    /// Registered scenarios in order
    #[must_use]
    pub fn scenarios(&self) -> &[Arc<dyn Scenario>] {
        &self.scenarios
    }

    /// Scenario names in order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    /// Get the number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

/// Outcome of a single scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    /// Not started because an earlier scenario failed in fail-fast mode
    Skipped,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    pub status: ScenarioStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Literal failure text
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    /// Title and URL when the scenario failed
    pub page_state: Option<PageState>,
    /// Screenshot captured on failure
    pub screenshot: Option<PathBuf>,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ScenarioStatus::Passed,
            duration: Duration::ZERO,
            error: None,
            error_kind: None,
            page_state: None,
            screenshot: None,
        }
    }

    /// Create a failing result from an error
    #[must_use]
    pub fn fail(name: impl Into<String>, error: &E2eError) -> Self {
        Self {
            status: ScenarioStatus::Failed,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            page_state: error.page_state().cloned(),
            ..Self::pass(name)
        }
    }

    /// Create a failing result from a panic message
    #[must_use]
    pub fn panicked(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ScenarioStatus::Failed,
            error: Some(format!("scenario panicked: {}", message.into())),
            ..Self::pass(name)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            status: ScenarioStatus::Skipped,
            ..Self::pass(name)
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Results from running a test suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results in suite order
    pub results: Vec<ScenarioResult>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    /// Count skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    fn count(&self, status: ScenarioStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results
            .iter()
            .filter(|r| r.status == ScenarioStatus::Failed)
            .collect()
    }

    /// Process exit code: 0 when every scenario passed
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }
}

/// Side-effect-only callbacks around a suite run.
///
/// Hooks never own scenario state. `before_each`/`after_each` may be called
/// concurrently from several scenarios.
pub trait LifecycleHooks: Send + Sync {
    fn before_all(&self, _suite: &TestSuite) {}
    fn before_each(&self, _scenario: &str) {}
    fn after_each(&self, _result: &ScenarioResult) {}
    fn after_all(&self, _results: &SuiteResults) {}
}

/// Hooks that log the suite lifecycle
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl LifecycleHooks for TracingHooks {
    fn before_all(&self, suite: &TestSuite) {
        tracing::info!(suite = %suite.name, scenarios = suite.len(), "before all");
    }

    fn before_each(&self, scenario: &str) {
        tracing::info!(scenario, "before each");
    }

    fn after_each(&self, result: &ScenarioResult) {
        tracing::info!(
            scenario = %result.name,
            status = ?result.status,
            duration_ms = result.duration.as_millis() as u64,
            "after each"
        );
    }

    fn after_all(&self, results: &SuiteResults) {
        tracing::info!(
            suite = %results.suite_name,
            passed = results.passed_count(),
            failed = results.failed_count(),
            skipped = results.skipped_count(),
            "after all"
        );
    }
}

/// Opens a fresh session per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Factory name for logs
    fn name(&self) -> &'static str;

    /// Open a new, independent session
    async fn open(&self) -> E2eResult<Session>;
}

/// Sessions on the in-memory storefront; all share one simulator
#[derive(Debug, Clone)]
pub struct SimulatorSessions {
    site: Arc<StorefrontSimulator>,
    config: SessionConfig,
}

impl SimulatorSessions {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_site(Arc::new(StorefrontSimulator::new()), config)
    }

    #[must_use]
    pub const fn with_site(site: Arc<StorefrontSimulator>, config: SessionConfig) -> Self {
        Self { site, config }
    }

    /// The shared storefront
    #[must_use]
    pub fn site(&self) -> &Arc<StorefrontSimulator> {
        &self.site
    }
}

#[async_trait]
impl SessionFactory for SimulatorSessions {
    fn name(&self) -> &'static str {
        "simulator"
    }

    async fn open(&self) -> E2eResult<Session> {
        let site: Arc<dyn crate::driver::mock::MockSite> = self.site.clone();
        let driver = crate::driver::mock::MockDriver::new(site);
        Ok(Session::new(Box::new(driver), self.config.clone()))
    }
}

/// Sessions on a freshly launched Chromium each
#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct ChromiumSessions {
    browser: crate::driver::BrowserConfig,
    config: SessionConfig,
}

#[cfg(feature = "browser")]
impl ChromiumSessions {
    #[must_use]
    pub const fn new(browser: crate::driver::BrowserConfig, config: SessionConfig) -> Self {
        Self { browser, config }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionFactory for ChromiumSessions {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn open(&self) -> E2eResult<Session> {
        let driver = crate::driver::chromium::ChromiumDriver::launch(self.browser.clone()).await?;
        Ok(Session::new(Box::new(driver), self.config.clone()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Test harness for running suites
pub struct TestHarness {
    /// Whether to stop starting scenarios after the first failure
    pub fail_fast: bool,
    /// Maximum number of concurrent scenarios
    pub workers: usize,
    /// Capture a full-page screenshot before closing a failed session
    pub screenshot_on_failure: bool,
    hooks: Vec<Arc<dyn LifecycleHooks>>,
}

impl fmt::Debug for TestHarness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestHarness")
            .field("fail_fast", &self.fail_fast)
            .field("workers", &self.workers)
            .field("screenshot_on_failure", &self.screenshot_on_failure)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            fail_fast: false,
            workers: 1,
            screenshot_on_failure: true,
            hooks: Vec::new(),
        }
    }
}

impl TestHarness {
    /// Create a new sequential harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run up to `workers` scenarios at once
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Enable or disable failure screenshots
    #[must_use]
    pub const fn with_failure_screenshots(mut self, enabled: bool) -> Self {
        self.screenshot_on_failure = enabled;
        self
    }

    /// Add lifecycle hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    /// Run a test suite
    pub async fn run(&self, suite: &TestSuite, factory: &dyn SessionFactory) -> SuiteResults {
        let start = Instant::now();
        tracing::info!(
            suite = %suite.name,
            scenarios = suite.len(),
            workers = self.workers,
            sessions = factory.name(),
            "suite started"
        );
        for hook in &self.hooks {
            hook.before_all(suite);
        }

        let stop = AtomicBool::new(false);
        let stop = &stop;
        let mut indexed: Vec<(usize, ScenarioResult)> =
            stream::iter(suite.scenarios().iter().enumerate())
                .map(|(index, scenario)| async move {
                    let result = if self.fail_fast && stop.load(Ordering::SeqCst) {
                        let skipped = ScenarioResult::skipped(scenario.name());
                        self.notify_after_each(&skipped);
                        skipped
                    } else {
                        self.run_scenario(scenario.as_ref(), factory).await
                    };
                    if result.status == ScenarioStatus::Failed {
                        stop.store(true, Ordering::SeqCst);
                    }
                    (index, result)
                })
                .buffer_unordered(self.workers.max(1))
                .collect()
                .await;
        indexed.sort_by_key(|(index, _)| *index);

        let results = SuiteResults {
            suite_name: suite.name.clone(),
            results: indexed.into_iter().map(|(_, result)| result).collect(),
            duration: start.elapsed(),
        };
        for hook in &self.hooks {
            hook.after_all(&results);
        }
        results
    }

    fn notify_after_each(&self, result: &ScenarioResult) {
        for hook in &self.hooks {
            hook.after_each(result);
        }
    }

    /// Run one scenario on its own session
    pub async fn run_scenario(
        &self,
        scenario: &dyn Scenario,
        factory: &dyn SessionFactory,
    ) -> ScenarioResult {
        let name = scenario.name();
        for hook in &self.hooks {
            hook.before_each(name);
        }
        let start = Instant::now();

        let result = match factory.open().await {
            Ok(session) => {
                let result = self.drive(scenario, &session).await;
                if let Err(err) = session.close().await {
                    tracing::warn!(scenario = name, error = %err, "failed to close session");
                }
                result
            }
            Err(err) => {
                tracing::warn!(scenario = name, error = %err, "failed to open session");
                ScenarioResult::fail(name, &err)
            }
        }
        .with_duration(start.elapsed());

        self.notify_after_each(&result);
        result
    }

    async fn drive(&self, scenario: &dyn Scenario, session: &Session) -> ScenarioResult {
        let name = scenario.name();
        let outcome = AssertUnwindSafe(scenario.run(session)).catch_unwind().await;
        let mut result = match outcome {
            Ok(Ok(())) => return ScenarioResult::pass(name),
            Ok(Err(err)) => {
                tracing::warn!(scenario = name, kind = %err.kind(), error = %err, "scenario failed");
                ScenarioResult::fail(name, &err)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(scenario = name, %message, "scenario panicked");
                ScenarioResult::panicked(name, message)
            }
        };

        if result.page_state.is_none() {
            result.page_state = Some(session.page_state().await);
        }
        if self.screenshot_on_failure {
            match session
                .screenshot(&ScreenshotTarget::FullPage, &format!("failure-{name}"))
                .await
            {
                Ok(path) => result.screenshot = Some(path),
                Err(err) => {
                    tracing::warn!(scenario = name, error = %err, "failure screenshot not captured");
                }
            }
        }
        result
    }
}
