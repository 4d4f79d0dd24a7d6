//! Shopwright: page-object end-to-end testing for the Automation Exercise
//! storefront.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   SHOPWRIGHT Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Page       │    │ Session    │            │
//! │   │ (journeys) │───►│ Objects    │───►│ + Driver   │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │         ▲                 │ expect          │                   │
//! │   ┌─────┴──────┐    ┌─────▼──────┐    ┌─────▼──────┐            │
//! │   │ Harness    │    │ Locators   │    │ Chromium / │            │
//! │   │ (sessions) │    │ (lazy)     │    │ Simulator  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every wait is a bounded poll. Locators resolve lazily and re-resolve on
//! every action, so page objects can be built before the page they describe
//! is loaded.

mod config;
mod dialog;
mod element;
mod expect;
mod fixture;
mod harness;
mod locator;
mod page_object;
mod reporter;
mod result;
mod session;
mod simulator;

/// Browser capability and its implementations
pub mod driver;

/// Page objects for each storefront page
pub mod pages;

/// The scenario catalogue
pub mod scenarios;

/// Bounded polling
pub mod wait;

pub use config::{RunConfig, ENV_BASE_URL, ENV_CHROMIUM_PATH, ENV_HEADLESS, ENV_WORKERS};
pub use dialog::{Dialog, DialogAction, DialogLog, DialogPolicy, DialogType};
pub use driver::mock::{MockDriver, MockSite};
#[cfg(feature = "browser")]
pub use driver::chromium::ChromiumDriver;
pub use driver::{BrowserConfig, Driver, ScreenshotTarget};
pub use element::ElementSet;
pub use expect::{expect, expect_page, ElementExpect, PageExpect};
pub use fixture::{unique_email, write_sample_attachment, ContactMessage, Title, UserFixture};
#[cfg(feature = "browser")]
pub use harness::ChromiumSessions;
pub use harness::{
    Journey, JourneyFn, LifecycleHooks, Scenario, ScenarioResult, ScenarioStatus, SessionFactory,
    SimulatorSessions, SuiteResults, TestHarness, TestSuite, TracingHooks,
};
pub use locator::{
    normalize_text, text_matches, ElementIndex, Locator, Selector, DEFAULT_TIMEOUT_MS,
};
pub use page_object::{PageObject, UrlMatcher};
pub use reporter::{render_json, render_junit, render_text, summary, write_report, ReportFormat};
pub use result::{E2eError, E2eResult, ErrorKind, PageState};
pub use session::{same_location, Session, SessionConfig, DEFAULT_BASE_URL};
pub use simulator::{Account, Product, StorefrontSimulator, CATALOGUE};
pub use wait::{poll_until, Probe, WaitOptions, WaitOutcome, DEFAULT_POLL_INTERVAL_MS};

/// Prelude for scenario authors
pub mod prelude {
    pub use super::pages::*;
    pub use super::{
        expect, expect_page, E2eError, E2eResult, Locator, PageObject, Scenario, Selector,
        Session, SessionConfig, UserFixture,
    };
}
