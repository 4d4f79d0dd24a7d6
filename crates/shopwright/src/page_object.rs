//! Page object contract.
//!
//! A page object is any type that binds a [`Session`] to a fixed set of
//! [`Locator`]s and exposes two kinds of methods:
//!
//! - `verify_*` methods that only read the page and fail with an
//!   [`E2eError`](crate::result::E2eError) when an expectation does not hold
//! - action methods that perform exactly one user action (click, fill,
//!   select, check, upload) and leave the session wherever that action lands
//!
//! There is no base struct. [`PageObject`] is a capability contract with a
//! couple of provided checks built on top of it.
//!
//! ```ignore
//! let login = LoginSignupPage::new(&session);
//! login.verify_login_visible().await?;
//! login.fill_login_email(&user.email).await?;
//! ```

use crate::expect::expect;
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use url::Url;

/// Capability contract shared by every page object.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Session this page object drives
    fn session(&self) -> &Session;

    /// Human readable page name for logs and reports
    fn page_name(&self) -> &'static str;

    /// URL path pattern of the page (e.g. `/login`, `/product_details/:id`)
    fn url_pattern(&self) -> &str;

    /// Element whose visibility proves the page is displayed
    fn landmark(&self) -> &Locator;

    /// Every locator the page object owns, by logical name
    fn locators(&self) -> Vec<(&'static str, &Locator)>;

    /// Wait until the landmark is visible
    async fn verify_loaded(&self) -> E2eResult<()> {
        tracing::debug!(page = self.page_name(), "verify loaded");
        expect(self.session().locate(self.landmark()))
            .to_be_visible()
            .await
    }

    /// Whether the session's current URL matches [`Self::url_pattern`]
    async fn is_current(&self) -> E2eResult<bool> {
        let url = self.session().url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(&url))
    }
}

/// URL path matcher for page objects.
///
/// Accepts absolute URLs as well as bare paths; only the path is compared,
/// so scheme, host and query never matter.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

fn path_segments(url: &str) -> Vec<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl UrlMatcher {
    /// Create a matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/login`
    /// - Wildcards: `/product_details/*`
    /// - Named parameters: `/product_details/:id`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments = path_segments(url);

        // wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(&url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        if !self.matches(url) {
            return HashMap::new();
        }
        self.segments
            .iter()
            .zip(path_segments(url))
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value)),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
