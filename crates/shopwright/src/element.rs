//! Lazily resolved element sets.
//!
//! An [`ElementSet`] is a [`Locator`] bound to a [`Session`]. Nothing is
//! resolved until an action or query runs, and every call resolves again, so
//! an element set never goes stale across navigations.
//!
//! Interactions wait until the target exists and is visible. Zero matches
//! after the budget is an `ElementNotFound`; an unnarrowed strict set with
//! several matches is a `StrictModeViolation`.

use crate::driver::{Driver, ScreenshotTarget};
use crate::locator::{ElementIndex, Locator, Selector};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::{poll_until, Probe, WaitOptions, WaitOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// A locator bound to a session
#[derive(Debug, Clone)]
pub struct ElementSet<'s> {
    session: &'s Session,
    locator: Locator,
}

struct Target<'a> {
    driver: &'a dyn Driver,
    selector: &'a Selector,
    index: ElementIndex,
    strict: bool,
    description: String,
}

async fn probe_actionable(target: &Target<'_>, action: &str) -> E2eResult<Probe<usize>> {
    let count = target.driver.count(target.selector).await?;
    if count == 0 {
        return Ok(Probe::NotYet("no matching elements".to_string()));
    }
    if target.strict && count > 1 {
        return Err(E2eError::StrictModeViolation {
            selector: target.description.clone(),
            action: action.to_string(),
            count,
        });
    }
    let Some(position) = target.index.resolve(count) else {
        return Ok(Probe::NotYet(format!("only {count} matching elements")));
    };
    if target.driver.is_visible(target.selector, position).await? {
        Ok(Probe::Done(position))
    } else {
        Ok(Probe::NotYet("element is hidden".to_string()))
    }
}

async fn probe_attached(target: &Target<'_>, action: &str) -> E2eResult<Probe<usize>> {
    let count = target.driver.count(target.selector).await?;
    if target.strict && count > 1 {
        return Err(E2eError::StrictModeViolation {
            selector: target.description.clone(),
            action: action.to_string(),
            count,
        });
    }
    Ok(match target.index.resolve(count) {
        Some(position) => Probe::Done(position),
        None => Probe::NotYet(format!("{count} matching elements")),
    })
}

async fn probe_hidden(target: &Target<'_>) -> E2eResult<Probe<()>> {
    let count = target.driver.count(target.selector).await?;
    let Some(position) = target.index.resolve(count) else {
        return Ok(Probe::Done(()));
    };
    if target.driver.is_visible(target.selector, position).await? {
        Ok(Probe::NotYet("element is visible".to_string()))
    } else {
        Ok(Probe::Done(()))
    }
}

impl<'s> ElementSet<'s> {
    pub(crate) const fn new(session: &'s Session, locator: Locator) -> Self {
        Self { session, locator }
    }

    /// Locator this set resolves
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Session this set is bound to
    #[must_use]
    pub const fn session(&self) -> &'s Session {
        self.session
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(&self) -> Self {
        Self::new(self.session, self.locator.clone().first())
    }

    /// Narrow to the zero-based n-th match
    #[must_use]
    pub fn nth(&self, n: usize) -> Self {
        Self::new(self.session, self.locator.clone().nth(n))
    }

    /// Narrow to the last match
    #[must_use]
    pub fn last(&self) -> Self {
        Self::new(self.session, self.locator.clone().last())
    }

    /// Wait budget for interactions on this set
    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        self.locator
            .timeout()
            .unwrap_or(self.session.config().action_timeout)
    }

    fn wait_options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(self.session.config().poll_interval.as_millis() as u64)
    }

    fn target(&self) -> Target<'_> {
        Target {
            driver: self.session.driver(),
            selector: self.locator.selector(),
            index: self.locator.index(),
            strict: self.locator.is_strict(),
            description: self.locator.to_string(),
        }
    }

    fn not_found(&self, action: &str, timeout: Duration) -> E2eError {
        E2eError::ElementNotFound {
            selector: self.locator.to_string(),
            action: action.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Wait until the target exists and is visible; returns its position
    async fn actionable(&self, action: &str) -> E2eResult<usize> {
        let timeout = self.action_timeout();
        let target = self.target();
        let target = &target;
        let outcome =
            poll_until(self.wait_options(timeout), move || probe_actionable(target, action))
                .await?;
        match outcome {
            WaitOutcome::Ready { value, .. } => Ok(value),
            WaitOutcome::TimedOut { last_observed, .. } => {
                tracing::debug!(
                    session = %self.session.id(),
                    locator = %self.locator,
                    action,
                    last_observed,
                    "element not actionable"
                );
                Err(self.not_found(action, timeout))
            }
        }
    }

    /// Number of elements currently matching, without waiting
    pub async fn count(&self) -> E2eResult<usize> {
        self.session.driver().count(self.locator.selector()).await
    }

    /// Whether the target is visible right now, without waiting.
    ///
    /// A missing element is simply not visible.
    pub async fn is_visible(&self) -> E2eResult<bool> {
        let target = self.target();
        let count = target.driver.count(target.selector).await?;
        if target.strict && count > 1 {
            return Err(E2eError::StrictModeViolation {
                selector: target.description,
                action: "is_visible".to_string(),
                count,
            });
        }
        match target.index.resolve(count) {
            Some(position) => target.driver.is_visible(target.selector, position).await,
            None => Ok(false),
        }
    }

    /// Text content of the target, waiting for it to exist
    pub async fn text_content(&self) -> E2eResult<String> {
        let timeout = self.action_timeout();
        let target = self.target();
        let target = &target;
        let outcome = poll_until(self.wait_options(timeout), move || {
            probe_attached(target, "text_content")
        })
        .await?;
        let position = match outcome {
            WaitOutcome::Ready { value, .. } => value,
            WaitOutcome::TimedOut { .. } => return Err(self.not_found("text_content", timeout)),
        };
        Ok(self
            .session
            .driver()
            .text_content(self.locator.selector(), position)
            .await?
            .unwrap_or_default())
    }

    /// Text content of the target right now, `None` if it does not exist
    pub async fn current_text(&self) -> E2eResult<Option<String>> {
        let target = self.target();
        match probe_attached(&target, "text_content").await? {
            Probe::Done(position) => {
                target
                    .driver
                    .text_content(target.selector, position)
                    .await
            }
            Probe::NotYet(_) => Ok(None),
        }
    }

    /// Text content of every match, without waiting
    pub async fn all_text_contents(&self) -> E2eResult<Vec<String>> {
        let driver = self.session.driver();
        let selector = self.locator.selector();
        let count = driver.count(selector).await?;
        let mut texts = Vec::with_capacity(count);
        for position in 0..count {
            texts.push(driver.text_content(selector, position).await?.unwrap_or_default());
        }
        Ok(texts)
    }

    /// Wait until the target is visible
    pub async fn wait_for_visible(&self) -> E2eResult<()> {
        self.actionable("wait_for_visible").await.map(|_| ())
    }

    /// Wait until the target is hidden or gone
    pub async fn wait_for_hidden(&self) -> E2eResult<()> {
        let timeout = self.action_timeout();
        let target = self.target();
        let target = &target;
        let outcome = poll_until(self.wait_options(timeout), move || probe_hidden(target)).await?;
        if outcome.is_ready() {
            Ok(())
        } else {
            Err(E2eError::AssertionFailed {
                expectation: format!("{} to be hidden", self.locator),
                actual: "visible".to_string(),
                page: self.session.page_state().await,
            })
        }
    }

    /// Click the target
    pub async fn click(&self) -> E2eResult<()> {
        let position = self.actionable("click").await?;
        tracing::debug!(session = %self.session.id(), locator = %self.locator, "click");
        self.session
            .driver()
            .click(self.locator.selector(), position)
            .await
    }

    /// Replace the value of an input or textarea
    pub async fn fill(&self, value: &str) -> E2eResult<()> {
        let position = self.actionable("fill").await?;
        tracing::debug!(session = %self.session.id(), locator = %self.locator, "fill");
        self.session
            .driver()
            .fill(self.locator.selector(), position, value)
            .await
    }

    /// Check a checkbox or radio button
    pub async fn check(&self) -> E2eResult<()> {
        let position = self.actionable("check").await?;
        tracing::debug!(session = %self.session.id(), locator = %self.locator, "check");
        self.session
            .driver()
            .check(self.locator.selector(), position)
            .await
    }

    /// Select an option by value or label
    pub async fn select_option(&self, value: &str) -> E2eResult<()> {
        let position = self.actionable("select_option").await?;
        tracing::debug!(session = %self.session.id(), locator = %self.locator, value, "select_option");
        self.session
            .driver()
            .select_option(self.locator.selector(), position, value)
            .await
    }

    /// Attach files to a file input
    pub async fn set_input_files(&self, files: &[PathBuf]) -> E2eResult<()> {
        let position = self.actionable("set_input_files").await?;
        tracing::debug!(session = %self.session.id(), locator = %self.locator, files = files.len(), "set_input_files");
        self.session
            .driver()
            .set_input_files(self.locator.selector(), position, files)
            .await
    }

    /// Screenshot of the target written to the artifacts directory
    pub async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let position = self.actionable("screenshot").await?;
        let target = ScreenshotTarget::Element {
            selector: self.locator.selector().clone(),
            index: position,
        };
        self.session.screenshot(&target, name).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::mock::{ClickAction, Cookies, MockDriver, MockElement, MockPage, MockSite, Request, SiteResponse};
    use crate::session::SessionConfig;
    use std::sync::Arc;

    #[derive(Debug)]
    struct ListSite;

    impl MockSite for ListSite {
        fn handle(&self, request: Request<'_>, _cookies: &mut Cookies) -> SiteResponse {
            match request.url().path() {
                "/" => SiteResponse::Page(
                    MockPage::new("List")
                        .with(MockElement::new("li").attr("class", "item").text("One"))
                        .with(MockElement::new("li").attr("class", "item").text("Two"))
                        .with(MockElement::new("li").attr("class", "item").text("Three"))
                        .with(MockElement::new("p").attr("id", "ghost").text("Boo").hidden())
                        .with(
                            MockElement::new("button")
                                .attr("id", "reveal")
                                .on_click(ClickAction::Show("#ghost".to_string())),
                        )
                        .with(MockElement::link("/next", "Next")),
                ),
                _ => SiteResponse::Page(MockPage::new("Next")),
            }
        }
    }

    async fn session() -> Session {
        let config = SessionConfig::new("https://list.test")
            .unwrap()
            .with_action_timeout(Duration::from_millis(60))
            .with_poll_interval(Duration::from_millis(5));
        let session = Session::new(Box::new(MockDriver::new(Arc::new(ListSite))), config);
        session.goto("/").await.unwrap();
        session
    }

    mod resolution_tests {
        use super::*;

        #[tokio::test]
        async fn test_locate_is_lazy() {
            let session = session().await;
            let set = session.locate(&Locator::new(".item"));
            assert_eq!(set.locator().to_string(), "css=.item");
            assert_eq!(set.count().await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_strict_violation_on_ambiguous_click() {
            let session = session().await;
            let err = session.locate(&Locator::new(".item")).click().await.unwrap_err();
            match err {
                E2eError::StrictModeViolation { count, action, .. } => {
                    assert_eq!(count, 3);
                    assert_eq!(action, "click");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_narrowing() {
            let session = session().await;
            let items = session.locate(&Locator::new(".item"));
            assert_eq!(items.first().text_content().await.unwrap(), "One");
            assert_eq!(items.nth(1).text_content().await.unwrap(), "Two");
            assert_eq!(items.last().text_content().await.unwrap(), "Three");
            assert_eq!(
                items.all_text_contents().await.unwrap(),
                vec!["One", "Two", "Three"]
            );
        }

        #[tokio::test]
        async fn test_missing_element_times_out() {
            let session = session().await;
            let err = session
                .locate(&Locator::new("#nope"))
                .click()
                .await
                .unwrap_err();
            match err {
                E2eError::ElementNotFound {
                    selector,
                    action,
                    timeout_ms,
                } => {
                    assert_eq!(selector, "css=#nope");
                    assert_eq!(action, "click");
                    assert_eq!(timeout_ms, 60);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_hidden_element_is_not_actionable() {
            let session = session().await;
            let ghost = session.locate(&Locator::new("#ghost"));
            assert!(!ghost.is_visible().await.unwrap());
            assert!(matches!(
                ghost.click().await.unwrap_err(),
                E2eError::ElementNotFound { .. }
            ));
            session.locate(&Locator::new("#reveal")).click().await.unwrap();
            ghost.wait_for_visible().await.unwrap();
        }

        #[tokio::test]
        async fn test_resolution_follows_navigation() {
            let session = session().await;
            let next = session.locate(&Locator::role("link", "Next"));
            next.click().await.unwrap();
            assert_eq!(session.title().await.unwrap(), "Next");
            assert_eq!(next.count().await.unwrap(), 0);
            next.wait_for_hidden().await.unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_hidden_times_out_on_visible() {
            let session = session().await;
            let err = session
                .locate(&Locator::new(".item").first())
                .wait_for_hidden()
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::AssertionFailed { .. }));
        }

        #[tokio::test]
        async fn test_locator_timeout_overrides_session() {
            let session = session().await;
            let set = session.locate(&Locator::new("#nope").with_timeout(Duration::from_millis(10)));
            assert_eq!(set.action_timeout(), Duration::from_millis(10));
        }
    }
}
