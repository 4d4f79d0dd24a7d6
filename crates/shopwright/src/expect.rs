//! Polling assertions.
//!
//! `expect(...)` checks a visible condition repeatedly until it holds or the
//! session's expect budget runs out. A failure is an
//! [`E2eError::AssertionFailed`] carrying the expectation, the last observed
//! value and the page title/URL at that moment.
//!
//! ```ignore
//! expect(session.locate(&heading)).to_have_text("Account Created!").await?;
//! expect_page(&session).to_have_url("/").await?;
//! ```
//!
//! Assertions only read; they never change page state.

use crate::element::ElementSet;
use crate::result::{E2eError, E2eResult};
use crate::session::{same_location, Session};
use crate::wait::{poll_until, Probe, WaitOptions, WaitOutcome};
use regex::Regex;
use std::future::Future;
use std::time::Duration;

/// Start an assertion on an element set
#[must_use]
pub fn expect(set: ElementSet<'_>) -> ElementExpect<'_> {
    let timeout = set.session().config().expect_timeout;
    ElementExpect { set, timeout }
}

/// Start an assertion on the page itself
#[must_use]
pub fn expect_page(session: &Session) -> PageExpect<'_> {
    PageExpect {
        session,
        timeout: session.config().expect_timeout,
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

async fn verify<T, F, Fut>(
    session: &Session,
    timeout: Duration,
    expectation: String,
    probe: F,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Probe<T>>>,
{
    let options = WaitOptions::new()
        .with_timeout(timeout.as_millis() as u64)
        .with_poll_interval(session.config().poll_interval.as_millis() as u64);
    match poll_until(options, probe).await? {
        WaitOutcome::Ready { value, elapsed } => {
            tracing::debug!(session = %session.id(), %expectation, ?elapsed, "expectation met");
            Ok(value)
        }
        WaitOutcome::TimedOut { last_observed, .. } => {
            let page = session.page_state().await;
            tracing::debug!(session = %session.id(), %expectation, actual = %last_observed, "expectation failed");
            Err(E2eError::AssertionFailed {
                expectation,
                actual: last_observed,
                page,
            })
        }
    }
}

async fn probe_visible(set: &ElementSet<'_>, want: bool) -> E2eResult<Probe<()>> {
    let visible = set.is_visible().await?;
    Ok(if visible == want {
        Probe::Done(())
    } else if visible {
        Probe::NotYet("visible".to_string())
    } else {
        Probe::NotYet("hidden or missing".to_string())
    })
}

async fn probe_text(set: &ElementSet<'_>, expected: &str, exact: bool) -> E2eResult<Probe<()>> {
    let Some(text) = set.current_text().await? else {
        return Ok(Probe::NotYet("no matching element".to_string()));
    };
    let actual = collapse(&text);
    let expected = collapse(expected);
    let holds = if exact {
        actual == expected
    } else {
        actual.contains(&expected)
    };
    Ok(if holds {
        Probe::Done(())
    } else {
        Probe::NotYet(format!("{actual:?}"))
    })
}

async fn probe_count(set: &ElementSet<'_>, expected: usize) -> E2eResult<Probe<()>> {
    let count = set.count().await?;
    Ok(if count == expected {
        Probe::Done(())
    } else {
        Probe::NotYet(count.to_string())
    })
}

async fn probe_title(session: &Session, check: &TitleCheck<'_>) -> E2eResult<Probe<()>> {
    let title = session.title().await?;
    let holds = match check {
        TitleCheck::Exact(expected) => title == *expected,
        TitleCheck::Pattern(pattern) => pattern.is_match(&title),
    };
    Ok(if holds {
        Probe::Done(())
    } else {
        Probe::NotYet(format!("{title:?}"))
    })
}

async fn probe_url(session: &Session, check: &UrlCheck<'_>) -> E2eResult<Probe<()>> {
    let url = session.url().await?;
    let holds = match check {
        UrlCheck::Location(expected) => same_location(&url, expected),
        UrlCheck::Pattern(pattern) => pattern.is_match(&url),
    };
    Ok(if holds {
        Probe::Done(())
    } else {
        Probe::NotYet(format!("{url:?}"))
    })
}

enum TitleCheck<'a> {
    Exact(&'a str),
    Pattern(&'a Regex),
}

enum UrlCheck<'a> {
    Location(&'a str),
    Pattern(&'a Regex),
}

/// Assertions on an element set
#[derive(Debug)]
pub struct ElementExpect<'s> {
    set: ElementSet<'s>,
    timeout: Duration,
}

impl ElementExpect<'_> {
    /// Override the wait budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run<F, Fut>(&self, expectation: String, probe: F) -> E2eResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Probe<()>>>,
    {
        verify(self.set.session(), self.timeout, expectation, probe).await
    }

    /// The target becomes visible
    pub async fn to_be_visible(&self) -> E2eResult<()> {
        let set = &self.set;
        self.run(format!("{} to be visible", set.locator()), move || {
            probe_visible(set, true)
        })
        .await
    }

    /// The target becomes hidden or disappears
    pub async fn to_be_hidden(&self) -> E2eResult<()> {
        let set = &self.set;
        self.run(format!("{} to be hidden", set.locator()), move || {
            probe_visible(set, false)
        })
        .await
    }

    /// The target's text equals `expected` (whitespace-normalized)
    pub async fn to_have_text(&self, expected: &str) -> E2eResult<()> {
        let set = &self.set;
        self.run(
            format!("{} to have text {expected:?}", set.locator()),
            move || probe_text(set, expected, true),
        )
        .await
    }

    /// The target's text contains `expected` (whitespace-normalized)
    pub async fn to_contain_text(&self, expected: &str) -> E2eResult<()> {
        let set = &self.set;
        self.run(
            format!("{} to contain text {expected:?}", set.locator()),
            move || probe_text(set, expected, false),
        )
        .await
    }

    /// Exactly `expected` elements match
    pub async fn to_have_count(&self, expected: usize) -> E2eResult<()> {
        let set = &self.set;
        self.run(
            format!("{} to have count {expected}", set.locator()),
            move || probe_count(set, expected),
        )
        .await
    }
}

/// Assertions on the page title and URL
#[derive(Debug)]
pub struct PageExpect<'s> {
    session: &'s Session,
    timeout: Duration,
}

impl PageExpect<'_> {
    /// Override the wait budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The title equals `expected`
    pub async fn to_have_title(&self, expected: &str) -> E2eResult<()> {
        let session = self.session;
        let check = TitleCheck::Exact(expected);
        let check = &check;
        verify(session, self.timeout, format!("title {expected:?}"), move || {
            probe_title(session, check)
        })
        .await
    }

    /// The title matches `pattern`
    pub async fn to_have_title_matching(&self, pattern: &Regex) -> E2eResult<()> {
        let session = self.session;
        let check = TitleCheck::Pattern(pattern);
        let check = &check;
        verify(
            session,
            self.timeout,
            format!("title matching /{pattern}/"),
            move || probe_title(session, check),
        )
        .await
    }

    /// The URL is `path` on the site (or an absolute URL), ignoring scheme
    /// and trailing slash
    pub async fn to_have_url(&self, path: &str) -> E2eResult<()> {
        let session = self.session;
        let expected = session.config().url_for(path)?;
        let check = UrlCheck::Location(expected.as_str());
        let check = &check;
        verify(session, self.timeout, format!("url {expected}"), move || {
            probe_url(session, check)
        })
        .await
    }

    /// The URL matches `pattern`
    pub async fn to_have_url_matching(&self, pattern: &Regex) -> E2eResult<()> {
        let session = self.session;
        let check = UrlCheck::Pattern(pattern);
        let check = &check;
        verify(
            session,
            self.timeout,
            format!("url matching /{pattern}/"),
            move || probe_url(session, check),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::mock::{ClickAction, Cookies, MockDriver, MockElement, MockPage, MockSite, Request, SiteResponse};
    use crate::locator::Locator;
    use crate::session::SessionConfig;
    use std::sync::Arc;

    #[derive(Debug)]
    struct BannerSite;

    impl MockSite for BannerSite {
        fn handle(&self, request: Request<'_>, _cookies: &mut Cookies) -> SiteResponse {
            match request.url().path() {
                "/" => SiteResponse::Page(
                    MockPage::new("Automation Exercise")
                        .with(MockElement::new("h2").attr("class", "title").text("  Features   Items "))
                        .with(MockElement::new("div").attr("class", "status").text("Saved").hidden())
                        .with(
                            MockElement::new("button")
                                .attr("id", "save")
                                .on_click(ClickAction::Show(".status".to_string())),
                        ),
                ),
                _ => SiteResponse::Page(MockPage::new("Other")),
            }
        }
    }

    async fn session() -> (Session, Arc<MockDriver>) {
        let config = SessionConfig::new("http://automationexercise.com")
            .unwrap()
            .with_expect_timeout(Duration::from_millis(40))
            .with_poll_interval(Duration::from_millis(5));
        let driver = Arc::new(MockDriver::new(Arc::new(BannerSite)));
        let session = Session::new(Box::new(Arc::clone(&driver)), config);
        session.goto("/").await.unwrap();
        (session, driver)
    }

    mod element_expect_tests {
        use super::*;

        #[tokio::test]
        async fn test_text_is_whitespace_normalized() {
            let (session, _) = session().await;
            let heading = session.locate(&Locator::new("h2.title"));
            expect(heading.clone()).to_have_text("Features Items").await.unwrap();
            expect(heading).to_contain_text("Items").await.unwrap();
        }

        #[tokio::test]
        async fn test_failure_reports_actual_and_page() {
            let (session, _) = session().await;
            let err = expect(session.locate(&Locator::new("h2.title")))
                .to_have_text("Account Created!")
                .await
                .unwrap_err();
            match err {
                E2eError::AssertionFailed {
                    expectation,
                    actual,
                    page,
                } => {
                    assert!(expectation.contains("Account Created!"));
                    assert_eq!(actual, "\"Features Items\"");
                    assert_eq!(page.title.as_deref(), Some("Automation Exercise"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_visibility_and_count() {
            let (session, _) = session().await;
            let status = session.locate(&Locator::new(".status"));
            expect(status.clone()).to_be_hidden().await.unwrap();
            session.locate(&Locator::new("#save")).click().await.unwrap();
            expect(status.clone()).to_be_visible().await.unwrap();
            expect(status).to_have_count(1).await.unwrap();
        }

        #[tokio::test]
        async fn test_missing_element_fails_visible() {
            let (session, _) = session().await;
            let err = expect(session.locate(&Locator::new("#absent")))
                .with_timeout(Duration::from_millis(10))
                .to_be_visible()
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::AssertionFailed { .. }));
        }

        #[tokio::test]
        async fn test_assertions_do_not_mutate() {
            let (session, driver) = session().await;
            driver.clear_history();
            let heading = session.locate(&Locator::new("h2.title"));
            expect(heading.clone()).to_be_visible().await.unwrap();
            expect(heading).to_contain_text("Features").await.unwrap();
            expect_page(&session).to_have_url("/").await.unwrap();
            assert!(driver.mutations().is_empty());
        }
    }

    mod page_expect_tests {
        use super::*;

        #[tokio::test]
        async fn test_title() {
            let (session, _) = session().await;
            expect_page(&session)
                .to_have_title("Automation Exercise")
                .await
                .unwrap();
            expect_page(&session)
                .to_have_title_matching(&Regex::new("Automation").unwrap())
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_url_ignores_scheme() {
            let (session, _) = session().await;
            expect_page(&session).to_have_url("https://automationexercise.com/").await.unwrap();
            let err = expect_page(&session).to_have_url("/login").await.unwrap_err();
            assert!(matches!(err, E2eError::AssertionFailed { .. }));
        }
    }
}
