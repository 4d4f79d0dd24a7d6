//! Confirmation pages shown after creating or deleting an account.

use crate::expect::expect;
use crate::locator::Locator;
use crate::page_object::{PageObject, UrlMatcher};
use crate::result::E2eResult;
use crate::session::Session;
use async_trait::async_trait;

/// Heading after signup completes
pub const ACCOUNT_CREATED: &str = "Account Created!";
/// Heading after the account is deleted
pub const ACCOUNT_DELETED: &str = "Account Deleted!";

const CREATED_PATH: &str = "/account_created";
const DELETED_PATH: &str = "/delete_account";

/// `/account_created` and `/delete_account`
#[derive(Debug, Clone)]
pub struct AccountPage<'s> {
    session: &'s Session,
    created_heading: Locator,
    deleted_heading: Locator,
    continue_button: Locator,
}

impl<'s> AccountPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            created_heading: Locator::new("h2[data-qa=\"account-created\"]"),
            deleted_heading: Locator::new("h2[data-qa=\"account-deleted\"]"),
            continue_button: Locator::new("a[data-qa=\"continue-button\"]"),
        }
    }

    /// "Account Created!" is shown
    pub async fn verify_account_created(&self) -> E2eResult<()> {
        let heading = expect(self.session.locate(&self.created_heading));
        heading.to_be_visible().await?;
        heading.to_have_text(ACCOUNT_CREATED).await
    }

    /// "Account Deleted!" is shown
    pub async fn verify_account_deleted(&self) -> E2eResult<()> {
        let heading = expect(self.session.locate(&self.deleted_heading));
        heading.to_be_visible().await?;
        heading.to_have_text(ACCOUNT_DELETED).await
    }

    /// Leave the confirmation for the site root
    pub async fn click_continue(&self) -> E2eResult<()> {
        self.session.locate(&self.continue_button).click().await
    }
}

#[async_trait]
impl PageObject for AccountPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "account"
    }

    fn url_pattern(&self) -> &str {
        CREATED_PATH
    }

    fn landmark(&self) -> &Locator {
        &self.continue_button
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("created_heading", &self.created_heading),
            ("deleted_heading", &self.deleted_heading),
            ("continue_button", &self.continue_button),
        ]
    }

    /// Either confirmation counts
    async fn is_current(&self) -> E2eResult<bool> {
        let url = self.session.url().await?;
        Ok([CREATED_PATH, DELETED_PATH]
            .iter()
            .any(|path| UrlMatcher::new(path).matches(&url)))
    }
}
