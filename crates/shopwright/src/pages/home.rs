//! Home page and the navigation header shown on every page.

use crate::driver::ScreenshotTarget;
use crate::expect::{expect, expect_page};
use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::session::Session;
use std::path::PathBuf;

/// Exact title of the home page
pub const HOME_TITLE: &str = "Automation Exercise";

/// Landing page of the storefront
#[derive(Debug, Clone)]
pub struct HomePage<'s> {
    session: &'s Session,
    features: Locator,
    recommended: Locator,
    home_link: Locator,
    signup_login_link: Locator,
    products_link: Locator,
    cart_link: Locator,
    contact_link: Locator,
    logged_in_as: Locator,
    delete_account_link: Locator,
    logout_link: Locator,
}

impl<'s> HomePage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            features: Locator::new(".features_items"),
            recommended: Locator::new(".recommended_items"),
            home_link: Locator::role("link", "Home"),
            signup_login_link: Locator::role("link", "Signup / Login"),
            products_link: Locator::new("a[href=\"/products\"]"),
            // The "Added!" modal links to the cart too; the header link comes first
            cart_link: Locator::new("a[href=\"/view_cart\"]").first(),
            contact_link: Locator::role("link", "Contact Us"),
            logged_in_as: Locator::from_selector(Selector::css_with_text("a", "Logged in as")),
            delete_account_link: Locator::role("link", "Delete Account"),
            logout_link: Locator::role("link", "Logout"),
        }
    }

    /// Open the site root
    pub async fn goto(&self) -> E2eResult<()> {
        self.session.goto("/").await
    }

    /// Home page title is shown along with the features section
    pub async fn verify_home_visible(&self) -> E2eResult<()> {
        self.verify_title().await?;
        expect(self.session.locate(&self.features))
            .to_be_visible()
            .await
    }

    /// Title is exactly the home page title
    pub async fn verify_title(&self) -> E2eResult<()> {
        expect_page(self.session).to_have_title(HOME_TITLE).await
    }

    /// The session is on the site root
    pub async fn verify_at_root(&self) -> E2eResult<()> {
        expect_page(self.session).to_have_url("/").await
    }

    /// "Logged in as {name}" is shown in the header
    pub async fn verify_logged_in_as(&self, name: &str) -> E2eResult<()> {
        let marker = expect(self.session.locate(&self.logged_in_as));
        marker.to_be_visible().await?;
        marker.to_contain_text(&format!("Logged in as {name}")).await
    }

    /// No logged-in marker in the header
    pub async fn verify_logged_out(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.logged_in_as))
            .to_be_hidden()
            .await
    }

    /// Whether the header currently shows a logged-in user, without waiting
    pub async fn is_logged_in(&self) -> E2eResult<bool> {
        self.session.locate(&self.logged_in_as).is_visible().await
    }

    /// Follow the header Home link
    pub async fn click_home(&self) -> E2eResult<()> {
        self.session.locate(&self.home_link).click().await
    }

    /// Open the login/signup page
    pub async fn click_signup_login(&self) -> E2eResult<()> {
        self.session.locate(&self.signup_login_link).click().await
    }

    /// Open the product listing
    pub async fn click_products(&self) -> E2eResult<()> {
        self.session.locate(&self.products_link).click().await
    }

    /// Open the cart
    pub async fn click_cart(&self) -> E2eResult<()> {
        self.session.locate(&self.cart_link).click().await
    }

    /// Open the contact form
    pub async fn click_contact_us(&self) -> E2eResult<()> {
        self.session.locate(&self.contact_link).click().await
    }

    /// Delete the logged-in account; fails with `ElementNotFound` when
    /// nobody is logged in
    pub async fn click_delete_account(&self) -> E2eResult<()> {
        self.session.locate(&self.delete_account_link).click().await
    }

    /// Log out; fails with `ElementNotFound` when nobody is logged in
    pub async fn click_logout(&self) -> E2eResult<()> {
        self.session.locate(&self.logout_link).click().await
    }

    /// Screenshot of the visible viewport
    pub async fn screenshot_viewport(&self, name: &str) -> E2eResult<PathBuf> {
        self.session.screenshot(&ScreenshotTarget::Viewport, name).await
    }

    /// Screenshot of the whole scrollable page
    pub async fn screenshot_full_page(&self, name: &str) -> E2eResult<PathBuf> {
        self.session.screenshot(&ScreenshotTarget::FullPage, name).await
    }

    /// Screenshot of the recommended items carousel
    pub async fn screenshot_recommended_items(&self, name: &str) -> E2eResult<PathBuf> {
        self.session.locate(&self.recommended).screenshot(name).await
    }
}

impl PageObject for HomePage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "home"
    }

    fn url_pattern(&self) -> &str {
        "/"
    }

    fn landmark(&self) -> &Locator {
        &self.features
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("features", &self.features),
            ("recommended", &self.recommended),
            ("home_link", &self.home_link),
            ("signup_login_link", &self.signup_login_link),
            ("products_link", &self.products_link),
            ("cart_link", &self.cart_link),
            ("contact_link", &self.contact_link),
            ("logged_in_as", &self.logged_in_as),
            ("delete_account_link", &self.delete_account_link),
            ("logout_link", &self.logout_link),
        ]
    }
}
