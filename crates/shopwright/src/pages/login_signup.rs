//! `/login`: the login form and the new-user signup form side by side.

use crate::expect::{expect, expect_page};
use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::session::Session;

/// Error shown for unknown credentials
pub const LOGIN_ERROR: &str = "Your email or password is incorrect!";

/// Error shown when signing up with a registered email
pub const DUPLICATE_EMAIL_ERROR: &str = "Email Address already exist!";

/// Login and signup forms
#[derive(Debug, Clone)]
pub struct LoginSignupPage<'s> {
    session: &'s Session,
    login_heading: Locator,
    login_email: Locator,
    login_password: Locator,
    login_button: Locator,
    login_error: Locator,
    signup_heading: Locator,
    signup_name: Locator,
    signup_email: Locator,
    signup_button: Locator,
    signup_error: Locator,
}

impl<'s> LoginSignupPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            login_heading: Locator::from_selector(Selector::css_with_text(
                "h2",
                "Login to your account",
            )),
            login_email: Locator::new("input[data-qa=\"login-email\"]"),
            login_password: Locator::new("input[data-qa=\"login-password\"]"),
            login_button: Locator::new("button[data-qa=\"login-button\"]"),
            login_error: Locator::from_selector(Selector::css_with_text(
                "p",
                "Your email or password is incorrect",
            )),
            signup_heading: Locator::from_selector(Selector::css_with_text(
                "h2",
                "New User Signup!",
            )),
            signup_name: Locator::new("input[data-qa=\"signup-name\"]"),
            signup_email: Locator::new("input[data-qa=\"signup-email\"]"),
            signup_button: Locator::new("button[data-qa=\"signup-button\"]"),
            signup_error: Locator::from_selector(Selector::css_with_text(
                "p",
                DUPLICATE_EMAIL_ERROR,
            )),
        }
    }

    /// Open `/login` directly
    pub async fn goto(&self) -> E2eResult<()> {
        self.session.goto("/login").await
    }

    /// "Login to your account" is shown
    pub async fn verify_login_visible(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.login_heading))
            .to_be_visible()
            .await
    }

    /// Heading and both credential fields are shown
    pub async fn verify_login_form_visible(&self) -> E2eResult<()> {
        self.verify_login_visible().await?;
        expect(self.session.locate(&self.login_email))
            .to_be_visible()
            .await?;
        expect(self.session.locate(&self.login_password))
            .to_be_visible()
            .await
    }

    /// The session is on `/login`
    pub async fn verify_at_login(&self) -> E2eResult<()> {
        expect_page(self.session).to_have_url("/login").await
    }

    /// The credentials error is shown with its exact text
    pub async fn verify_login_error(&self) -> E2eResult<()> {
        let error = expect(self.session.locate(&self.login_error));
        error.to_be_visible().await?;
        error.to_have_text(LOGIN_ERROR).await
    }

    /// "New User Signup!" is shown
    pub async fn verify_new_user_signup(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.signup_heading))
            .to_be_visible()
            .await
    }

    /// The duplicate email error is shown
    pub async fn verify_duplicate_email_error(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.signup_error))
            .to_be_visible()
            .await
    }

    /// Type into the login email field
    pub async fn fill_login_email(&self, email: &str) -> E2eResult<()> {
        self.session.locate(&self.login_email).fill(email).await
    }

    /// Type into the login password field
    pub async fn fill_login_password(&self, password: &str) -> E2eResult<()> {
        self.session.locate(&self.login_password).fill(password).await
    }

    /// Submit the login form
    pub async fn click_login(&self) -> E2eResult<()> {
        self.session.locate(&self.login_button).click().await
    }

    /// Type into the signup name field
    pub async fn fill_signup_name(&self, name: &str) -> E2eResult<()> {
        self.session.locate(&self.signup_name).fill(name).await
    }

    /// Type into the signup email field
    pub async fn fill_signup_email(&self, email: &str) -> E2eResult<()> {
        self.session.locate(&self.signup_email).fill(email).await
    }

    /// Submit the signup form
    pub async fn click_signup(&self) -> E2eResult<()> {
        self.session.locate(&self.signup_button).click().await
    }
}

impl PageObject for LoginSignupPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "login-signup"
    }

    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn landmark(&self) -> &Locator {
        &self.login_heading
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("login_heading", &self.login_heading),
            ("login_email", &self.login_email),
            ("login_password", &self.login_password),
            ("login_button", &self.login_button),
            ("login_error", &self.login_error),
            ("signup_heading", &self.signup_heading),
            ("signup_name", &self.signup_name),
            ("signup_email", &self.signup_email),
            ("signup_button", &self.signup_button),
            ("signup_error", &self.signup_error),
        ]
    }
}
