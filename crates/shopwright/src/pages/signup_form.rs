//! `/signup`: the "Enter Account Information" form.

use super::login_signup::DUPLICATE_EMAIL_ERROR;
use crate::element::ElementSet;
use crate::expect::expect;
use crate::fixture::Title;
use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::{poll_until, Probe, WaitOptions, WaitOutcome};

/// Account details form reached after a successful signup step
#[derive(Debug, Clone)]
pub struct SignupFormPage<'s> {
    session: &'s Session,
    heading: Locator,
    duplicate_error: Locator,
    title_mr: Locator,
    title_mrs: Locator,
    password: Locator,
    days: Locator,
    months: Locator,
    years: Locator,
    newsletter: Locator,
    optin: Locator,
    first_name: Locator,
    last_name: Locator,
    company: Locator,
    address: Locator,
    address2: Locator,
    country: Locator,
    state: Locator,
    city: Locator,
    zipcode: Locator,
    mobile: Locator,
    create_account: Locator,
}

enum Landing {
    Form,
    Duplicate,
}

async fn probe_landing(heading: &ElementSet<'_>, duplicate: &ElementSet<'_>) -> E2eResult<Probe<Landing>> {
    if heading.is_visible().await? {
        return Ok(Probe::Done(Landing::Form));
    }
    if duplicate.is_visible().await? {
        return Ok(Probe::Done(Landing::Duplicate));
    }
    Ok(Probe::NotYet("hidden or missing".to_string()))
}

impl<'s> SignupFormPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            heading: Locator::from_selector(Selector::css_with_text(
                "b",
                "Enter Account Information",
            )),
            duplicate_error: Locator::from_selector(Selector::css_with_text(
                "p",
                DUPLICATE_EMAIL_ERROR,
            )),
            title_mr: Locator::new("#id_gender1"),
            title_mrs: Locator::new("#id_gender2"),
            password: Locator::new("#password"),
            days: Locator::new("#days"),
            months: Locator::new("#months"),
            years: Locator::new("#years"),
            newsletter: Locator::new("#newsletter"),
            optin: Locator::new("#optin"),
            first_name: Locator::new("#first_name"),
            last_name: Locator::new("#last_name"),
            company: Locator::new("#company"),
            address: Locator::new("#address1"),
            address2: Locator::new("#address2"),
            country: Locator::new("#country"),
            state: Locator::new("#state"),
            city: Locator::new("#city"),
            zipcode: Locator::new("#zipcode"),
            mobile: Locator::new("#mobile_number"),
            create_account: Locator::new("button[data-qa=\"create-account\"]"),
        }
    }

    /// "Enter Account Information" is shown.
    ///
    /// If the site rejected the signup because the email is taken, this fails
    /// with [`E2eError::DuplicateResource`] instead of a plain assertion.
    pub async fn verify_account_info(&self) -> E2eResult<()> {
        let config = self.session.config();
        let options = WaitOptions::new()
            .with_timeout(config.expect_timeout.as_millis() as u64)
            .with_poll_interval(config.poll_interval.as_millis() as u64);
        let heading = self.session.locate(&self.heading);
        let duplicate = self.session.locate(&self.duplicate_error);
        let (heading_ref, duplicate_ref) = (&heading, &duplicate);
        let outcome =
            poll_until(options, move || probe_landing(heading_ref, duplicate_ref)).await?;
        match outcome {
            WaitOutcome::Ready {
                value: Landing::Form,
                ..
            } => Ok(()),
            WaitOutcome::Ready {
                value: Landing::Duplicate,
                ..
            } => Err(E2eError::DuplicateResource {
                resource: "account".to_string(),
                message: DUPLICATE_EMAIL_ERROR.to_string(),
            }),
            WaitOutcome::TimedOut { last_observed, .. } => Err(E2eError::AssertionFailed {
                expectation: format!("{} to be visible", self.heading),
                actual: last_observed,
                page: self.session.page_state().await,
            }),
        }
    }

    /// "Create Account" is shown
    pub async fn verify_create_button_visible(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.create_account))
            .to_be_visible()
            .await
    }

    /// Pick the Mr./Mrs. radio button
    pub async fn choose_title(&self, title: Title) -> E2eResult<()> {
        let radio = match title {
            Title::Mr => &self.title_mr,
            Title::Mrs => &self.title_mrs,
        };
        self.session.locate(radio).check().await
    }

    /// Type the password
    pub async fn fill_password(&self, password: &str) -> E2eResult<()> {
        self.session.locate(&self.password).fill(password).await
    }

    /// Pick the birth day
    pub async fn select_day(&self, day: &str) -> E2eResult<()> {
        self.session.locate(&self.days).select_option(day).await
    }

    /// Pick the birth month
    pub async fn select_month(&self, month: &str) -> E2eResult<()> {
        self.session.locate(&self.months).select_option(month).await
    }

    /// Pick the birth year
    pub async fn select_year(&self, year: &str) -> E2eResult<()> {
        self.session.locate(&self.years).select_option(year).await
    }

    /// Tick "Sign up for our newsletter!"
    pub async fn check_newsletter(&self) -> E2eResult<()> {
        self.session.locate(&self.newsletter).check().await
    }

    /// Tick "Receive special offers from our partners!"
    pub async fn check_special_offers(&self) -> E2eResult<()> {
        self.session.locate(&self.optin).check().await
    }

    /// Type the first name
    pub async fn fill_first_name(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.first_name).fill(value).await
    }

    /// Type the last name
    pub async fn fill_last_name(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.last_name).fill(value).await
    }

    /// Type the company
    pub async fn fill_company(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.company).fill(value).await
    }

    /// Type the address
    pub async fn fill_address(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.address).fill(value).await
    }

    /// Type the second address line
    pub async fn fill_address2(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.address2).fill(value).await
    }

    /// Pick the country
    pub async fn select_country(&self, country: &str) -> E2eResult<()> {
        self.session.locate(&self.country).select_option(country).await
    }

    /// Type the state
    pub async fn fill_state(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.state).fill(value).await
    }

    /// Type the city
    pub async fn fill_city(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.city).fill(value).await
    }

    /// Type the zip code
    pub async fn fill_zipcode(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.zipcode).fill(value).await
    }

    /// Type the mobile number
    pub async fn fill_mobile(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.mobile).fill(value).await
    }

    /// Submit the form and create the account
    pub async fn click_create_account(&self) -> E2eResult<()> {
        self.session.locate(&self.create_account).click().await
    }
}

impl PageObject for SignupFormPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "signup-form"
    }

    fn url_pattern(&self) -> &str {
        "/signup"
    }

    fn landmark(&self) -> &Locator {
        &self.heading
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("heading", &self.heading),
            ("duplicate_error", &self.duplicate_error),
            ("title_mr", &self.title_mr),
            ("title_mrs", &self.title_mrs),
            ("password", &self.password),
            ("days", &self.days),
            ("months", &self.months),
            ("years", &self.years),
            ("newsletter", &self.newsletter),
            ("optin", &self.optin),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("company", &self.company),
            ("address", &self.address),
            ("address2", &self.address2),
            ("country", &self.country),
            ("state", &self.state),
            ("city", &self.city),
            ("zipcode", &self.zipcode),
            ("mobile", &self.mobile),
            ("create_account", &self.create_account),
        ]
    }
}
