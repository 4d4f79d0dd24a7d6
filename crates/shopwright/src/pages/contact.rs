//! `/contact_us`: the "Get In Touch" form with a file upload.

use crate::dialog::{DialogPolicy, DialogType};
use crate::expect::expect;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use std::path::Path;

/// Success banner after the form is submitted
pub const CONTACT_SUCCESS: &str = "Success! Your details have been submitted successfully.";

/// Contact form
#[derive(Debug, Clone)]
pub struct ContactPage<'s> {
    session: &'s Session,
    heading: Locator,
    name: Locator,
    email: Locator,
    subject: Locator,
    message: Locator,
    upload: Locator,
    submit: Locator,
    status: Locator,
    home_button: Locator,
}

impl<'s> ContactPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            heading: Locator::role("heading", "Get In Touch"),
            name: Locator::new("input[name=\"name\"]"),
            email: Locator::new("input[name=\"email\"]"),
            subject: Locator::new("input[name=\"subject\"]"),
            message: Locator::new("textarea[name=\"message\"]"),
            upload: Locator::new("input[name=\"upload_file\"]"),
            submit: Locator::new("input[name=\"submit\"]"),
            status: Locator::new(".status.alert-success"),
            home_button: Locator::new("a.btn-success[href=\"/\"]"),
        }
    }

    /// "Get In Touch" is shown
    pub async fn verify_get_in_touch(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.heading))
            .to_be_visible()
            .await
    }

    /// The success banner is shown
    pub async fn verify_success(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.status))
            .to_have_text(CONTACT_SUCCESS)
            .await
    }

    /// A confirm dialog was raised and accepted
    pub async fn verify_confirmation_accepted(&self) -> E2eResult<()> {
        let dialogs = self.session.dialogs();
        match dialogs.last() {
            Some(dialog) if dialog.dialog_type == DialogType::Confirm && dialog.accepted() => {
                Ok(())
            }
            other => Err(E2eError::AssertionFailed {
                expectation: "an accepted confirm dialog".to_string(),
                actual: other.map_or_else(
                    || "no dialog".to_string(),
                    |d| format!("{} {:?} ({:?})", d.dialog_type, d.message, d.action),
                ),
                page: self.session.page_state().await,
            }),
        }
    }

    /// Type the sender name
    pub async fn fill_name(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.name).fill(value).await
    }

    /// Type the sender email
    pub async fn fill_email(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.email).fill(value).await
    }

    /// Type the subject
    pub async fn fill_subject(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.subject).fill(value).await
    }

    /// Type the message body
    pub async fn fill_message(&self, value: &str) -> E2eResult<()> {
        self.session.locate(&self.message).fill(value).await
    }

    /// Choose the file to upload with the message
    pub async fn attach_file(&self, path: &Path) -> E2eResult<()> {
        self.session
            .locate(&self.upload)
            .set_input_files(&[path.to_path_buf()])
            .await
    }

    /// Answer the upcoming "Press OK to proceed!" confirm with OK
    pub fn accept_confirmation(&self) {
        self.session.on_dialog(DialogPolicy::AcceptAll);
    }

    /// Submit the form; the confirm dialog is answered by the session's dialog policy
    pub async fn click_submit(&self) -> E2eResult<()> {
        self.session.locate(&self.submit).click().await
    }

    /// Return to the site root from the success banner
    pub async fn click_home(&self) -> E2eResult<()> {
        self.session.locate(&self.home_button).click().await
    }
}

impl PageObject for ContactPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "contact"
    }

    fn url_pattern(&self) -> &str {
        "/contact_us"
    }

    fn landmark(&self) -> &Locator {
        &self.heading
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("heading", &self.heading),
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
            ("upload", &self.upload),
            ("submit", &self.submit),
            ("status", &self.status),
            ("home_button", &self.home_button),
        ]
    }
}
