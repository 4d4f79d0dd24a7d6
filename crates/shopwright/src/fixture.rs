//! Test data records.
//!
//! Fixtures are plain immutable data passed into page-object actions. Any
//! journey that creates a remote account must use a fresh email, so
//! [`UserFixture::unique`] mints one from a timestamp and a random token.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Honorific radio button on the account form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    /// "Mr."
    #[default]
    Mr,
    /// "Mrs."
    Mrs,
}

/// Account details used for signup and login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFixture {
    pub name: String,
    pub email: String,
    pub password: String,
    pub title: Title,
    pub day: String,
    pub month: String,
    pub year: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub address2: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub zipcode: String,
    pub mobile: String,
}

impl Default for UserFixture {
    fn default() -> Self {
        Self {
            name: "Playwright User".to_string(),
            email: String::new(),
            password: "TestPassword123!".to_string(),
            title: Title::Mr,
            day: "15".to_string(),
            month: "6".to_string(),
            year: "1990".to_string(),
            first_name: "Playwright".to_string(),
            last_name: "User".to_string(),
            company: "Test Company Inc".to_string(),
            address: "123 Main Street".to_string(),
            address2: "Apt 4B".to_string(),
            country: "United States".to_string(),
            state: "California".to_string(),
            city: "Los Angeles".to_string(),
            zipcode: "90001".to_string(),
            mobile: "+1234567890".to_string(),
        }
    }
}

impl UserFixture {
    /// A user named `name` with an email nobody has registered before
    #[must_use]
    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: unique_email("user"),
            ..Self::default()
        }
    }

    /// Replace the email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Replace the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Load a fixture from a YAML file
    pub fn from_yaml_file(path: &Path) -> E2eResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let fixture: Self = serde_yaml_ng::from_str(&raw)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Reject fixtures the signup form would refuse
    pub fn validate(&self) -> E2eResult<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("state", &self.state),
            ("city", &self.city),
            ("zipcode", &self.zipcode),
            ("mobile", &self.mobile),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(E2eError::config(format!("user fixture is missing `{field}`")));
        }
        if !self.email.contains('@') {
            return Err(E2eError::config(format!(
                "user fixture email {:?} is not an email address",
                self.email
            )));
        }
        Ok(())
    }
}

/// Email address that is unique per call: `{prefix}{unix millis}{token}@mail.com`
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}{}{}@mail.com",
        chrono::Utc::now().timestamp_millis(),
        &token[..6]
    )
}

/// Contents of the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub attachment: PathBuf,
}

impl ContactMessage {
    /// Standard message with the given attachment
    #[must_use]
    pub fn sample(attachment: impl Into<PathBuf>) -> Self {
        Self {
            name: "Priyanshu".to_string(),
            email: "test@test.com".to_string(),
            subject: "Automation Testing".to_string(),
            message: "This is a Shopwright automation test.".to_string(),
            attachment: attachment.into(),
        }
    }
}

/// Write a small text attachment into `dir` and return its path
pub async fn write_sample_attachment(dir: &Path) -> E2eResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!(
        "attachment-{}.txt",
        uuid::Uuid::new_v4().simple()
    ));
    tokio::fs::write(&path, b"Shopwright contact form attachment\n").await?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod user_fixture_tests {
        use super::*;

        #[test]
        fn test_unique_emails_differ() {
            let a = UserFixture::unique("Playwright User");
            let b = UserFixture::unique("Playwright User");
            assert_ne!(a.email, b.email);
            assert!(a.email.ends_with("@mail.com"));
            assert_eq!(a.name, "Playwright User");
            a.validate().unwrap();
        }

        #[test]
        fn test_default_needs_an_email() {
            let err = UserFixture::default().validate().unwrap_err();
            assert!(err.to_string().contains("email"));
        }

        #[test]
        fn test_rejects_malformed_email() {
            let user = UserFixture::unique("X").with_email("not-an-email");
            assert!(matches!(user.validate(), Err(E2eError::Config { .. })));
        }

        #[test]
        fn test_yaml_with_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("user.yaml");
            std::fs::write(
                &path,
                "name: Priyanshu\nemail: priyanshu@example.com\npassword: Test@123\ntitle: Mrs\ncountry: India\n",
            )
            .unwrap();
            let user = UserFixture::from_yaml_file(&path).unwrap();
            assert_eq!(user.title, Title::Mrs);
            assert_eq!(user.country, "India");
            assert_eq!(user.city, "Los Angeles");
        }
    }

    mod contact_tests {
        use super::*;

        #[tokio::test]
        async fn test_sample_attachment_is_written() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_sample_attachment(dir.path()).await.unwrap();
            assert!(path.exists());
            let message = ContactMessage::sample(&path);
            assert_eq!(message.attachment, path);
            assert_eq!(message.subject, "Automation Testing");
        }
    }
}
