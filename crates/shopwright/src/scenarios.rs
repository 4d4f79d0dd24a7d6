//! The scenario catalogue: user journeys on the storefront.
//!
//! Every journey is self-sufficient. Journeys that need an account register
//! a fresh one with a unique email first and delete it before finishing, so
//! scenarios can run in any order and on parallel sessions.

use crate::fixture::{write_sample_attachment, ContactMessage, UserFixture};
use crate::harness::{Journey, TestSuite};
use crate::pages::{
    AccountPage, CartPage, ContactPage, HomePage, LoginSignupPage, ProductDetailPage,
    ProductsPage, SignupFormPage,
};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use futures::future::BoxFuture;

/// Name used for every provisioned account
pub const DEFAULT_USER_NAME: &str = "Playwright User";

/// Quantity ordered in the cart journey
const CART_QUANTITY: u32 = 5;

/// First entry of the product listing
const FIRST_PRODUCT: &str = "Blue Top";

/// All journeys, in catalogue order
#[must_use]
pub fn catalogue() -> TestSuite {
    let mut suite = TestSuite::new("automationexercise");
    for journey in JOURNEYS {
        suite.add(*journey);
    }
    suite
}

const JOURNEYS: &[Journey] = &[
    Journey::new(
        "register_and_delete",
        "Register a new user, log in through account creation, delete the account",
        register_and_delete,
    ),
    Journey::new(
        "login_valid_credentials",
        "Log in with correct email and password",
        login_valid_credentials,
    ),
    Journey::new(
        "login_invalid_credentials",
        "Log in with an unknown email and see the credentials error",
        login_invalid_credentials,
    ),
    Journey::new(
        "login_empty_credentials",
        "Submit the login form empty and stay on the login page",
        login_empty_credentials,
    ),
    Journey::new(
        "login_logout",
        "Log in, log out and land back on the login page",
        login_logout,
    ),
    Journey::new(
        "signup_existing_email",
        "Sign up with an email that is already registered",
        signup_existing_email,
    ),
    Journey::new(
        "delete_account_twice",
        "Delete an account, then find no delete link left",
        delete_account_twice,
    ),
    Journey::new(
        "contact_form",
        "Submit the contact form with an attachment and accept the confirmation",
        contact_form,
    ),
    Journey::new(
        "add_product_to_cart",
        "Add a product to the cart and reach the checkout prompt",
        add_product_to_cart,
    ),
    Journey::new(
        "signup_navigation",
        "Open the home page and reach the signup form",
        signup_navigation,
    ),
    Journey::new(
        "capture_screenshots",
        "Capture viewport, full-page and element screenshots of the home page",
        capture_screenshots,
    ),
];

/// Fill every field of the account information form from `user`
pub async fn enter_account_information(form: &SignupFormPage<'_>, user: &UserFixture) -> E2eResult<()> {
    form.choose_title(user.title).await?;
    form.fill_password(&user.password).await?;
    form.select_day(&user.day).await?;
    form.select_month(&user.month).await?;
    form.select_year(&user.year).await?;
    form.check_newsletter().await?;
    form.check_special_offers().await?;
    form.fill_first_name(&user.first_name).await?;
    form.fill_last_name(&user.last_name).await?;
    form.fill_company(&user.company).await?;
    form.fill_address(&user.address).await?;
    form.fill_address2(&user.address2).await?;
    form.select_country(&user.country).await?;
    form.fill_state(&user.state).await?;
    form.fill_city(&user.city).await?;
    form.fill_zipcode(&user.zipcode).await?;
    form.fill_mobile(&user.mobile).await
}

/// From the login page, register `user` and continue to the site root
/// logged in.
pub async fn sign_up(session: &Session, user: &UserFixture) -> E2eResult<()> {
    let login = LoginSignupPage::new(session);
    login.verify_new_user_signup().await?;
    login.fill_signup_name(&user.name).await?;
    login.fill_signup_email(&user.email).await?;
    login.click_signup().await?;

    let form = SignupFormPage::new(session);
    form.verify_account_info().await?;
    enter_account_information(&form, user).await?;
    form.verify_create_button_visible().await?;
    form.click_create_account().await?;

    let account = AccountPage::new(session);
    account.verify_account_created().await?;
    account.click_continue().await?;
    HomePage::new(session).verify_logged_in_as(&user.name).await
}

/// Register a fresh account through the UI and log out again.
///
/// Leaves the session on the login page.
pub async fn provision_account(session: &Session) -> E2eResult<UserFixture> {
    let user = UserFixture::unique(DEFAULT_USER_NAME);
    let home = HomePage::new(session);
    home.goto().await?;
    home.click_signup_login().await?;
    sign_up(session, &user).await?;
    home.click_logout().await?;
    tracing::info!(email = %user.email, "account provisioned");
    Ok(user)
}

/// From the login page, log in as `user`
pub async fn log_in(session: &Session, user: &UserFixture) -> E2eResult<()> {
    let login = LoginSignupPage::new(session);
    login.verify_login_visible().await?;
    login.fill_login_email(&user.email).await?;
    login.fill_login_password(&user.password).await?;
    login.click_login().await
}

/// Delete the logged-in account and continue to the site root
pub async fn delete_current_account(session: &Session) -> E2eResult<()> {
    HomePage::new(session).click_delete_account().await?;
    let account = AccountPage::new(session);
    account.verify_account_deleted().await?;
    account.click_continue().await
}

async fn unexpected(session: &Session, expectation: &str, actual: &str) -> E2eError {
    E2eError::AssertionFailed {
        expectation: expectation.to_string(),
        actual: actual.to_string(),
        page: session.page_state().await,
    }
}

/// Turn an action that had to fail with `ElementNotFound` into a step result
async fn expect_element_not_found(session: &Session, action: &str, outcome: E2eResult<()>) -> E2eResult<()> {
    match outcome {
        Err(E2eError::ElementNotFound { selector, .. }) => {
            tracing::info!(action, %selector, "element absent as expected");
            Ok(())
        }
        Ok(()) => Err(unexpected(session, &format!("{action} to find no element"), "the action succeeded").await),
        Err(other) => Err(other),
    }
}

fn register_and_delete(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let user = UserFixture::unique(DEFAULT_USER_NAME);
        let home = HomePage::new(session);
        home.goto().await?;
        home.verify_home_visible().await?;
        home.click_signup_login().await?;
        sign_up(session, &user).await?;
        delete_current_account(session).await
    })
}

fn login_valid_credentials(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let user = provision_account(session).await?;
        log_in(session, &user).await?;

        let home = HomePage::new(session);
        home.verify_logged_in_as(&user.name).await?;
        home.verify_at_root().await?;
        delete_current_account(session).await
    })
}

fn login_invalid_credentials(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let login = LoginSignupPage::new(session);
        login.goto().await?;
        login.verify_login_visible().await?;
        login.fill_login_email(&crate::fixture::unique_email("nobody")).await?;
        login.fill_login_password("WrongPassword!").await?;
        login.click_login().await?;

        login.verify_login_error().await?;
        login.verify_at_login().await
    })
}

fn login_empty_credentials(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let login = LoginSignupPage::new(session);
        login.goto().await?;
        login.click_login().await?;

        login.verify_at_login().await?;
        login.verify_login_form_visible().await?;
        HomePage::new(session).verify_logged_out().await
    })
}

fn login_logout(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let user = provision_account(session).await?;
        log_in(session, &user).await?;

        let home = HomePage::new(session);
        home.verify_logged_in_as(&user.name).await?;
        home.click_logout().await?;

        let login = LoginSignupPage::new(session);
        login.verify_at_login().await?;
        home.verify_logged_out().await?;
        login.verify_login_form_visible().await?;

        log_in(session, &user).await?;
        delete_current_account(session).await
    })
}

fn signup_existing_email(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let user = provision_account(session).await?;

        let login = LoginSignupPage::new(session);
        login.verify_new_user_signup().await?;
        login.fill_signup_name(&user.name).await?;
        login.fill_signup_email(&user.email).await?;
        login.click_signup().await?;

        match SignupFormPage::new(session).verify_account_info().await {
            Err(E2eError::DuplicateResource { message, .. }) => {
                tracing::info!(%message, "duplicate signup rejected");
            }
            Ok(()) => {
                return Err(unexpected(
                    session,
                    "signup with a registered email to be rejected",
                    "the account information form",
                )
                .await)
            }
            Err(other) => return Err(other),
        }
        login.verify_duplicate_email_error().await?;

        log_in(session, &user).await?;
        delete_current_account(session).await
    })
}

fn delete_account_twice(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let user = provision_account(session).await?;
        log_in(session, &user).await?;
        delete_current_account(session).await?;

        let home = HomePage::new(session);
        home.verify_logged_out().await?;
        let second = home.click_delete_account().await;
        expect_element_not_found(session, "delete account", second).await
    })
}

fn contact_form(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(session);
        home.goto().await?;
        home.click_contact_us().await?;

        let contact = ContactPage::new(session);
        contact.verify_get_in_touch().await?;
        let attachment = write_sample_attachment(&session.config().artifacts_dir).await?;
        let message = ContactMessage::sample(attachment);
        contact.fill_name(&message.name).await?;
        contact.fill_email(&message.email).await?;
        contact.fill_subject(&message.subject).await?;
        contact.fill_message(&message.message).await?;
        contact.attach_file(&message.attachment).await?;

        contact.accept_confirmation();
        contact.click_submit().await?;
        contact.verify_confirmation_accepted().await?;
        contact.verify_success().await?;

        contact.click_home().await?;
        home.verify_at_root().await?;
        home.verify_home_visible().await
    })
}

fn add_product_to_cart(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(session);
        home.goto().await?;
        home.click_products().await?;

        let products = ProductsPage::new(session);
        products.verify_all_products_visible().await?;
        products.view_first_product().await?;

        let detail = ProductDetailPage::new(session);
        detail.verify_detail_visible().await?;
        detail.verify_product_name(FIRST_PRODUCT).await?;
        detail.set_quantity(CART_QUANTITY).await?;
        detail.click_add_to_cart().await?;
        detail.verify_added_to_cart().await?;
        detail.click_continue_shopping().await?;
        detail.verify_modal_closed().await?;

        home.click_cart().await?;
        let cart = CartPage::new(session);
        cart.verify_cart_visible().await?;
        cart.verify_product(FIRST_PRODUCT).await?;
        cart.verify_quantity(CART_QUANTITY).await?;
        cart.click_proceed_to_checkout().await?;
        cart.verify_checkout_prompt().await?;
        cart.click_continue_on_cart().await?;
        cart.verify_checkout_prompt_closed().await
    })
}

fn signup_navigation(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(session);
        home.goto().await?;
        home.verify_title().await?;
        home.click_signup_login().await?;

        let login = LoginSignupPage::new(session);
        login.verify_new_user_signup().await?;
        login.fill_signup_name(DEFAULT_USER_NAME).await?;
        login.fill_signup_email(&crate::fixture::unique_email("nav")).await?;
        login.click_signup().await?;
        SignupFormPage::new(session).verify_account_info().await
    })
}

fn capture_screenshots(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let home = HomePage::new(session);
        home.goto().await?;
        home.verify_home_visible().await?;

        let shots = [
            home.screenshot_viewport("home-viewport").await?,
            home.screenshot_full_page("home-full-page").await?,
            home.screenshot_recommended_items("recommended-items").await?,
        ];
        for path in &shots {
            if !tokio::fs::try_exists(path).await? {
                return Err(unexpected(
                    session,
                    "screenshot file to exist",
                    &path.display().to_string(),
                )
                .await);
            }
        }
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod catalogue_tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn test_catalogue_names_are_unique() {
            let suite = catalogue();
            let names = suite.names();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
            assert_eq!(names.len(), 11);
            assert_eq!(names[0], "register_and_delete");
        }

        #[test]
        fn test_every_journey_is_described() {
            for scenario in catalogue().scenarios() {
                assert!(!scenario.description().is_empty(), "{}", scenario.name());
            }
        }

        #[test]
        fn test_filter_selects_login_journeys() {
            let login = catalogue().filter("login");
            assert_eq!(
                login.names(),
                vec![
                    "login_valid_credentials",
                    "login_invalid_credentials",
                    "login_empty_credentials",
                    "login_logout"
                ]
            );
        }
    }
}
