//! Page objects for the Automation Exercise storefront.
//!
//! Every selector used by the scenarios lives here. Each page object
//! borrows a [`Session`](crate::session::Session), builds its locators in
//! `new` without touching the browser, and exposes `verify_*` methods that
//! only read plus action methods that perform a single user action.

#![warn(missing_docs)]

mod account;
mod cart;
mod contact;
mod home;
mod login_signup;
mod products;
mod signup_form;

pub use account::{AccountPage, ACCOUNT_CREATED, ACCOUNT_DELETED};
pub use cart::CartPage;
pub use contact::{ContactPage, CONTACT_SUCCESS};
pub use home::{HomePage, HOME_TITLE};
pub use login_signup::{LoginSignupPage, DUPLICATE_EMAIL_ERROR, LOGIN_ERROR};
pub use products::{ProductDetailPage, ProductsPage};
pub use signup_form::SignupFormPage;
