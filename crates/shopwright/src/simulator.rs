//! In-memory Automation Exercise storefront.
//!
//! [`StorefrontSimulator`] is a [`MockSite`] that serves the pages, forms and
//! redirects the real site serves for the journeys in the scenario catalogue:
//! signup, account creation and deletion, login and logout, the contact form,
//! the product catalogue and the cart.
//!
//! One simulator is shared by every session of a run, so accounts behave like
//! the real site's shared state: an email registered by one session is taken
//! for all others. Login state and cart contents live in per-session cookies.

use crate::driver::mock::{
    ClickAction, Cookies, FormData, MockElement, MockPage, MockSite, Request, SiteResponse,
};
use crate::fixture::UserFixture;
use crate::pages::{CONTACT_SUCCESS, DUPLICATE_EMAIL_ERROR, LOGIN_ERROR};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const USER_COOKIE: &str = "user";
const PENDING_NAME_COOKIE: &str = "pending_name";
const PENDING_EMAIL_COOKIE: &str = "pending_email";
const CART_COOKIE: &str = "cart";

const CONFIRM_MESSAGE: &str = "Press OK to proceed!";

const COUNTRIES: &[&str] = &[
    "India",
    "United States",
    "Canada",
    "Australia",
    "Israel",
    "New Zealand",
    "Singapore",
];

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A product in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub category: &'static str,
    /// Price in rupees
    pub price: u32,
}

/// Products listed by the simulator
pub const CATALOGUE: &[Product] = &[
    Product {
        id: 1,
        name: "Blue Top",
        category: "Women > Tops",
        price: 500,
    },
    Product {
        id: 2,
        name: "Men Tshirt",
        category: "Men > Tshirts",
        price: 400,
    },
    Product {
        id: 3,
        name: "Sleeveless Dress",
        category: "Women > Dress",
        price: 1000,
    },
    Product {
        id: 4,
        name: "Stylish Dress",
        category: "Women > Dress",
        price: 1500,
    },
];

fn product(id: u32) -> Option<&'static Product> {
    CATALOGUE.iter().find(|p| p.id == id)
}

/// Storefront shared by all mock sessions of a run
#[derive(Debug, Default)]
pub struct StorefrontSimulator {
    accounts: Mutex<BTreeMap<String, Account>>,
    contact_submissions: Mutex<Vec<FormData>>,
}

impl StorefrontSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account
    #[must_use]
    pub fn with_account(self, user: &UserFixture) -> Self {
        self.accounts().insert(
            user.email.to_lowercase(),
            Account {
                name: user.name.clone(),
                email: user.email.clone(),
                password: user.password.clone(),
            },
        );
        self
    }

    /// Whether an account exists for `email`
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.accounts().contains_key(&email.to_lowercase())
    }

    /// Number of registered accounts
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts().len()
    }

    /// Contact forms received so far
    #[must_use]
    pub fn contact_submissions(&self) -> Vec<FormData> {
        self.contact_submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn accounts(&self) -> MutexGuard<'_, BTreeMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_user(&self, cookies: &mut Cookies) -> Option<Account> {
        let email = cookies.get(USER_COOKIE)?.clone();
        let account = self.accounts().get(&email.to_lowercase()).cloned();
        if account.is_none() {
            cookies.remove(USER_COOKIE);
        }
        account
    }

    // ------------------------------------------------------------------
    // Form handlers
    // ------------------------------------------------------------------

    fn login(&self, data: &FormData, cookies: &mut Cookies) -> SiteResponse {
        let email = field(data, "email");
        let password = field(data, "password");
        if email.is_empty() || password.is_empty() {
            // required fields: the browser refuses to submit
            return SiteResponse::Page(login_page(None, LoginNotice::None));
        }
        let account = self.accounts().get(&email.to_lowercase()).cloned();
        match account {
            Some(account) if account.password == password => {
                tracing::debug!(email = %account.email, "simulator login");
                cookies.insert(USER_COOKIE.to_string(), account.email);
                SiteResponse::Redirect("/".to_string())
            }
            _ => SiteResponse::Page(login_page(None, LoginNotice::BadCredentials)),
        }
    }

    fn signup(&self, data: &FormData, cookies: &mut Cookies, user: Option<&Account>) -> SiteResponse {
        let name = field(data, "name");
        let email = field(data, "email");
        if name.is_empty() || email.is_empty() {
            return SiteResponse::Page(login_page(user, LoginNotice::None));
        }
        if self.has_account(email) {
            return SiteResponse::Page(login_page(user, LoginNotice::DuplicateEmail));
        }
        cookies.insert(PENDING_NAME_COOKIE.to_string(), name.to_string());
        cookies.insert(PENDING_EMAIL_COOKIE.to_string(), email.to_string());
        SiteResponse::Page(signup_form_page(name, email))
    }

    fn create_account(&self, data: &FormData, cookies: &mut Cookies) -> SiteResponse {
        let (Some(name), Some(email)) = (
            cookies.get(PENDING_NAME_COOKIE).cloned(),
            cookies.get(PENDING_EMAIL_COOKIE).cloned(),
        ) else {
            return SiteResponse::Redirect("/login".to_string());
        };
        let required = [
            "password",
            "first_name",
            "last_name",
            "address1",
            "state",
            "city",
            "zipcode",
            "mobile_number",
        ];
        if required.iter().any(|f| field(data, f).is_empty()) {
            return SiteResponse::Page(signup_form_page(&name, &email));
        }
        {
            let mut accounts = self.accounts();
            if accounts.contains_key(&email.to_lowercase()) {
                return SiteResponse::Page(login_page(None, LoginNotice::DuplicateEmail));
            }
            accounts.insert(
                email.to_lowercase(),
                Account {
                    name,
                    email: email.clone(),
                    password: field(data, "password").to_string(),
                },
            );
        }
        tracing::debug!(%email, "simulator account created");
        cookies.remove(PENDING_NAME_COOKIE);
        cookies.remove(PENDING_EMAIL_COOKIE);
        cookies.insert(USER_COOKIE.to_string(), email);
        SiteResponse::Redirect("/account_created".to_string())
    }

    fn delete_account(&self, user: Option<Account>, cookies: &mut Cookies) -> SiteResponse {
        let Some(account) = user else {
            return SiteResponse::Redirect("/login".to_string());
        };
        self.accounts().remove(&account.email.to_lowercase());
        cookies.remove(USER_COOKIE);
        tracing::debug!(email = %account.email, "simulator account deleted");
        SiteResponse::Page(
            page("Automation Exercise - Account Created", None)
                .with(
                    MockElement::new("h2")
                        .attr("data-qa", "account-deleted")
                        .text("Account Deleted!"),
                )
                .with(continue_button()),
        )
    }

    fn contact(&self, data: &FormData, user: Option<&Account>) -> SiteResponse {
        if ["name", "email", "message"]
            .iter()
            .any(|f| field(data, f).is_empty())
        {
            return SiteResponse::Page(contact_page(user));
        }
        self.contact_submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(data.clone());
        SiteResponse::Page(
            page("Automation Exercise - Contact Us", user)
                .with(MockElement::new("h2").attr("class", "title text-center").text("Get In Touch"))
                .with(
                    MockElement::new("div")
                        .attr("class", "status alert alert-success")
                        .text(CONTACT_SUCCESS),
                )
                .with(MockElement::link("/", "Home").attr("class", "btn btn-success")),
        )
    }
}

impl MockSite for StorefrontSimulator {
    fn handle(&self, request: Request<'_>, cookies: &mut Cookies) -> SiteResponse {
        let url = request.url();
        let path = url.path().trim_end_matches('/');
        let user = self.current_user(cookies);
        let added = url.query_pairs().any(|(k, v)| k == "added" && v == "1");

        match (request, path) {
            (Request::Get { .. }, "") => SiteResponse::Page(home_page(user.as_ref())),
            (Request::Get { .. }, "/login") => {
                SiteResponse::Page(login_page(user.as_ref(), LoginNotice::None))
            }
            (Request::Post { data, .. }, "/login") => self.login(data, cookies),
            (Request::Post { data, .. }, "/signup") => self.signup(data, cookies, user.as_ref()),
            (Request::Get { .. }, "/signup") => {
                match (cookies.get(PENDING_NAME_COOKIE), cookies.get(PENDING_EMAIL_COOKIE)) {
                    (Some(name), Some(email)) => SiteResponse::Page(signup_form_page(name, email)),
                    _ => SiteResponse::Redirect("/login".to_string()),
                }
            }
            (Request::Post { data, .. }, "/create_account") => self.create_account(data, cookies),
            (Request::Get { .. }, "/account_created") => {
                SiteResponse::Page(account_created_page(user.as_ref()))
            }
            (Request::Get { .. }, "/delete_account") => self.delete_account(user, cookies),
            (Request::Get { .. }, "/logout") => {
                cookies.remove(USER_COOKIE);
                SiteResponse::Redirect("/login".to_string())
            }
            (Request::Get { .. }, "/contact_us") => SiteResponse::Page(contact_page(user.as_ref())),
            (Request::Post { data, .. }, "/contact_us") => self.contact(data, user.as_ref()),
            (Request::Get { .. }, "/products") => SiteResponse::Page(products_page(user.as_ref())),
            (Request::Get { .. }, "/view_cart") => {
                SiteResponse::Page(cart_page(user.as_ref(), &cart_items(cookies)))
            }
            (Request::Get { .. }, "/checkout") if user.is_some() => SiteResponse::Page(
                page("Automation Exercise - Checkout", user.as_ref())
                    .with(MockElement::new("h2").attr("class", "heading").text("Address Details")),
            ),
            (Request::Get { .. }, p) => match p
                .strip_prefix("/product_details/")
                .and_then(|id| id.parse().ok())
                .and_then(product)
            {
                Some(item) => SiteResponse::Page(product_page(user.as_ref(), item, added)),
                None => SiteResponse::Page(not_found_page()),
            },
            (Request::Post { data, .. }, p) => match p
                .strip_prefix("/add_to_cart/")
                .and_then(|id| id.parse().ok())
                .and_then(product)
            {
                Some(item) => {
                    let quantity = field(data, "quantity").parse::<u32>().unwrap_or(1).max(1);
                    add_to_cart(cookies, item.id, quantity);
                    SiteResponse::Redirect(format!("/product_details/{}?added=1", item.id))
                }
                None => SiteResponse::Page(not_found_page()),
            },
        }
    }
}

fn field<'a>(data: &'a FormData, name: &str) -> &'a str {
    data.get(name).map_or("", |v| v.trim())
}

// ----------------------------------------------------------------------------
// Cart cookie: `id:qty;id:qty`
// ----------------------------------------------------------------------------

fn cart_items(cookies: &Cookies) -> Vec<(u32, u32)> {
    cookies
        .get(CART_COOKIE)
        .map(|raw| {
            raw.split(';')
                .filter_map(|item| {
                    let (id, qty) = item.split_once(':')?;
                    Some((id.parse().ok()?, qty.parse().ok()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn add_to_cart(cookies: &mut Cookies, id: u32, quantity: u32) {
    let mut items = cart_items(cookies);
    match items.iter_mut().find(|(item, _)| *item == id) {
        Some((_, qty)) => *qty = qty.saturating_add(quantity),
        None => items.push((id, quantity)),
    }
    let raw = items
        .iter()
        .map(|(id, qty)| format!("{id}:{qty}"))
        .collect::<Vec<_>>()
        .join(";");
    cookies.insert(CART_COOKIE.to_string(), raw);
}

// ----------------------------------------------------------------------------
// Page rendering
// ----------------------------------------------------------------------------

fn header(user: Option<&Account>) -> Vec<MockElement> {
    let mut nav = vec![
        MockElement::link("/", "Home"),
        MockElement::link("/products", "Products"),
        MockElement::link("/view_cart", "Cart"),
    ];
    match user {
        Some(_) => {
            nav.push(MockElement::link("/logout", "Logout"));
            nav.push(MockElement::link("/delete_account", "Delete Account"));
        }
        None => nav.push(MockElement::link("/login", "Signup / Login")),
    }
    nav.push(MockElement::link("/contact_us", "Contact Us"));
    if let Some(account) = user {
        nav.push(MockElement::new("a").text(format!("Logged in as {}", account.name)));
    }
    nav
}

fn page(title: &str, user: Option<&Account>) -> MockPage {
    MockPage::new(title).with_all(header(user))
}

fn continue_button() -> MockElement {
    MockElement::link("/", "Continue")
        .attr("data-qa", "continue-button")
        .attr("class", "btn btn-primary")
}

fn home_page(user: Option<&Account>) -> MockPage {
    page("Automation Exercise", user)
        .with(
            MockElement::new("div")
                .attr("class", "features_items")
                .text("Features Items"),
        )
        .with(
            MockElement::new("div")
                .attr("class", "recommended_items")
                .text("Recommended Items"),
        )
}

enum LoginNotice {
    None,
    BadCredentials,
    DuplicateEmail,
}

fn text_input(kind: &str, name: &str, data_qa: &str, form: &str) -> MockElement {
    MockElement::new("input")
        .attr("type", kind)
        .attr("name", name)
        .attr("data-qa", data_qa)
        .in_form(form)
}

fn login_page(user: Option<&Account>, notice: LoginNotice) -> MockPage {
    let mut login = vec![
        MockElement::new("h2").text("Login to your account"),
        text_input("email", "email", "login-email", "login"),
        text_input("password", "password", "login-password", "login"),
    ];
    if matches!(notice, LoginNotice::BadCredentials) {
        login.push(MockElement::new("p").text(LOGIN_ERROR));
    }
    login.push(
        MockElement::new("button")
            .attr("type", "submit")
            .attr("data-qa", "login-button")
            .text("Login")
            .on_click(ClickAction::Submit {
                form: "login".to_string(),
                action: "/login".to_string(),
            }),
    );

    let mut signup = vec![
        MockElement::new("h2").text("New User Signup!"),
        text_input("text", "name", "signup-name", "signup"),
        text_input("email", "email", "signup-email", "signup"),
    ];
    if matches!(notice, LoginNotice::DuplicateEmail) {
        signup.push(MockElement::new("p").text(DUPLICATE_EMAIL_ERROR));
    }
    signup.push(
        MockElement::new("button")
            .attr("type", "submit")
            .attr("data-qa", "signup-button")
            .text("Signup")
            .on_click(ClickAction::Submit {
                form: "signup".to_string(),
                action: "/signup".to_string(),
            }),
    );

    page("Automation Exercise - Signup / Login", user)
        .with_all(login)
        .with_all(signup)
}

fn form_field(id: &str, name: &str) -> MockElement {
    text_input("text", name, id, "account").attr("id", id)
}

fn select(id: &str, options: impl IntoIterator<Item = String>) -> MockElement {
    MockElement::new("select")
        .attr("id", id)
        .attr("name", id)
        .attr("data-qa", id)
        .options(options)
        .in_form("account")
}

fn signup_form_page(name: &str, email: &str) -> MockPage {
    let radio = |id: &str, value: &str| {
        MockElement::new("input")
            .attr("type", "radio")
            .attr("id", id)
            .attr("name", "title")
            .attr("value", value)
            .in_form("account")
    };
    let checkbox = |id: &str| {
        MockElement::new("input")
            .attr("type", "checkbox")
            .attr("id", id)
            .attr("name", id)
            .attr("value", "1")
            .in_form("account")
    };
    let range = |from: u32, to: u32| (from..=to).map(|n| n.to_string());

    page("Automation Exercise - Signup", None)
        .with(MockElement::new("b").text("Enter Account Information"))
        .with(radio("id_gender1", "Mr"))
        .with(radio("id_gender2", "Mrs"))
        .with(form_field("name", "name").value(name))
        .with(
            MockElement::new("input")
                .attr("type", "email")
                .attr("id", "email")
                .attr("data-qa", "email")
                .value(email)
                .hidden(),
        )
        .with(text_input("password", "password", "password", "account").attr("id", "password"))
        .with(select("days", range(1, 31)))
        .with(select("months", range(1, 12)))
        .with(select("years", range(1900, 2021)))
        .with(checkbox("newsletter"))
        .with(checkbox("optin"))
        .with(form_field("first_name", "first_name"))
        .with(form_field("last_name", "last_name"))
        .with(form_field("company", "company"))
        .with(form_field("address1", "address1").attr("data-qa", "address"))
        .with(form_field("address2", "address2"))
        .with(select("country", COUNTRIES.iter().map(|c| (*c).to_string())))
        .with(form_field("state", "state"))
        .with(form_field("city", "city"))
        .with(form_field("zipcode", "zipcode"))
        .with(form_field("mobile_number", "mobile_number"))
        .with(
            MockElement::new("button")
                .attr("type", "submit")
                .attr("data-qa", "create-account")
                .text("Create Account")
                .on_click(ClickAction::Submit {
                    form: "account".to_string(),
                    action: "/create_account".to_string(),
                }),
        )
}

fn account_created_page(user: Option<&Account>) -> MockPage {
    page("Automation Exercise - Account Created", user)
        .with(
            MockElement::new("h2")
                .attr("data-qa", "account-created")
                .text("Account Created!"),
        )
        .with(continue_button())
}

fn contact_page(user: Option<&Account>) -> MockPage {
    let control = |tag: &str, name: &str| MockElement::new(tag).attr("name", name).in_form("contact");
    page("Automation Exercise - Contact Us", user)
        .with(MockElement::new("h2").attr("class", "title text-center").text("Get In Touch"))
        .with(control("input", "name").attr("type", "text"))
        .with(control("input", "email").attr("type", "email"))
        .with(control("input", "subject").attr("type", "text"))
        .with(control("textarea", "message"))
        .with(control("input", "upload_file").attr("type", "file"))
        .with(
            MockElement::new("input")
                .attr("type", "submit")
                .attr("name", "submit")
                .attr("class", "btn btn-primary")
                .value("Submit")
                .on_click(ClickAction::Confirm {
                    message: CONFIRM_MESSAGE.to_string(),
                    then: Box::new(ClickAction::Submit {
                        form: "contact".to_string(),
                        action: "/contact_us".to_string(),
                    }),
                }),
        )
}

fn products_page(user: Option<&Account>) -> MockPage {
    let mut listing = page("Automation Exercise - All Products", user)
        .with(MockElement::new("h2").attr("class", "title text-center").text("All Products"));
    for item in CATALOGUE {
        listing = listing
            .with(MockElement::new("div").attr("class", "productinfo").text(item.name))
            .with(MockElement::link(format!("/product_details/{}", item.id), "View Product"));
    }
    listing
}

fn product_page(user: Option<&Account>, item: &Product, added: bool) -> MockPage {
    let mut modal = MockElement::new("div")
        .attr("id", "cartModal")
        .attr("class", "modal cart-modal")
        .text("Added! Your product has been added to cart. View Cart");
    let mut close = MockElement::new("button")
        .attr("class", "btn btn-success close-modal btn-block cart-modal")
        .text("Continue Shopping")
        .on_click(ClickAction::Hide(".cart-modal".to_string()));
    if !added {
        modal = modal.hidden();
        close = close.hidden();
    }

    page("Automation Exercise - Product Details", user)
        .with(
            MockElement::new("div")
                .attr("class", "product-information")
                .text(format!(
                    "{} Category: {} Rs. {} Availability: In Stock",
                    item.name, item.category, item.price
                )),
        )
        .with(
            MockElement::new("input")
                .attr("type", "number")
                .attr("id", "quantity")
                .attr("name", "quantity")
                .value("1")
                .in_form("cart"),
        )
        .with(
            MockElement::new("button")
                .attr("type", "button")
                .attr("class", "btn btn-default cart")
                .text("Add to cart")
                .on_click(ClickAction::Submit {
                    form: "cart".to_string(),
                    action: format!("/add_to_cart/{}", item.id),
                }),
        )
        .with(modal)
        .with(close)
}

fn cart_page(user: Option<&Account>, items: &[(u32, u32)]) -> MockPage {
    let mut cart = page("Automation Exercise - Checkout", user)
        .with(MockElement::new("div").attr("id", "cart_info").text("Shopping Cart"));
    if items.is_empty() {
        return cart.with(
            MockElement::new("span")
                .attr("id", "empty_cart")
                .text("Cart is empty! Click here to buy products."),
        );
    }
    for (id, quantity) in items {
        let Some(item) = product(*id) else {
            continue;
        };
        cart = cart
            .with(
                MockElement::link(format!("/product_details/{id}"), item.name)
                    .attr("class", "cart_description"),
            )
            .with(
                MockElement::new("p")
                    .attr("class", "cart_price")
                    .text(format!("Rs. {}", item.price)),
            )
            .with(
                MockElement::new("button")
                    .attr("class", "disabled")
                    .text(quantity.to_string()),
            )
            .with(
                MockElement::new("p")
                    .attr("class", "cart_total_price")
                    .text(format!("Rs. {}", item.price.saturating_mul(*quantity))),
            );
    }
    let checkout = match user {
        Some(_) => ClickAction::Navigate("/checkout".to_string()),
        None => ClickAction::Show(".checkout-modal".to_string()),
    };
    cart.with(
        MockElement::new("a")
            .attr("class", "btn btn-default check_out")
            .text("Proceed To Checkout")
            .on_click(checkout),
    )
    .with(
        MockElement::new("div")
            .attr("id", "checkoutModal")
            .attr("class", "modal checkout-modal")
            .text("Checkout Register / Login account to proceed on checkout. Continue On Cart")
            .hidden(),
    )
    .with(
        MockElement::new("button")
            .attr("class", "btn btn-success close-checkout-modal btn-block checkout-modal")
            .text("Continue On Cart")
            .on_click(ClickAction::Hide(".checkout-modal".to_string()))
            .hidden(),
    )
}

fn not_found_page() -> MockPage {
    MockPage::new("404 Not Found").with(MockElement::new("h1").text("Not Found"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn get(site: &StorefrontSimulator, path: &str, cookies: &mut Cookies) -> SiteResponse {
        let url = Url::parse("https://automationexercise.com").unwrap().join(path).unwrap();
        site.handle(Request::Get { url: &url }, cookies)
    }

    fn post(
        site: &StorefrontSimulator,
        path: &str,
        form: &str,
        fields: &[(&str, &str)],
        cookies: &mut Cookies,
    ) -> SiteResponse {
        let url = Url::parse("https://automationexercise.com").unwrap().join(path).unwrap();
        let data: FormData = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        site.handle(
            Request::Post {
                url: &url,
                form,
                data: &data,
            },
            cookies,
        )
    }

    fn title(response: &SiteResponse) -> &str {
        match response {
            SiteResponse::Page(page) => &page.title,
            SiteResponse::Redirect(to) => to,
        }
    }

    fn has_text(response: &SiteResponse, text: &str) -> bool {
        matches!(response, SiteResponse::Page(page) if page.elements.iter().any(|e| e.text.contains(text)))
    }

    mod account_tests {
        use super::*;

        fn existing() -> UserFixture {
            UserFixture::unique("Playwright User").with_password("TestPassword123!")
        }

        #[test]
        fn test_login_sets_cookie_and_redirects_home() {
            let user = existing();
            let site = StorefrontSimulator::new().with_account(&user);
            let mut cookies = Cookies::new();
            let response = post(
                &site,
                "/login",
                "login",
                &[("email", &user.email), ("password", &user.password)],
                &mut cookies,
            );
            assert_eq!(response, SiteResponse::Redirect("/".to_string()));
            let home = get(&site, "/", &mut cookies);
            assert!(has_text(&home, "Logged in as Playwright User"));
        }

        #[test]
        fn test_wrong_password_shows_error() {
            let user = existing();
            let site = StorefrontSimulator::new().with_account(&user);
            let mut cookies = Cookies::new();
            let response = post(
                &site,
                "/login",
                "login",
                &[("email", &user.email), ("password", "nope")],
                &mut cookies,
            );
            assert!(has_text(&response, LOGIN_ERROR));
            assert!(!cookies.contains_key(USER_COOKIE));
        }

        #[test]
        fn test_empty_login_is_not_submitted() {
            let site = StorefrontSimulator::new();
            let mut cookies = Cookies::new();
            let response = post(&site, "/login", "login", &[], &mut cookies);
            assert!(!has_text(&response, LOGIN_ERROR));
            assert!(has_text(&response, "Login to your account"));
        }

        #[test]
        fn test_duplicate_signup() {
            let user = existing();
            let site = StorefrontSimulator::new().with_account(&user);
            let mut cookies = Cookies::new();
            let response = post(
                &site,
                "/signup",
                "signup",
                &[("name", "Someone"), ("email", &user.email.to_uppercase())],
                &mut cookies,
            );
            assert!(has_text(&response, DUPLICATE_EMAIL_ERROR));
        }

        #[test]
        fn test_create_then_delete() {
            let site = StorefrontSimulator::new();
            let mut cookies = Cookies::new();
            let email = "fresh@mail.com";
            let form = post(
                &site,
                "/signup",
                "signup",
                &[("name", "Fresh"), ("email", email)],
                &mut cookies,
            );
            assert_eq!(title(&form), "Automation Exercise - Signup");

            let incomplete = post(&site, "/create_account", "account", &[("password", "x")], &mut cookies);
            assert_eq!(title(&incomplete), "Automation Exercise - Signup");
            assert!(!site.has_account(email));

            let fields = [
                ("password", "pw"),
                ("first_name", "F"),
                ("last_name", "L"),
                ("address1", "A"),
                ("state", "S"),
                ("city", "C"),
                ("zipcode", "Z"),
                ("mobile_number", "M"),
            ];
            let created = post(&site, "/create_account", "account", &fields, &mut cookies);
            assert_eq!(created, SiteResponse::Redirect("/account_created".to_string()));
            assert!(site.has_account(email));

            let deleted = get(&site, "/delete_account", &mut cookies);
            assert!(has_text(&deleted, "Account Deleted!"));
            assert!(!site.has_account(email));

            let again = get(&site, "/delete_account", &mut cookies);
            assert_eq!(again, SiteResponse::Redirect("/login".to_string()));
        }

        #[test]
        fn test_logout_clears_session() {
            let user = existing();
            let site = StorefrontSimulator::new().with_account(&user);
            let mut cookies = Cookies::new();
            cookies.insert(USER_COOKIE.to_string(), user.email.clone());
            assert_eq!(
                get(&site, "/logout", &mut cookies),
                SiteResponse::Redirect("/login".to_string())
            );
            assert!(!has_text(&get(&site, "/", &mut cookies), "Logged in as"));
        }
    }

    mod shop_tests {
        use super::*;

        #[test]
        fn test_add_to_cart_accumulates() {
            let site = StorefrontSimulator::new();
            let mut cookies = Cookies::new();
            let response = post(&site, "/add_to_cart/1", "cart", &[("quantity", "5")], &mut cookies);
            assert_eq!(
                response,
                SiteResponse::Redirect("/product_details/1?added=1".to_string())
            );
            post(&site, "/add_to_cart/1", "cart", &[("quantity", "2")], &mut cookies);
            assert_eq!(cart_items(&cookies), vec![(1, 7)]);
            let cart = get(&site, "/view_cart", &mut cookies);
            assert!(has_text(&cart, "Rs. 3500"));
        }

        #[test]
        fn test_huge_quantities_saturate() {
            let site = StorefrontSimulator::new();
            let mut cookies = Cookies::new();
            let max = u32::MAX.to_string();
            post(&site, "/add_to_cart/1", "cart", &[("quantity", max.as_str())], &mut cookies);
            post(&site, "/add_to_cart/1", "cart", &[("quantity", max.as_str())], &mut cookies);
            assert_eq!(cart_items(&cookies), vec![(1, u32::MAX)]);
            let cart = get(&site, "/view_cart", &mut cookies);
            assert!(has_text(&cart, &format!("Rs. {}", u32::MAX)));
        }

        #[test]
        fn test_empty_cart() {
            let site = StorefrontSimulator::new();
            let cart = get(&site, "/view_cart", &mut Cookies::new());
            assert!(has_text(&cart, "Cart is empty!"));
        }

        #[test]
        fn test_unknown_product_is_not_found() {
            let site = StorefrontSimulator::new();
            let response = get(&site, "/product_details/99", &mut Cookies::new());
            assert_eq!(title(&response), "404 Not Found");
        }

        #[test]
        fn test_contact_submission_is_recorded() {
            let site = StorefrontSimulator::new();
            let response = post(
                &site,
                "/contact_us",
                "contact",
                &[("name", "P"), ("email", "p@test.com"), ("message", "hi"), ("upload_file", "a.txt")],
                &mut Cookies::new(),
            );
            assert!(has_text(&response, CONTACT_SUCCESS));
            assert_eq!(site.contact_submissions().len(), 1);
        }
    }
}
