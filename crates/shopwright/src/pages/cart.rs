//! `/view_cart`: cart contents and the checkout prompt.

use crate::expect::expect;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::session::Session;

/// Shopping cart
#[derive(Debug, Clone)]
pub struct CartPage<'s> {
    session: &'s Session,
    cart_info: Locator,
    empty_cart: Locator,
    description: Locator,
    quantity: Locator,
    proceed_to_checkout: Locator,
    checkout_modal: Locator,
    continue_on_cart: Locator,
}

impl<'s> CartPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            cart_info: Locator::new("#cart_info"),
            empty_cart: Locator::new("#empty_cart"),
            description: Locator::new(".cart_description"),
            quantity: Locator::new("button.disabled"),
            proceed_to_checkout: Locator::new("a.check_out"),
            checkout_modal: Locator::new("#checkoutModal"),
            continue_on_cart: Locator::new("button.close-checkout-modal"),
        }
    }

    /// Open `/view_cart` directly
    pub async fn goto(&self) -> E2eResult<()> {
        self.session.goto("/view_cart").await
    }

    /// The cart table is shown
    pub async fn verify_cart_visible(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.cart_info))
            .to_be_visible()
            .await
    }

    /// "Cart is empty!" is shown
    pub async fn verify_empty(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.empty_cart))
            .to_be_visible()
            .await
    }

    /// The single cart line names `product`
    pub async fn verify_product(&self, product: &str) -> E2eResult<()> {
        expect(self.session.locate(&self.description))
            .to_contain_text(product)
            .await
    }

    /// The single cart line has `quantity` items
    pub async fn verify_quantity(&self, quantity: u32) -> E2eResult<()> {
        expect(self.session.locate(&self.quantity))
            .to_have_text(&quantity.to_string())
            .await
    }

    /// Checkout asks an anonymous visitor to register or log in
    pub async fn verify_checkout_prompt(&self) -> E2eResult<()> {
        let modal = expect(self.session.locate(&self.checkout_modal));
        modal.to_be_visible().await?;
        modal.to_contain_text("Register / Login account to proceed on checkout.").await
    }

    /// Checkout prompt is closed
    pub async fn verify_checkout_prompt_closed(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.checkout_modal))
            .to_be_hidden()
            .await
    }

    /// Start checkout; guests get the register/login modal instead
    pub async fn click_proceed_to_checkout(&self) -> E2eResult<()> {
        self.session.locate(&self.proceed_to_checkout).click().await
    }

    /// Close the checkout modal
    pub async fn click_continue_on_cart(&self) -> E2eResult<()> {
        self.session.locate(&self.continue_on_cart).click().await
    }
}

impl PageObject for CartPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "cart"
    }

    fn url_pattern(&self) -> &str {
        "/view_cart"
    }

    fn landmark(&self) -> &Locator {
        &self.cart_info
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("cart_info", &self.cart_info),
            ("empty_cart", &self.empty_cart),
            ("description", &self.description),
            ("quantity", &self.quantity),
            ("proceed_to_checkout", &self.proceed_to_checkout),
            ("checkout_modal", &self.checkout_modal),
            ("continue_on_cart", &self.continue_on_cart),
        ]
    }
}
