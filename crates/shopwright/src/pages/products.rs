//! `/products` listing and `/product_details/:id`.

use crate::expect::expect;
use crate::locator::{Locator, Selector};
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::session::Session;

/// Product catalogue
#[derive(Debug, Clone)]
pub struct ProductsPage<'s> {
    session: &'s Session,
    heading: Locator,
    products: Locator,
    view_product_links: Locator,
}

impl<'s> ProductsPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            heading: Locator::from_selector(Selector::css_with_text("h2", "All Products")),
            products: Locator::new(".productinfo"),
            view_product_links: Locator::role("link", "View Product"),
        }
    }

    /// "All Products" heading and at least one product card are shown
    pub async fn verify_all_products_visible(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.heading))
            .to_be_visible()
            .await?;
        expect(self.session.locate(&self.products).first())
            .to_be_visible()
            .await
    }

    /// Names shown on the product cards, in listing order
    pub async fn product_names(&self) -> E2eResult<Vec<String>> {
        self.session.locate(&self.products).all_text_contents().await
    }

    /// Open the detail page of the first listed product
    pub async fn view_first_product(&self) -> E2eResult<()> {
        self.session
            .locate(&self.view_product_links)
            .first()
            .click()
            .await
    }

    /// Open the detail page of product `id`
    pub async fn view_product(&self, id: u32) -> E2eResult<()> {
        let link = Locator::new(format!("a[href=\"/product_details/{id}\"]"));
        self.session.locate(&link).click().await
    }
}

impl PageObject for ProductsPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "products"
    }

    fn url_pattern(&self) -> &str {
        "/products"
    }

    fn landmark(&self) -> &Locator {
        &self.heading
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("heading", &self.heading),
            ("products", &self.products),
            ("view_product_links", &self.view_product_links),
        ]
    }
}

/// One product with its quantity picker
#[derive(Debug, Clone)]
pub struct ProductDetailPage<'s> {
    session: &'s Session,
    information: Locator,
    quantity: Locator,
    add_to_cart: Locator,
    added_modal: Locator,
    continue_shopping: Locator,
}

impl<'s> ProductDetailPage<'s> {
    /// Bind the page locators to `session`; no I/O happens here
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            information: Locator::new(".product-information"),
            quantity: Locator::new("#quantity"),
            add_to_cart: Locator::new("button.cart"),
            added_modal: Locator::new("#cartModal"),
            continue_shopping: Locator::new("button.close-modal"),
        }
    }

    /// Product information block is shown
    pub async fn verify_detail_visible(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.information))
            .to_be_visible()
            .await
    }

    /// Information block names the product
    pub async fn verify_product_name(&self, name: &str) -> E2eResult<()> {
        expect(self.session.locate(&self.information))
            .to_contain_text(name)
            .await
    }

    /// "Added!" confirmation modal is open
    pub async fn verify_added_to_cart(&self) -> E2eResult<()> {
        let modal = expect(self.session.locate(&self.added_modal));
        modal.to_be_visible().await?;
        modal.to_contain_text("Your product has been added to cart.").await
    }

    /// Confirmation modal is closed
    pub async fn verify_modal_closed(&self) -> E2eResult<()> {
        expect(self.session.locate(&self.added_modal))
            .to_be_hidden()
            .await
    }

    /// Replace the quantity to add
    pub async fn set_quantity(&self, quantity: u32) -> E2eResult<()> {
        self.session
            .locate(&self.quantity)
            .fill(&quantity.to_string())
            .await
    }

    /// Add the product at the chosen quantity
    pub async fn click_add_to_cart(&self) -> E2eResult<()> {
        self.session.locate(&self.add_to_cart).click().await
    }

    /// Dismiss the "Added!" modal
    pub async fn click_continue_shopping(&self) -> E2eResult<()> {
        self.session.locate(&self.continue_shopping).click().await
    }
}

impl PageObject for ProductDetailPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn page_name(&self) -> &'static str {
        "product-detail"
    }

    fn url_pattern(&self) -> &str {
        "/product_details/:id"
    }

    fn landmark(&self) -> &Locator {
        &self.information
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        vec![
            ("information", &self.information),
            ("quantity", &self.quantity),
            ("add_to_cart", &self.add_to_cart),
            ("added_modal", &self.added_modal),
            ("continue_shopping", &self.continue_shopping),
        ]
    }
}
