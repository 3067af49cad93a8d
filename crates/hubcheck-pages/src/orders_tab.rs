//! Legacy orders tab with a select-based order form.

use crate::base::BasePage;
use hubcheck_browser::{Locator, Result};

/// Values for the legacy new-order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Option value of the customer select
    pub customer_id: String,
    /// Option value of the product select
    pub product_id: String,
    /// Quantity typed into the form
    pub quantity: String,
}

/// Orders tab of the legacy hub layout.
#[derive(Debug, Clone, Copy)]
pub struct OrdersTab<'a> {
    base: BasePage<'a>,
}

impl<'a> OrdersTab<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Tab in the main navigation.
    pub fn tab() -> Locator {
        Locator::test_id("orders-tab")
    }

    /// Opens the new-order form.
    pub fn add_button() -> Locator {
        Locator::test_id("add-order-btn")
    }

    /// Customer `<select>`.
    pub fn customer_select() -> Locator {
        Locator::test_id("select-customer")
    }

    /// Adds a product line.
    pub fn add_product_button() -> Locator {
        Locator::test_id("add-product-to-order")
    }

    /// Product `<select>` of the new line.
    pub fn product_select() -> Locator {
        Locator::test_id("select-product")
    }

    /// Quantity of the new line.
    pub fn quantity_input() -> Locator {
        Locator::test_id("product-quantity")
    }

    /// Saves the order.
    pub fn save_button() -> Locator {
        Locator::test_id("save-order-btn")
    }

    /// Order search field.
    pub fn search_input() -> Locator {
        Locator::test_id("order-search")
    }

    /// Runs the search.
    pub fn search_button() -> Locator {
        Locator::test_id("search-btn")
    }

    /// Switch to the orders tab.
    pub async fn navigate(&self) -> Result<()> {
        self.base.click(&Self::tab()).await?;
        self.base.expect_url_contains("/orders").await?;
        Ok(())
    }

    /// Fill and save the new-order form.
    pub async fn create(&self, order: &NewOrder) -> Result<()> {
        self.base.click(&Self::add_button()).await?;
        self.base
            .select(&Self::customer_select(), &order.customer_id)
            .await?;
        self.base.click(&Self::add_product_button()).await?;
        self.base
            .select(&Self::product_select(), &order.product_id)
            .await?;
        self.base
            .fill(&Self::quantity_input(), &order.quantity)
            .await?;
        self.base.click(&Self::save_button()).await?;
        tracing::info!(
            "Submitted order for customer {} ({} x {})",
            order.customer_id,
            order.quantity,
            order.product_id
        );
        Ok(())
    }

    /// Replace the search term and run the search.
    pub async fn search(&self, order_number: &str) -> Result<()> {
        let input = Self::search_input();
        self.base.browser().clear(&input).await?;
        self.base.type_into(&input, order_number).await?;
        self.base.click(&Self::search_button()).await
    }
}
