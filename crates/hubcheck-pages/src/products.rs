//! Products module of the hub.

use crate::base::{BasePage, PageModel};
use hubcheck_browser::{Locator, Result};
use hubcheck_core::SampleProduct;

/// Toast shown after a product was saved.
pub const PRODUCT_CREATED: &str = "Product created successfully";

/// Products tab: create and search products.
#[derive(Debug, Clone, Copy)]
pub struct ProductsPage<'a> {
    base: BasePage<'a>,
}

impl<'a> ProductsPage<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Tab in the main navigation.
    pub fn tab() -> Locator {
        Locator::test_id("products-tab")
    }

    /// Opens the new-product form.
    pub fn add_button() -> Locator {
        Locator::test_id("add-product-btn")
    }

    /// Name field of the form.
    pub fn name_input() -> Locator {
        Locator::test_id("product-name-input")
    }

    /// SKU field of the form.
    pub fn sku_input() -> Locator {
        Locator::test_id("product-sku-input")
    }

    /// Price field of the form.
    pub fn price_input() -> Locator {
        Locator::test_id("product-price-input")
    }

    /// Stock field of the form.
    pub fn stock_input() -> Locator {
        Locator::test_id("product-stock-input")
    }

    /// Saves the form.
    pub fn save_button() -> Locator {
        Locator::test_id("save-product-btn")
    }

    /// Product search field.
    pub fn search_input() -> Locator {
        Locator::test_id("product-search")
    }

    /// Runs the search.
    pub fn search_button() -> Locator {
        Locator::test_id("search-btn")
    }

    /// Product result table.
    pub fn table() -> Locator {
        Locator::test_id("product-table")
    }

    /// Success toast after saving.
    pub fn created_message() -> Locator {
        Locator::text(PRODUCT_CREATED).first()
    }

    /// Switch to the products tab.
    pub async fn navigate(&self) -> Result<()> {
        self.base.click(&Self::tab()).await?;
        self.base.expect_url_contains("/products").await?;
        tracing::info!("Verified: navigated to products");
        Ok(())
    }

    /// Fill and save the new-product form, then wait for the success toast.
    pub async fn create(&self, product: &SampleProduct) -> Result<()> {
        self.base.click(&Self::add_button()).await?;
        self.base.fill(&Self::name_input(), &product.name).await?;
        self.base.fill(&Self::sku_input(), &product.sku).await?;
        self.base.fill(&Self::price_input(), &product.price).await?;
        if !product.stock.is_empty() {
            self.base.fill(&Self::stock_input(), &product.stock).await?;
        }
        self.base.click(&Self::save_button()).await?;
        self.base.expect_visible(&Self::created_message()).await?;
        tracing::info!("Verified: product {} created", product.sku);
        Ok(())
    }

    /// Replace the search term, run the search and wait for the table.
    pub async fn search(&self, term: &str) -> Result<()> {
        let input = Self::search_input();
        self.base.browser().clear(&input).await?;
        self.base.type_into(&input, term).await?;
        self.base
            .click_revealing(&Self::search_button(), &Self::table())
            .await
    }

    /// Expect the product table to mention `text`.
    pub async fn expect_in_table(&self, text: &str) -> Result<()> {
        self.base.expect_text(&Self::table(), text).await?;
        tracing::info!("Verified: product table contains {:?}", text);
        Ok(())
    }

    /// Expect `text` anywhere on the page.
    pub async fn expect_listed(&self, text: &str) -> Result<()> {
        self.base
            .expect_visible(&Locator::text(text).first())
            .await
    }
}

#[async_trait::async_trait]
impl PageModel for ProductsPage<'_> {
    fn name(&self) -> &'static str {
        "products"
    }

    fn path(&self) -> String {
        "products".to_string()
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.base.expect_visible(&Self::add_button()).await
    }
}
