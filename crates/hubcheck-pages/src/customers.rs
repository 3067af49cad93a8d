//! Customers module of the hub.

use crate::base::{BasePage, PageModel};
use hubcheck_browser::{Locator, Result};
use hubcheck_core::SampleCustomer;

/// Toast shown after a customer was saved.
pub const CUSTOMER_CREATED: &str = "Customer created successfully";

/// Customers tab: create and search customers.
#[derive(Debug, Clone, Copy)]
pub struct CustomersPage<'a> {
    base: BasePage<'a>,
}

impl<'a> CustomersPage<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Tab in the main navigation.
    pub fn tab() -> Locator {
        Locator::test_id("customers-tab")
    }

    /// Opens the new-customer form.
    pub fn add_button() -> Locator {
        Locator::test_id("add-customer-btn")
    }

    /// First name field of the form.
    pub fn first_name_input() -> Locator {
        Locator::test_id("first-name-input")
    }

    /// Last name field of the form.
    pub fn last_name_input() -> Locator {
        Locator::test_id("last-name-input")
    }

    /// Email field of the form.
    pub fn email_input() -> Locator {
        Locator::test_id("email-input")
    }

    /// Saves the form.
    pub fn save_button() -> Locator {
        Locator::test_id("save-customer-btn")
    }

    /// Customer search field.
    pub fn search_input() -> Locator {
        Locator::test_id("customer-search")
    }

    /// Runs the search.
    pub fn search_button() -> Locator {
        Locator::test_id("search-btn")
    }

    /// Customer result table.
    pub fn table() -> Locator {
        Locator::test_id("customer-table")
    }

    /// Success toast after saving.
    pub fn created_message() -> Locator {
        Locator::text(CUSTOMER_CREATED).first()
    }

    /// Switch to the customers tab.
    pub async fn navigate(&self) -> Result<()> {
        self.base.click(&Self::tab()).await?;
        self.base.expect_url_contains("/customers").await?;
        tracing::info!("Verified: navigated to customers");
        Ok(())
    }

    /// Fill and save the new-customer form, then wait for the success toast.
    pub async fn create(&self, customer: &SampleCustomer) -> Result<()> {
        self.base.click(&Self::add_button()).await?;
        self.base
            .fill(&Self::first_name_input(), &customer.first_name)
            .await?;
        self.base
            .fill(&Self::last_name_input(), &customer.last_name)
            .await?;
        self.base.fill(&Self::email_input(), &customer.email).await?;
        self.base.click(&Self::save_button()).await?;
        self.base.expect_visible(&Self::created_message()).await?;
        tracing::info!("Verified: customer {} created", customer.email);
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

    /// Expect the customer table to mention `text`.
    pub async fn expect_in_table(&self, text: &str) -> Result<()> {
        self.base.expect_text(&Self::table(), text).await?;
        tracing::info!("Verified: customer table contains {:?}", text);
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
impl PageModel for CustomersPage<'_> {
    fn name(&self) -> &'static str {
        "customers"
    }

    fn path(&self) -> String {
        "customers".to_string()
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.base.expect_visible(&Self::add_button()).await
    }
}
