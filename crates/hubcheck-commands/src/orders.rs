//! Commands for the legacy orders tab.

use crate::context::CommandContext;
use crate::error::Result;
use hubcheck_pages::{NewOrder, OrdersTab};

impl CommandContext {
    /// Open the legacy orders tab.
    pub async fn navigate_to_orders(&self) -> Result<()> {
        let browser = self.browser().await?;
        OrdersTab::new(self.base(browser.as_ref())).navigate().await?;
        tracing::info!("Verified: navigated to orders");
        Ok(())
    }

    /// Create an order through the tab's form.
    pub async fn create_order(&self, order: &NewOrder) -> Result<()> {
        let browser = self.browser().await?;
        OrdersTab::new(self.base(browser.as_ref()))
            .create(order)
            .await?;
        Ok(())
    }

    /// Search the tab for `order_number`.
    pub async fn search_order(&self, order_number: &str) -> Result<()> {
        let browser = self.browser().await?;
        OrdersTab::new(self.base(browser.as_ref()))
            .search(order_number)
            .await?;
        tracing::info!("Searched orders for {}", order_number);
        Ok(())
    }
}
