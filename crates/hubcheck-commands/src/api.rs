//! API health commands.

use crate::context::CommandContext;
use crate::error::Result;
use hubcheck_browser::state::origin_of;
use hubcheck_browser::BrowserActions;
use hubcheck_health::HealthStatus;

/// Endpoint name of the hub API.
pub const HUB_API: &str = "hub-api";
/// Endpoint name of the checkout API.
pub const CHECKOUT_API: &str = "checkout-api";

impl CommandContext {
    /// Check every configured endpoint, failing on the first unhealthy one.
    pub async fn check_api_health(&self) -> Result<Vec<HealthStatus>> {
        let statuses = self.health().check_all().await?;
        tracing::info!("Verified: all {} APIs are healthy", statuses.len());
        Ok(statuses)
    }

    /// Health of the hub API.
    pub async fn check_hub_api(&self) -> Result<HealthStatus> {
        Ok(self.health().check_named(HUB_API).await?)
    }

    /// Health of the checkout API.
    pub async fn check_checkout_api(&self) -> Result<HealthStatus> {
        Ok(self.health().check_named(CHECKOUT_API).await?)
    }

    /// Open a link the application generated, after confirming it answers
    /// with a success or redirect status.
    ///
    /// Returns the URL the browser landed on, which must be on the link's
    /// origin.
    pub async fn open_generated_link(
        &self,
        browser: &dyn BrowserActions,
        name: &str,
        link: &str,
    ) -> Result<String> {
        let status = self.health().check_reachable(name, link).await?;
        let origin = origin_of(link)?;
        let base = self.base(browser);
        base.goto(link).await?;
        let landed = base.expect_url_contains(&origin).await?;
        tracing::info!("Verified: {} answered {} and opened at {}", name, status, landed);
        Ok(landed)
    }
}
