use super::{logged_in, scenario, Scenario};
use hubcheck_commands::{CommandContext, Result};
use hubcheck_pages::{CreationMode, OrderCreationPage, PageModel, SubscriptionItem};

pub(super) const SCENARIOS: &[Scenario] = &[scenario!(
    "billing-address",
    "billing-address-fill-and-verify",
    fill_and_verify
)];

/// Fill the billing form from the fixture and check every control kept its value.
async fn fill_and_verify(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderCreationPage::new(ctx.base(browser.as_ref()), CreationMode::Order);
    page.open().await?;

    // The billing section appears once an item exists
    page.add_subscription_item(&SubscriptionItem::default())
        .await?;

    let address = &ctx.fixtures().test_data.billing_address;
    let email = page.fill_billing_address(address).await?;
    page.verify_billing_address(address, &email).await?;
    tracing::info!("Billing address form validation completed");
    Ok(())
}
