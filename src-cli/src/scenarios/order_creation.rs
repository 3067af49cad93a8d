//! Quote creation with one subscription item and a billing address.

use super::{logged_in, scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_db::draft_orders;
use hubcheck_pages::{CreationMode, OrderCreationPage, PageModel, SubscriptionItem};

pub(super) const SCENARIOS: &[Scenario] = &[scenario!(
    "order-creation",
    "order-creation-quote-with-subscription",
    quote_with_subscription
)];

async fn quote_with_subscription(ctx: &CommandContext) -> Result<()> {
    ctx.check_api_health().await?;

    let browser = logged_in(ctx).await?;
    let base = ctx.base(browser.as_ref());
    let page = OrderCreationPage::new(base, CreationMode::Quote);
    page.open().await?;

    let item = SubscriptionItem {
        quantity: "2".to_string(),
        ..SubscriptionItem::default()
    };
    page.add_subscription_item(&item).await?;
    tracing::info!("Draft item added");

    page.fill_billing_address(&ctx.fixtures().test_data.billing_address)
        .await?;
    let draft_id = page.submit().await?;

    let draft = ctx
        .await_row(
            &draft_orders::draft_order_by_draft_id(ctx.db().dialect(), &draft_id),
            &format!("draft order {draft_id}"),
        )
        .await?;
    let checkout_link = draft
        .get_str("order_checkout_link")
        .filter(|link| !link.is_empty())
        .ok_or_else(|| {
            CommandError::Assertion(format!("draft order {draft_id} has no checkout link"))
        })?;
    tracing::info!("Verified: checkout link found: {}", checkout_link);

    let draft_url = base.url().await?;
    ctx.open_generated_link(browser.as_ref(), "checkout-link", &checkout_link)
        .await?;
    base.goto(&draft_url).await?;
    tracing::info!("Verified: draft order {} created successfully", draft_id);
    Ok(())
}
