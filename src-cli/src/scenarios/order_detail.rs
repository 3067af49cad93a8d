//! Order detail: open a database-selected order, add a note and create the
//! missing subscriptions.

use super::{logged_in, scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_core::OrderId;
use hubcheck_db::{orders, subscriptions};
use hubcheck_pages::{OrderDetailPage, OrderListPage};

pub(super) const SCENARIOS: &[Scenario] = &[scenario!(
    "order-detail",
    "order-detail-notes-and-subscriptions",
    notes_and_subscriptions
)];

async fn notes_and_subscriptions(ctx: &CommandContext) -> Result<()> {
    let dialect = ctx.db().dialect();
    let order_id = ctx
        .db()
        .fetch_optional(&orders::fifth_order_without_subscription(
            dialect,
            &ctx.config().app.company,
        ))
        .await?
        .and_then(|row| row.get_str("order_id"))
        .ok_or_else(|| CommandError::Assertion("no order found for testing".to_string()))?;
    let order_id = OrderId::new(order_id)?;
    tracing::info!("Found order from DB: {}", order_id);

    // Open from the list
    let browser = logged_in(ctx).await?;
    let base = ctx.base(browser.as_ref());
    let list = OrderListPage::new(base);
    list.navigate().await?;
    list.search_by_order_id(order_id.as_str()).await?;
    list.open_order(order_id.as_str()).await?;

    let detail = OrderDetailPage::new(base, order_id.clone());
    detail.verify_url_contains_order_id().await?;
    tracing::info!("Verified: opened order detail page");

    let note = format!(
        "Automated test note - {}",
        chrono::Utc::now().timestamp_millis()
    );
    detail.create_note(&note).await?;

    detail.collect_subscription_types().await?;
    let pending: Vec<usize> = detail
        .product_table()
        .await?
        .into_iter()
        .filter(|row| row.can_create_subscription)
        .map(|row| row.index)
        .collect();
    tracing::info!("{} rows need a subscription", pending.len());

    for row in pending {
        detail.create_subscription_for_row(row).await?;
        let subscription_id = detail.subscription_id_at(row).await?;
        tracing::info!("Created subscription with ID: {}", subscription_id);

        let subscription = ctx
            .await_row(
                &subscriptions::subscription_by_id(dialect, subscription_id.as_str()),
                &format!("subscription {subscription_id}"),
            )
            .await?;
        tracing::info!(
            "Subscription {}: order {}, status {}, type {}",
            subscription_id,
            subscription.get_str("order_id").unwrap_or_default(),
            subscription.get_str("subscription_status").unwrap_or_default(),
            subscription.get_str("subscription_type").unwrap_or_default()
        );

        let payments = ctx
            .query_database(&subscriptions::active_recurring_payments(
                dialect,
                subscription_id.as_str(),
            ))
            .await?;
        if payments.is_empty() {
            tracing::warn!(
                "Subscription {} does not have recurring payments enabled yet",
                subscription_id
            );
        } else {
            tracing::info!(
                "Verified: subscription {} has {} recurring payments enabled",
                subscription_id,
                payments.len()
            );
        }
    }
    Ok(())
}
