//! Order list: filters, search, pagination, bulk actions and tabs.

use super::{logged_in, scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_db::orders;
use hubcheck_pages::OrderListPage;

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("order-list", "order-list-filter-by-status", filter_by_status),
    scenario!("order-list", "order-list-search-from-database", search_from_database),
    scenario!("order-list", "order-list-clear-filter", clear_filter),
    scenario!("order-list", "order-list-count-matches-database", count_matches_database),
    scenario!("order-list", "order-list-select-and-export", select_and_export),
    scenario!("order-list", "order-list-mark-fifth-order-fulfilled", mark_fifth_order_fulfilled),
    scenario!("order-list", "order-list-pagination", pagination),
    scenario!("order-list", "order-list-status-url-parameter", status_url_parameter),
    scenario!("order-list", "order-list-payment-status-url-parameter", payment_status_url_parameter),
    scenario!("order-list", "order-list-draft-tab", draft_tab),
    scenario!("order-list", "order-list-consumable-tab", consumable_tab),
];

async fn filter_by_status(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.select_status_filter("open").await?;
    page.verify_url_contains("status", "open").await?;
    page.clear_all_filters().await?;
    Ok(())
}

async fn search_from_database(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.clear_all_filters().await?;

    let oldest = ctx
        .db()
        .fetch_optional(&orders::oldest_order_for_company(
            ctx.db().dialect(),
            &ctx.config().app.company,
        ))
        .await?
        .and_then(|row| row.get_str("order_id"))
        .ok_or_else(|| {
            CommandError::Assertion(format!(
                "no orders found for company {}",
                ctx.config().app.company
            ))
        })?;
    tracing::info!("Found first order ID from DB: {}", oldest);

    page.search_by_order_id(&oldest).await?;
    page.verify_order_in_table(&oldest).await?;
    Ok(())
}

async fn clear_filter(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let base = ctx.base(browser.as_ref());
    let page = OrderListPage::new(base);
    page.navigate().await?;
    page.select_status_filter("open").await?;
    page.clear_all_filters().await?;
    base.expect_count_at_least(&OrderListPage::rows(), 1).await?;
    tracing::info!("Verified: clear filter button works correctly");
    Ok(())
}

async fn count_matches_database(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.clear_all_filters().await?;

    let db_count = ctx
        .db()
        .fetch_optional(&orders::order_count_for_company(
            ctx.db().dialect(),
            &ctx.config().app.company,
        ))
        .await?
        .and_then(|row| row.get_i64("total_orders"))
        .ok_or_else(|| CommandError::Assertion("order count query returned no total".to_string()))?;
    tracing::info!("Database order count: {}", db_count);

    let ui_count = page.total_order_count().await?;
    tracing::info!("UI pagination order count: {}", ui_count);
    if i64::try_from(ui_count).ok() != Some(db_count) {
        return Err(CommandError::Assertion(format!(
            "UI shows {ui_count} orders but database has {db_count}"
        )));
    }
    tracing::info!("Verified: database count matches UI count");
    Ok(())
}

async fn select_and_export(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.select_orders(&[0, 1, 2]).await?;
    page.export_selected().await?;
    tracing::info!("Verified: export initiated for selected orders");
    Ok(())
}

async fn mark_fifth_order_fulfilled(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;

    let rows = ctx
        .query_database(&orders::fifth_order_without_subscription(
            ctx.db().dialect(),
            &ctx.config().app.company,
        ))
        .await?;
    if rows.len() > 1 {
        return Err(CommandError::Assertion(format!(
            "fifth-order query returned {} rows",
            rows.len()
        )));
    }
    let Some(order_id) = rows.first().and_then(|row| row.get_str("order_id")) else {
        tracing::warn!("No order found matching the criteria");
        return Ok(());
    };
    tracing::info!("Found 5th order from DB: {}", order_id);

    page.search_by_order_id(&order_id).await?;
    page.verify_order_in_table(&order_id).await?;
    page.select_order_by_order_id(&order_id).await?;
    page.mark_fulfilled().await?;
    tracing::info!("Verified: marked order {} as fulfilled", order_id);
    Ok(())
}

async fn pagination(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.clear_all_filters().await?;

    page.expect_range("1-10").await?;
    page.go_to_next_page().await?;
    page.expect_range("11-20").await?;
    page.go_to_previous_page().await?;
    page.expect_range("1-10").await?;
    page.go_to_last_page().await?;
    page.go_to_first_page().await?;
    page.expect_range("1-10").await?;
    tracing::info!("Verified: all pagination controls work correctly");
    Ok(())
}

async fn status_url_parameter(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.clear_all_filters().await?;
    page.select_status_filter("open").await?;
    page.verify_url_contains("status", "open").await?;
    Ok(())
}

async fn payment_status_url_parameter(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.clear_all_filters().await?;
    page.select_payment_status_filter("paid").await?;
    page.verify_url_contains("payment_status", "paid").await?;
    Ok(())
}

async fn draft_tab(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.click_draft_tab().await?;
    tracing::info!("Verified: draft tab is active");
    Ok(())
}

async fn consumable_tab(ctx: &CommandContext) -> Result<()> {
    let browser = logged_in(ctx).await?;
    let page = OrderListPage::new(ctx.base(browser.as_ref()));
    page.navigate().await?;
    page.click_consumable_tab().await?;
    tracing::info!("Verified: consumable tab is active");
    Ok(())
}
