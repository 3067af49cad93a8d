//! Database command examples over the orders table.

use super::{scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_core::OrderId;
use hubcheck_db::orders;

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("order-database", "order-database-recent-orders", recent_orders),
    scenario!("order-database", "order-database-count-orders", count_orders),
    scenario!("order-database", "order-database-orders-by-status", orders_by_status),
    scenario!("order-database", "order-database-verify-order-exists", verify_order_exists),
    scenario!("order-database", "order-database-order-by-id", order_by_id),
    scenario!("order-database", "order-database-orders-for-company", orders_for_company),
    scenario!("order-database", "order-database-counts-by-status", counts_by_status),
    scenario!("order-database", "order-database-required-fields", required_fields),
];

const REQUIRED_FIELDS: [&str; 6] = ["id", "order_id", "status", "amount", "currency", "created_at"];

fn assertion(message: impl Into<String>) -> CommandError {
    CommandError::Assertion(message.into())
}

async fn recent_orders(ctx: &CommandContext) -> Result<()> {
    let orders = ctx.get_recent_orders(5).await?;
    let first = orders
        .first()
        .ok_or_else(|| assertion("expected at least one recent order"))?;
    tracing::info!(
        "First order ID: {}, status: {}",
        first.get_str("order_id").unwrap_or_default(),
        first.get_str("status").unwrap_or_default()
    );
    Ok(())
}

async fn count_orders(ctx: &CommandContext) -> Result<()> {
    let total = ctx.count_orders().await?;
    if total <= 0 {
        return Err(assertion("expected the database to contain orders"));
    }
    tracing::info!("Database has {} orders", total);
    Ok(())
}

async fn orders_by_status(ctx: &CommandContext) -> Result<()> {
    let orders = ctx.get_orders_by_status("completed").await?;
    if let Some(first) = orders.first() {
        let status = first.get_str("status").unwrap_or_default();
        if status != "completed" {
            return Err(assertion(format!(
                "expected status completed, got {status:?}"
            )));
        }
    }
    Ok(())
}

async fn verify_order_exists(ctx: &CommandContext) -> Result<()> {
    let Some(order_id) = ctx
        .get_recent_orders(1)
        .await?
        .first()
        .and_then(|row| row.get_str("order_id"))
    else {
        tracing::warn!("No orders to verify");
        return Ok(());
    };
    let order_id = OrderId::new(order_id)?;
    let row = ctx.verify_order_exists(&order_id).await?;
    if row.get_str("order_id").as_deref() != Some(order_id.as_str()) {
        return Err(assertion(format!("lookup for {order_id} returned another order")));
    }
    tracing::info!("Order verified successfully");
    Ok(())
}

async fn order_by_id(ctx: &CommandContext) -> Result<()> {
    if let Some(order) = ctx.get_order_by_id(1).await? {
        if order.get_i64("id") != Some(1) {
            return Err(assertion("order lookup by id 1 returned another row"));
        }
    }
    Ok(())
}

async fn orders_for_company(ctx: &CommandContext) -> Result<()> {
    let orders = ctx.get_orders_by_company(1).await?;
    if let Some(other) = orders.iter().find(|o| o.get_i64("company_id") != Some(1)) {
        return Err(assertion(format!(
            "order {} does not belong to company 1",
            other.get_str("order_id").unwrap_or_default()
        )));
    }
    Ok(())
}

async fn counts_by_status(ctx: &CommandContext) -> Result<()> {
    let rows = ctx
        .query_database(&orders::order_counts_by_status(ctx.db().dialect()))
        .await?;
    for row in &rows {
        tracing::info!(
            "{}: {} orders",
            row.get_str("status").unwrap_or_default(),
            row.get_i64("count").unwrap_or_default()
        );
    }
    Ok(())
}

async fn required_fields(ctx: &CommandContext) -> Result<()> {
    let recent = ctx.get_recent_orders(1).await?;
    let Some(order) = recent.first() else {
        tracing::warn!("No orders to inspect");
        return Ok(());
    };
    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !order.contains(field))
        .collect();
    if !missing.is_empty() {
        return Err(assertion(format!("order is missing fields: {}", missing.join(", "))));
    }
    tracing::info!("All required fields present");
    Ok(())
}
