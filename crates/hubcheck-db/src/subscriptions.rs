//! Subscription and recurring-payment queries.

use crate::descriptor::{Dialect, QueryBuilder, QueryDescriptor};

const SUBSCRIPTION_COLUMNS: &str = "id, order_id, subscription_id, serial_number, \
subscription_status, subscription_start, subscription_end, company_id, subscription_price, \
subscription_duration, subscription_frequency, status, customer_id, subscription_type, \
subscription_frequency_interval, is_bundle, subscription_extension_price";

/// Subscription by its public subscription id.
#[must_use]
pub fn subscription_by_id(dialect: Dialect, subscription_id: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT ")
        .push(SUBSCRIPTION_COLUMNS)
        .push(" FROM subscriptions WHERE subscription_id = ")
        .push_bind(subscription_id);
    q.build()
}

/// Pending recurring payments of a subscription.
///
/// A payment counts when it is not deleted, not yet invoiced (directly or
/// cumulated), unsettled, enabled and not failed.
#[must_use]
pub fn active_recurring_payments(dialect: Dialect, subscription_id: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM recurring_payments WHERE subscription_id = ")
        .push_bind(subscription_id)
        .push(
            " AND deleted_at IS NULL AND invoice_id IS NULL AND cumulated_invoice_id IS NULL \
             AND payment_settled = ",
        )
        .push_bind(false)
        .push(" AND enabled = ")
        .push_bind(true)
        .push(" AND failed = ")
        .push_bind(false);
    q.build()
}

/// Subscriptions linked to an order, newest first.
#[must_use]
pub fn subscriptions_by_order_id(dialect: Dialect, order_id: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push(
        "SELECT id, order_id, subscription_id, serial_number, subscription_status, \
         subscription_type, status FROM subscriptions WHERE order_id = ",
    )
    .push_bind(order_id)
    .push(" ORDER BY created_at DESC");
    q.build()
}
