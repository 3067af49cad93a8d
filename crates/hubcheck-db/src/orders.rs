//! Order queries.
//!
//! Company-scoped queries resolve the company through
//! `general_company_settings.name`, the label the hub shows in its tenant
//! switcher.

use crate::descriptor::{Dialect, QueryBuilder, QueryDescriptor};

/// Columns selected by the company-scoped order queries.
pub const ORDER_COLUMNS: &str = "o.order_id, o.company_id, o.payment_provider, \
o.payment_method_token, o.status, o.transaction_id, o.payment_status, o.origin, \
o.shipping_method, o.subscription_type, o.replace_order_id, o.parent_id, \
o.order_customer_id, o.created_at";

/// Columns read by the database connection check.
pub const SAMPLE_COLUMNS: &str = "id, order_id, discount, shipping_amount, tax_amount, \
tax_percent, amount, currency, payment_provider, payment_method_token, total_item_count, \
status, history, order_customer_id, transaction_id, psp_object, company_id, created_at, \
updated_at, tag, tag_date, name, replace_order_id, payment_status, cancellation_reason, \
swap_reason, meta, parent_id, cancellation_date, tracking_numbers, utm_source, origin, \
shipping_method, referral_successful, draft_order_id, subscription_type, checkboxes, \
completed, retailer_id, auto_sync";

/// Origin value of orders created through the hub UI.
pub const ORIGIN_CMS: &str = "cms";

/// Filter for orders that have no subscription yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    /// Company name as stored in `general_company_settings.name`
    pub company: String,
    /// e.g. `stripe`
    pub payment_provider: String,
    /// e.g. `visa`
    pub payment_method_token: String,
    /// e.g. `open`
    pub status: String,
}

impl OrderFilter {
    /// Open Stripe/Visa orders of `company`.
    #[must_use]
    pub fn stripe_visa_open(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            payment_provider: "stripe".to_string(),
            payment_method_token: "visa".to_string(),
            status: "open".to_string(),
        }
    }
}

fn company_scoped(dialect: Dialect, select: &str, company: &str) -> QueryBuilder {
    let mut q = QueryBuilder::new(dialect);
    q.push(select)
        .push(" FROM orders o LEFT JOIN general_company_settings gcs ON o.company_id = gcs.uid WHERE gcs.name = ")
        .push_bind(company);
    q
}

/// All orders of `company`, newest first.
#[must_use]
pub fn all_orders_for_company(dialect: Dialect, company: &str) -> QueryDescriptor {
    let mut q = company_scoped(dialect, &format!("SELECT {ORDER_COLUMNS}"), company);
    q.push(" ORDER BY o.created_at DESC");
    q.build()
}

/// The oldest order of `company`.
#[must_use]
pub fn oldest_order_for_company(dialect: Dialect, company: &str) -> QueryDescriptor {
    let mut q = company_scoped(dialect, &format!("SELECT {ORDER_COLUMNS}"), company);
    q.push(" ORDER BY o.created_at ASC LIMIT 1");
    q.build()
}

/// The `n`-th newest order (1-based) matching `filter` with no subscription row.
#[must_use]
pub fn nth_order_without_subscription(
    dialect: Dialect,
    filter: &OrderFilter,
    n: u32,
) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT ")
        .push(ORDER_COLUMNS)
        .push(
            " FROM orders o \
             LEFT JOIN general_company_settings gcs ON o.company_id = gcs.uid \
             LEFT JOIN subscriptions s ON o.order_id = s.order_id AND o.company_id = s.company_id \
             WHERE gcs.name = ",
        )
        .push_bind(filter.company.as_str())
        .push(" AND s.order_id IS NULL AND o.payment_provider = ")
        .push_bind(filter.payment_provider.as_str())
        .push(" AND o.payment_method_token = ")
        .push_bind(filter.payment_method_token.as_str())
        .push(" AND o.status = ")
        .push_bind(filter.status.as_str())
        .push(" ORDER BY o.created_at DESC LIMIT 1 OFFSET ")
        .push_bind(n.saturating_sub(1));
    q.build()
}

/// Fifth newest open Stripe/Visa order of `company` without a subscription.
#[must_use]
pub fn fifth_order_without_subscription(dialect: Dialect, company: &str) -> QueryDescriptor {
    nth_order_without_subscription(dialect, &OrderFilter::stripe_visa_open(company), 5)
}

/// `total_orders` for `company`.
#[must_use]
pub fn order_count_for_company(dialect: Dialect, company: &str) -> QueryDescriptor {
    company_scoped(dialect, "SELECT COUNT(*) AS total_orders", company).build()
}

/// Order by primary key.
#[must_use]
pub fn order_by_id(dialect: Dialect, id: i64) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders WHERE id = ").push_bind(id);
    q.build()
}

/// Orders of a company by company id.
#[must_use]
pub fn orders_by_company_id(dialect: Dialect, company_id: i64) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders WHERE company_id = ")
        .push_bind(company_id);
    q.build()
}

/// Orders with `status`.
#[must_use]
pub fn orders_by_status(dialect: Dialect, status: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders WHERE status = ").push_bind(status);
    q.build()
}

/// Order by its public order number.
#[must_use]
pub fn order_by_order_id(dialect: Dialect, order_id: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders WHERE order_id = ")
        .push_bind(order_id);
    q.build()
}

/// Order by public order number and origin (e.g. [`ORIGIN_CMS`]).
#[must_use]
pub fn order_by_order_id_and_origin(
    dialect: Dialect,
    order_id: &str,
    origin: &str,
) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders WHERE order_id = ")
        .push_bind(order_id)
        .push(" AND origin = ")
        .push_bind(origin);
    q.build()
}

/// Newest `limit` orders.
#[must_use]
pub fn recent_orders(dialect: Dialect, limit: u32) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM orders ORDER BY created_at DESC LIMIT ")
        .push_bind(limit);
    q.build()
}

/// `total` number of orders.
#[must_use]
pub fn count_orders(dialect: Dialect) -> QueryDescriptor {
    QueryDescriptor::raw(dialect, "SELECT COUNT(*) AS total FROM orders")
}

/// `status`, `count` per order status.
#[must_use]
pub fn order_counts_by_status(dialect: Dialect) -> QueryDescriptor {
    QueryDescriptor::raw(
        dialect,
        "SELECT status, COUNT(*) AS count FROM orders GROUP BY status",
    )
}

/// Up to `limit` orders with the full column set, for connection checks.
#[must_use]
pub fn orders_sample(dialect: Dialect, limit: u32) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT ")
        .push(SAMPLE_COLUMNS)
        .push(" FROM orders LIMIT ")
        .push_bind(limit);
    q.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SqlParam;
    use crate::gateway::{QueryExecutor, SqlGateway};
    use tempfile::TempDir;

    #[test]
    fn test_fifth_order_query() {
        let q = fifth_order_without_subscription(Dialect::Postgres, "shopify stripe");
        assert!(q.sql().contains("s.order_id IS NULL"));
        assert!(q.sql().contains("ORDER BY o.created_at DESC LIMIT 1 OFFSET $5"));
        assert_eq!(
            q.params(),
            &[
                SqlParam::from("shopify stripe"),
                SqlParam::from("stripe"),
                SqlParam::from("visa"),
                SqlParam::from("open"),
                SqlParam::Int(4),
            ]
        );
    }

    #[test]
    fn test_nth_order_zero_does_not_underflow() {
        let filter = OrderFilter::stripe_visa_open("acme");
        let q = nth_order_without_subscription(Dialect::MySql, &filter, 0);
        assert_eq!(q.params().last(), Some(&SqlParam::Int(0)));
    }

    #[test]
    fn test_company_name_is_never_interpolated() {
        let company = "O'Brien Ltd";
        for q in [
            all_orders_for_company(Dialect::Postgres, company),
            oldest_order_for_company(Dialect::MySql, company),
            order_count_for_company(Dialect::Sqlite, company),
            fifth_order_without_subscription(Dialect::Postgres, company),
        ] {
            assert!(!q.sql().contains("O'Brien"), "leaked into: {}", q.sql());
            assert_eq!(q.params()[0], SqlParam::from(company));
        }
    }

    #[test]
    fn test_order_count_alias() {
        let q = order_count_for_company(Dialect::Postgres, "acme");
        assert!(q.sql().starts_with("SELECT COUNT(*) AS total_orders FROM orders o"));
        assert!(q.sql().ends_with("WHERE gcs.name = $1"));
    }

    #[test]
    fn test_origin_lookup() {
        let q = order_by_order_id_and_origin(Dialect::Postgres, "1042", ORIGIN_CMS);
        assert_eq!(
            q.sql(),
            "SELECT * FROM orders WHERE order_id = $1 AND origin = $2"
        );
        assert_eq!(q.params(), &[SqlParam::from("1042"), SqlParam::from("cms")]);
    }

    #[test]
    fn test_recent_orders_binds_limit() {
        let q = recent_orders(Dialect::Sqlite, 5);
        assert!(q.sql().ends_with("LIMIT ?"));
        assert_eq!(q.params(), &[SqlParam::Int(5)]);
    }

    async fn seed_company_orders(gw: &SqlGateway) {
        for ddl in [
            "CREATE TABLE general_company_settings (uid INTEGER PRIMARY KEY, name TEXT)",
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, order_id TEXT, company_id INTEGER, \
             payment_provider TEXT, payment_method_token TEXT, status TEXT, transaction_id TEXT, \
             payment_status TEXT, origin TEXT, shipping_method TEXT, subscription_type TEXT, \
             replace_order_id TEXT, parent_id TEXT, order_customer_id TEXT, created_at TEXT)",
            "CREATE TABLE subscriptions (id INTEGER PRIMARY KEY, order_id TEXT, company_id INTEGER)",
            "INSERT INTO general_company_settings (uid, name) VALUES (1, 'acme'), (2, 'globex')",
            // o8 already has a subscription
            "INSERT INTO subscriptions (order_id, company_id) VALUES ('o8', 1)",
        ] {
            gw.execute_statement(&QueryDescriptor::raw(Dialect::Sqlite, ddl))
                .await
                .expect("seed schema");
        }

        // Newest order overall belongs to another company
        let orders = ["o1", "o2", "o3", "o4", "o5", "o6", "o7", "o8"]
            .into_iter()
            .map(|id| (id, 1_i64))
            .chain([("g1", 2)]);

        for (day, (order_id, company_id)) in orders.enumerate() {
            let mut insert = QueryBuilder::new(Dialect::Sqlite);
            insert
                .push(
                    "INSERT INTO orders (order_id, company_id, payment_provider, \
                     payment_method_token, status, created_at) VALUES (",
                )
                .push_bind(order_id)
                .push(", ")
                .push_bind(company_id)
                .push(", 'stripe', 'visa', 'open', ")
                .push_bind(format!("2024-03-{:02}T10:00:00", day + 1))
                .push(")");
            gw.execute_statement(&insert.build())
                .await
                .expect("seed order");
        }
    }

    #[tokio::test]
    async fn test_fifth_order_skips_subscribed_and_foreign_orders() {
        let tmp = TempDir::new().expect("create temp dir");
        let gw = SqlGateway::sqlite(tmp.path().join("hub.db").display().to_string());
        seed_company_orders(&gw).await;

        let rows = gw
            .execute(&fifth_order_without_subscription(Dialect::Sqlite, "acme"))
            .await
            .expect("fifth order");

        // Newest first without o8: o7, o6, o5, o4, o3
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("order_id").as_deref(), Some("o3"));
        assert_eq!(rows[0].get_i64("company_id"), Some(1));
    }
}
