//! Customer test-data queries.
//!
//! Rows created by the suite carry `is_test_data = 1` and the shop platform,
//! so cleanup never touches real customers.

use crate::descriptor::{Dialect, QueryBuilder, QueryDescriptor};
use serde::{Deserialize, Serialize};

/// Customer row to insert as test data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email, unique per run
    pub email: String,
    /// Shop platform, e.g. `shopify`
    pub platform: String,
}

/// Up to `limit` test customers of `platform`.
#[must_use]
pub fn test_customers(dialect: Dialect, platform: &str, limit: u32) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM customers WHERE platform = ")
        .push_bind(platform)
        .push(" AND is_test_data = 1 LIMIT ")
        .push_bind(limit);
    q.build()
}

/// Insert a flagged test customer.
#[must_use]
pub fn insert_test_customer(dialect: Dialect, customer: &NewCustomer) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("INSERT INTO customers (first_name, last_name, email, platform, is_test_data, created_at) VALUES (")
        .push_bind(customer.first_name.as_str())
        .push(", ")
        .push_bind(customer.last_name.as_str())
        .push(", ")
        .push_bind(customer.email.as_str())
        .push(", ")
        .push_bind(customer.platform.as_str())
        .push(", 1, CURRENT_TIMESTAMP)");
    q.build()
}

/// Delete every test customer of `platform`.
#[must_use]
pub fn delete_test_customers(dialect: Dialect, platform: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("DELETE FROM customers WHERE is_test_data = 1 AND platform = ")
        .push_bind(platform);
    q.build()
}

/// Test customer by email.
#[must_use]
pub fn test_customer_by_email(dialect: Dialect, email: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM customers WHERE email = ")
        .push_bind(email)
        .push(" AND is_test_data = 1");
    q.build()
}

/// Any customer by email, including those created through the UI.
#[must_use]
pub fn customer_by_email(dialect: Dialect, email: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM customers WHERE email = ").push_bind(email);
    q.build()
}

/// Customers whose first or last name contains `fragment`.
#[must_use]
pub fn customers_by_name_like(dialect: Dialect, fragment: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM customers WHERE first_name")
        .push_like_contains(fragment)
        .push(" OR last_name")
        .push_like_contains(fragment);
    q.build()
}
