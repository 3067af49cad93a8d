//! Product test-data queries.

use crate::descriptor::{Dialect, QueryBuilder, QueryDescriptor};
use serde::{Deserialize, Serialize};

/// Product row to insert as test data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Stock keeping unit, unique per run
    pub sku: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: i64,
    /// Shop platform, e.g. `shopify`
    pub platform: String,
}

/// Up to `limit` test products of `platform`.
#[must_use]
pub fn test_products(dialect: Dialect, platform: &str, limit: u32) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM products WHERE platform = ")
        .push_bind(platform)
        .push(" AND is_test_data = 1 LIMIT ")
        .push_bind(limit);
    q.build()
}

/// Insert a flagged test product.
#[must_use]
pub fn insert_test_product(dialect: Dialect, product: &NewProduct) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("INSERT INTO products (name, sku, price, stock, platform, is_test_data, created_at) VALUES (")
        .push_bind(product.name.as_str())
        .push(", ")
        .push_bind(product.sku.as_str())
        .push(", ")
        .push_bind(product.price)
        .push(", ")
        .push_bind(product.stock)
        .push(", ")
        .push_bind(product.platform.as_str())
        .push(", 1, CURRENT_TIMESTAMP)");
    q.build()
}

/// Test product by SKU.
#[must_use]
pub fn test_product_by_sku(dialect: Dialect, sku: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM products WHERE sku = ")
        .push_bind(sku)
        .push(" AND is_test_data = 1");
    q.build()
}

/// Any product by SKU, including those created through the UI.
#[must_use]
pub fn product_by_sku(dialect: Dialect, sku: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT * FROM products WHERE sku = ").push_bind(sku);
    q.build()
}

/// Delete every test product of `platform`.
#[must_use]
pub fn delete_test_products(dialect: Dialect, platform: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("DELETE FROM products WHERE is_test_data = 1 AND platform = ")
        .push_bind(platform);
    q.build()
}
