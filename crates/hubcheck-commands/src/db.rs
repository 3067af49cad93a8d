//! Database commands.

use crate::context::CommandContext;
use crate::error::{CommandError, Result};
use hubcheck_core::OrderId;
use hubcheck_db::{orders, QueryDescriptor, QueryExecutor, Record};
use std::time::Instant;

impl CommandContext {
    /// Run any descriptor and return its rows.
    pub async fn query_database(&self, query: &QueryDescriptor) -> Result<Vec<Record>> {
        Ok(self.db().execute(query).await?)
    }

    /// Order by primary key, if present.
    pub async fn get_order_by_id(&self, id: i64) -> Result<Option<Record>> {
        let order = self
            .db()
            .fetch_optional(&orders::order_by_id(self.db().dialect(), id))
            .await?;
        match &order {
            Some(row) => tracing::info!(
                "Found order: {}",
                row.get_str("order_id").unwrap_or_default()
            ),
            None => tracing::warn!("No order found with id {}", id),
        }
        Ok(order)
    }

    /// Orders of the company with primary key `company_id`.
    pub async fn get_orders_by_company(&self, company_id: i64) -> Result<Vec<Record>> {
        let rows = self
            .query_database(&orders::orders_by_company_id(self.db().dialect(), company_id))
            .await?;
        tracing::info!("Found {} orders for company {}", rows.len(), company_id);
        Ok(rows)
    }

    /// Orders with `status`.
    pub async fn get_orders_by_status(&self, status: &str) -> Result<Vec<Record>> {
        let rows = self
            .query_database(&orders::orders_by_status(self.db().dialect(), status))
            .await?;
        tracing::info!("Found {} orders with status: {}", rows.len(), status);
        Ok(rows)
    }

    /// Total number of orders.
    pub async fn count_orders(&self) -> Result<i64> {
        let row = self
            .db()
            .fetch_optional(&orders::count_orders(self.db().dialect()))
            .await?;
        let total = row.and_then(|r| r.get_i64("total")).ok_or_else(|| {
            CommandError::Assertion("order count query returned no total".to_string())
        })?;
        tracing::info!("Total orders in database: {}", total);
        Ok(total)
    }

    /// The order row for `order_id`; fails when it does not exist.
    pub async fn verify_order_exists(&self, order_id: &OrderId) -> Result<Record> {
        let row = self
            .db()
            .fetch_optional(&orders::order_by_order_id(
                self.db().dialect(),
                order_id.as_str(),
            ))
            .await?
            .ok_or_else(|| {
                CommandError::Assertion(format!("order {order_id} should exist in database"))
            })?;
        tracing::info!("Verified: order {} exists in database", order_id);
        Ok(row)
    }

    /// The `limit` most recently created orders, newest first.
    pub async fn get_recent_orders(&self, limit: u32) -> Result<Vec<Record>> {
        let rows = self
            .query_database(&orders::recent_orders(self.db().dialect(), limit))
            .await?;
        tracing::info!("Retrieved {} recent orders", rows.len());
        Ok(rows)
    }

    /// Poll `query` on the main database until it returns a row or the
    /// command timeout elapses.
    ///
    /// Rows written by the application behind a UI action show up with some
    /// delay; this replaces a fixed wait before the database check.
    pub async fn await_row(&self, query: &QueryDescriptor, what: &str) -> Result<Record> {
        self.await_row_in(self.db(), query, what).await
    }

    /// [`CommandContext::await_row`] against `db`.
    pub async fn await_row_in(
        &self,
        db: &dyn QueryExecutor,
        query: &QueryDescriptor,
        what: &str,
    ) -> Result<Record> {
        let wait = self.wait();
        let deadline = Instant::now() + wait.timeout();
        loop {
            if let Some(row) = db.fetch_optional(query).await? {
                tracing::info!("Verified: {} found in database", what);
                return Ok(row);
            }
            if Instant::now() >= deadline {
                return Err(CommandError::Assertion(format!(
                    "{what} not found in database after {}ms",
                    wait.timeout_ms
                )));
            }
            tokio::time::sleep(wait.poll_interval()).await;
        }
    }
}
