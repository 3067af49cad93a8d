//! Customer commands.

use crate::context::CommandContext;
use crate::error::{CommandError, Result};
use hubcheck_core::SampleCustomer;
use hubcheck_db::customers::{self, NewCustomer};
use hubcheck_db::Record;
use hubcheck_pages::CustomersPage;

impl CommandContext {
    /// Switch to the customers tab.
    pub async fn navigate_to_customers(&self) -> Result<()> {
        let browser = self.browser().await?;
        CustomersPage::new(self.base(browser.as_ref()))
            .navigate()
            .await?;
        Ok(())
    }

    /// Create `customer` through the UI form.
    pub async fn create_customer(&self, customer: &SampleCustomer) -> Result<()> {
        let browser = self.browser().await?;
        CustomersPage::new(self.base(browser.as_ref()))
            .create(customer)
            .await?;
        Ok(())
    }

    /// Search the customer table for `term`.
    pub async fn search_customer(&self, term: &str) -> Result<()> {
        let browser = self.browser().await?;
        CustomersPage::new(self.base(browser.as_ref()))
            .search(term)
            .await?;
        tracing::info!("Searched customers for {}", term);
        Ok(())
    }

    /// Insert a flagged test customer with a unique email into the test-data
    /// database and read it back.
    pub async fn create_test_customer_row(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Record> {
        let customer = NewCustomer {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!(
                "test.customer.{}@example.com",
                chrono::Utc::now().timestamp_millis()
            ),
            platform: self.config().suite.platform.clone(),
        };
        let db = self.test_data_db();
        let dialect = db.dialect();
        db.execute_statement(&customers::insert_test_customer(dialect, &customer))
            .await?;
        let row = db
            .fetch_optional(&customers::test_customer_by_email(dialect, &customer.email))
            .await?
            .ok_or_else(|| {
                CommandError::Assertion(format!(
                    "test customer {} missing after insert",
                    customer.email
                ))
            })?;
        tracing::info!("Created test customer: {}", customer.email);
        Ok(row)
    }

    /// Delete every test customer of the configured platform from the
    /// test-data database.
    pub async fn delete_test_customers(&self) -> Result<u64> {
        let platform = &self.config().suite.platform;
        let db = self.test_data_db();
        let deleted = db
            .execute_statement(&customers::delete_test_customers(db.dialect(), platform))
            .await?;
        tracing::info!("Deleted {} test customers ({})", deleted, platform);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::test_support::{context, test_data_gateway};
    use hubcheck_browser::testing::{FakeElement, ScriptedBrowser};
    use hubcheck_db::customers;
    use hubcheck_pages::CustomersPage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_customer_row_round_trip() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, Arc::new(ScriptedBrowser::new())).await;

        let row = ctx.create_test_customer_row("Test", "O'Customer").await.unwrap();
        let email = row.get_str("email").unwrap();
        assert!(email.starts_with("test.customer."));
        assert_eq!(row.get_str("last_name").as_deref(), Some("O'Customer"));
        assert_eq!(row.get_str("platform").as_deref(), Some("shopify"));
        assert_eq!(row.get_i64("is_test_data"), Some(1));

        assert_eq!(ctx.delete_test_customers().await.unwrap(), 1);
        let gone = ctx
            .test_data_db()
            .fetch_optional(&customers::test_customer_by_email(ctx.test_data_db().dialect(), &email))
            .await
            .unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_search_customer_types_term() {
        let tmp = TempDir::new().unwrap();
        let browser = Arc::new(ScriptedBrowser::new());
        browser
            .set(&CustomersPage::search_input(), FakeElement::field("old"))
            .set(&CustomersPage::search_button(), FakeElement::visible("Search"))
            .set(&CustomersPage::table(), FakeElement::visible("Erika Musterfrau"));
        let ctx = context(&tmp, Arc::clone(&browser)).await;

        let email = ctx.fixtures().first_customer().unwrap().email.clone();
        ctx.search_customer(&email).await.unwrap();
        assert_eq!(
            browser.element(&CustomersPage::search_input()).map(|e| e.value),
            Some("erika@example.com".to_string())
        );
        assert!(browser.clicked(&CustomersPage::search_button()));
    }

    #[tokio::test]
    async fn test_customer_rows_go_to_test_data_database() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, Arc::new(ScriptedBrowser::new()))
            .await
            .with_test_data_executor(Arc::new(test_data_gateway(&tmp).await));

        let row = ctx.create_test_customer_row("Test", "Elsewhere").await.unwrap();
        let email = row.get_str("email").unwrap();
        let main = ctx
            .db()
            .fetch_optional(&customers::test_customer_by_email(ctx.db().dialect(), &email))
            .await
            .unwrap();
        assert!(main.is_none());

        assert_eq!(ctx.delete_test_customers().await.unwrap(), 1);
    }
}
