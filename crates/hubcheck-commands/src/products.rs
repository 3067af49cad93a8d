//! Product commands.

use crate::context::CommandContext;
use crate::error::{CommandError, Result};
use hubcheck_core::SampleProduct;
use hubcheck_db::products::{self, NewProduct};
use hubcheck_db::Record;
use hubcheck_pages::ProductsPage;

impl CommandContext {
    /// Switch to the products tab.
    pub async fn navigate_to_products(&self) -> Result<()> {
        let browser = self.browser().await?;
        ProductsPage::new(self.base(browser.as_ref()))
            .navigate()
            .await?;
        Ok(())
    }

    /// Create `product` through the UI form.
    pub async fn create_product(&self, product: &SampleProduct) -> Result<()> {
        let browser = self.browser().await?;
        ProductsPage::new(self.base(browser.as_ref()))
            .create(product)
            .await?;
        Ok(())
    }

    /// Search the product table for `term`.
    pub async fn search_product(&self, term: &str) -> Result<()> {
        let browser = self.browser().await?;
        ProductsPage::new(self.base(browser.as_ref()))
            .search(term)
            .await?;
        tracing::info!("Searched products for {}", term);
        Ok(())
    }

    /// Insert a flagged test product with a unique SKU into the test-data
    /// database and read it back.
    pub async fn create_test_product_row(
        &self,
        name: &str,
        price: f64,
        stock: i64,
    ) -> Result<Record> {
        let product = NewProduct {
            name: name.to_string(),
            sku: format!("TEST-SKU-{}", chrono::Utc::now().timestamp_millis()),
            price,
            stock,
            platform: self.config().suite.platform.clone(),
        };
        let db = self.test_data_db();
        let dialect = db.dialect();
        db.execute_statement(&products::insert_test_product(dialect, &product))
            .await?;
        let row = db
            .fetch_optional(&products::test_product_by_sku(dialect, &product.sku))
            .await?
            .ok_or_else(|| {
                CommandError::Assertion(format!(
                    "test product {} missing after insert",
                    product.sku
                ))
            })?;
        tracing::info!("Created test product: {}", product.sku);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::test_support::{context, test_data_gateway};
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};
    use hubcheck_db::products;
    use hubcheck_pages::products::PRODUCT_CREATED;
    use hubcheck_pages::ProductsPage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_product_row_round_trip() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, Arc::new(ScriptedBrowser::new())).await;

        let row = ctx
            .create_test_product_row("Test Product", 19.5, 100)
            .await
            .unwrap();
        assert!(row.get_str("sku").unwrap().starts_with("TEST-SKU-"));
        assert_eq!(row.get_str("name").as_deref(), Some("Test Product"));
        assert_eq!(row.get_i64("stock"), Some(100));
        assert_eq!(row.get_str("price").as_deref(), Some("19.5"));
    }

    #[tokio::test]
    async fn test_create_product_from_fixture() {
        let tmp = TempDir::new().unwrap();
        let browser = Arc::new(ScriptedBrowser::new());
        browser
            .set(&ProductsPage::add_button(), FakeElement::visible("Add product"))
            .on_click(
                &ProductsPage::add_button(),
                vec![
                    Reaction::Show(ProductsPage::name_input(), FakeElement::field("")),
                    Reaction::Show(ProductsPage::sku_input(), FakeElement::field("")),
                    Reaction::Show(ProductsPage::price_input(), FakeElement::field("")),
                    Reaction::Show(ProductsPage::stock_input(), FakeElement::field("")),
                    Reaction::Show(ProductsPage::save_button(), FakeElement::visible("Save")),
                ],
            )
            .on_click(
                &ProductsPage::save_button(),
                vec![Reaction::Show(
                    ProductsPage::created_message(),
                    FakeElement::visible(PRODUCT_CREATED),
                )],
            );
        let ctx = context(&tmp, Arc::clone(&browser)).await;

        let product = ctx.fixtures().sample_data.products[0].clone();
        ctx.create_product(&product).await.unwrap();
        assert_eq!(
            browser.filled(&ProductsPage::sku_input()).as_deref(),
            Some("REFILL-01")
        );
        assert_eq!(browser.filled(&ProductsPage::stock_input()).as_deref(), Some("50"));
    }

    #[tokio::test]
    async fn test_product_rows_go_to_test_data_database() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, Arc::new(ScriptedBrowser::new()))
            .await
            .with_test_data_executor(Arc::new(test_data_gateway(&tmp).await));

        let row = ctx.create_test_product_row("Starter Kit", 49.0, 5).await.unwrap();
        let sku = row.get_str("sku").unwrap();
        let main = ctx
            .db()
            .fetch_optional(&products::test_product_by_sku(ctx.db().dialect(), &sku))
            .await
            .unwrap();
        assert!(main.is_none());
        let test_data = ctx
            .test_data_db()
            .fetch_optional(&products::test_product_by_sku(ctx.test_data_db().dialect(), &sku))
            .await
            .unwrap();
        assert!(test_data.is_some());
    }
}
