//! Product creation and search, checked in the UI and the database.

use super::{scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_core::SampleProduct;
use hubcheck_db::products;
use hubcheck_pages::ProductsPage;

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("products", "products-create", create),
    scenario!("products", "products-search-existing", search_existing),
];

async fn open_products(ctx: &CommandContext) -> Result<()> {
    let credentials = &ctx.config().credentials;
    ctx.login_to_hub(&credentials.email, &credentials.password)
        .await?;
    ctx.navigate_to_products().await
}

async fn create(ctx: &CommandContext) -> Result<()> {
    open_products(ctx).await?;
    let product = SampleProduct {
        name: "Test Product".to_string(),
        sku: format!("TEST-SKU-{}", chrono::Utc::now().timestamp_millis()),
        price: "99.99".to_string(),
        stock: "100".to_string(),
    };

    let browser = ctx.browser().await?;
    let page = ProductsPage::new(ctx.base(browser.as_ref()));
    let ui = async {
        ctx.create_product(&product).await?;
        ctx.search_product(&product.sku).await?;
        page.expect_listed(&product.name).await?;
        Ok::<_, CommandError>(())
    };
    let db = ctx.test_data_db();
    ctx.verify_dual_in(
        db,
        ui,
        &products::product_by_sku(db.dialect(), &product.sku),
        &format!("product {}", product.sku),
    )
    .await?;
    Ok(())
}

async fn search_existing(ctx: &CommandContext) -> Result<()> {
    open_products(ctx).await?;
    let product = ctx.fixtures().first_product()?;
    ctx.search_product(&product.sku).await?;

    let browser = ctx.browser().await?;
    ProductsPage::new(ctx.base(browser.as_ref()))
        .expect_in_table(&product.name)
        .await?;
    Ok(())
}
