//! Customer creation and search, checked in the UI and the database.

use super::{scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_core::SampleCustomer;
use hubcheck_db::customers;
use hubcheck_pages::CustomersPage;

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("customers", "customers-create", create),
    scenario!("customers", "customers-search-existing", search_existing),
];

async fn open_customers(ctx: &CommandContext) -> Result<()> {
    let credentials = &ctx.config().credentials;
    ctx.login_to_hub(&credentials.email, &credentials.password)
        .await?;
    ctx.navigate_to_customers().await
}

async fn create(ctx: &CommandContext) -> Result<()> {
    open_customers(ctx).await?;
    let customer = SampleCustomer {
        first_name: "Test".to_string(),
        last_name: "Customer".to_string(),
        email: format!(
            "test.customer.{}@example.com",
            chrono::Utc::now().timestamp_millis()
        ),
    };

    let browser = ctx.browser().await?;
    let page = CustomersPage::new(ctx.base(browser.as_ref()));
    let ui = async {
        ctx.create_customer(&customer).await?;
        ctx.search_customer(&customer.email).await?;
        page.expect_listed(&customer.first_name).await?;
        Ok::<_, CommandError>(())
    };
    let db = ctx.test_data_db();
    let row = ctx
        .verify_dual_in(
            db,
            ui,
            &customers::customer_by_email(db.dialect(), &customer.email),
            &format!("customer {}", customer.email),
        )
        .await?;
    tracing::info!(
        "Verified: customer row {} matches",
        row.get_str("id").unwrap_or_default()
    );
    Ok(())
}

async fn search_existing(ctx: &CommandContext) -> Result<()> {
    open_customers(ctx).await?;
    let customer = ctx.fixtures().first_customer()?;
    ctx.search_customer(&customer.email).await?;

    let browser = ctx.browser().await?;
    CustomersPage::new(ctx.base(browser.as_ref()))
        .expect_in_table(&customer.first_name)
        .await?;
    Ok(())
}
