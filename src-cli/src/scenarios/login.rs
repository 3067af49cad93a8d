use super::{scenario, Scenario};
use hubcheck_auth::Credentials;
use hubcheck_commands::{CommandContext, Result};
use hubcheck_pages::LoginPage;

pub(super) const SCENARIOS: &[Scenario] = &[scenario!("login", "login-full-flow", full_login)];

/// Sign in step by step and land on the order list of the configured company.
async fn full_login(ctx: &CommandContext) -> Result<()> {
    let credentials = Credentials::from_config(&ctx.config().credentials)?;
    let browser = ctx.browser().await?;
    browser.clear_state().await?;

    let page = LoginPage::new(ctx.base(browser.as_ref()));
    page.visit().await?;
    page.enter_email(credentials.email()).await?;
    page.enter_password(credentials.password()).await?;
    page.click_sign_in().await?;
    page.verify_login_success().await?;
    page.select_company(&ctx.config().app.company).await?;
    page.verify_company_selection().await?;
    Ok(())
}
