//! Two scenarios sharing one cached login.

use super::{scenario, Scenario};
use hubcheck_commands::{CommandContext, Result};

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("session-example", "session-first-visit", first_visit),
    scenario!("session-example", "session-second-visit", second_visit),
];

async fn visit_home_logged_in(ctx: &CommandContext) -> Result<()> {
    let outcome = ctx.login().await?;
    tracing::info!("Session outcome: {:?}", outcome);
    let browser = ctx.browser().await?;
    let base = ctx.base(browser.as_ref());
    base.visit("").await?;
    base.expect_url_contains(&format!("/{}/auth/company", ctx.config().app.locale))
        .await?;
    Ok(())
}

async fn first_visit(ctx: &CommandContext) -> Result<()> {
    visit_home_logged_in(ctx).await
}

async fn second_visit(ctx: &CommandContext) -> Result<()> {
    visit_home_logged_in(ctx).await
}
