//! Pre-flight checks: configuration, fixtures, dependent APIs and the
//! database connection.

use super::{scenario, Scenario};
use hubcheck_commands::{CommandContext, CommandError, Result};
use hubcheck_db::orders;

pub(super) const SCENARIOS: &[Scenario] = &[
    scenario!("health-check", "suite-configuration", suite_configuration),
    scenario!("health-check", "fixtures-load", fixtures_load),
    scenario!("health-check", "api-health", api_health),
    scenario!("health-check", "database-connection", database_connection),
    scenario!("health-check", "database-config-present", database_config_present),
];

async fn suite_configuration(ctx: &CommandContext) -> Result<()> {
    let config = ctx.config();
    config.validate().map_err(hubcheck_core::HubError::from)?;
    tracing::info!(
        "Viewport: {}x{}, headless: {}",
        config.browser.viewport_width,
        config.browser.viewport_height,
        config.browser.headless
    );
    tracing::info!(
        "Timeouts: command {}ms, page load {}ms; retries: {} (run) / {} (open)",
        config.timeouts.command_ms,
        config.timeouts.page_load_ms,
        config.retries.run_mode,
        config.retries.open_mode
    );
    Ok(())
}

async fn fixtures_load(ctx: &CommandContext) -> Result<()> {
    let fixtures = ctx.fixtures();
    let customer = fixtures.first_customer()?;
    let product = fixtures.first_product()?;
    tracing::info!(
        "Fixtures loaded from {}: customer {}, product {}",
        fixtures.dir().display(),
        customer.email,
        product.sku
    );
    Ok(())
}

async fn api_health(ctx: &CommandContext) -> Result<()> {
    for status in ctx.check_api_health().await? {
        tracing::info!(
            "{} responded {:?} after {} attempt(s)",
            status.name,
            status.status,
            status.attempts
        );
    }
    Ok(())
}

async fn database_connection(ctx: &CommandContext) -> Result<()> {
    let rows = ctx
        .query_database(&orders::orders_sample(ctx.db().dialect(), 10))
        .await?;
    tracing::info!("Database connection successful, {} rows returned", rows.len());
    if let Some(first) = rows.first() {
        tracing::debug!(
            "Sample order: {}",
            serde_json::Value::Object(first.clone().into_inner())
        );
    }
    Ok(())
}

async fn database_config_present(ctx: &CommandContext) -> Result<()> {
    let db = &ctx.config().database;
    tracing::info!(
        "Database: {} at {}:{} as {} (db {})",
        db.engine,
        db.host,
        db.port(),
        db.user,
        db.name
    );
    if db.host.is_empty() || db.name.is_empty() {
        return Err(CommandError::Assertion(
            "database host and name must be configured".to_string(),
        ));
    }
    Ok(())
}
