//! Shared state every command works with.

use crate::error::Result;
use hubcheck_auth::{LoginFlow, SessionManager};
use hubcheck_browser::{BrowserActions, BrowserEngine, WaitOptions};
use hubcheck_core::{Fixtures, SuiteConfig};
use hubcheck_db::{QueryExecutor, SqlGateway};
use hubcheck_health::HealthChecker;
use hubcheck_pages::{BasePage, HubLoginFlow};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Configuration, collaborators and the session cache for one run.
///
/// The browser is launched on first use, so runs that only touch the
/// database or health endpoints never start Chromium. Tests inject a
/// browser with [`CommandContext::with_browser`].
pub struct CommandContext {
    config: Arc<SuiteConfig>,
    db: Arc<dyn QueryExecutor>,
    test_data_db: Option<Arc<dyn QueryExecutor>>,
    health: HealthChecker,
    sessions: SessionManager,
    fixtures: Fixtures,
    login_flow: Arc<dyn LoginFlow>,
    injected_browser: Option<Arc<dyn BrowserActions>>,
    engine: OnceCell<Arc<BrowserEngine>>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("base_url", &self.config.app.base_url)
            .field("sessions", &self.sessions)
            .field("browser_launched", &self.engine.initialized())
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    /// Build a context over the configured databases and endpoints.
    pub fn new(config: SuiteConfig, fixtures: Fixtures) -> Result<Self> {
        let db: Arc<dyn QueryExecutor> = Arc::new(SqlGateway::new(config.database.clone()));
        let test_data_db = config.test_data_database.clone().map(|test_data| {
            tracing::debug!(
                "Test data on {} at {}:{}",
                test_data.engine,
                test_data.host,
                test_data.port()
            );
            Arc::new(SqlGateway::new(test_data)) as Arc<dyn QueryExecutor>
        });
        let health = HealthChecker::new(&config.health, &config.timeouts)?;
        let login_flow: Arc<dyn LoginFlow> = Arc::new(HubLoginFlow::new(
            config.app.clone(),
            WaitOptions::from_config(&config.timeouts),
        ));
        Ok(Self {
            config: Arc::new(config),
            db,
            test_data_db,
            health,
            sessions: SessionManager::new(),
            fixtures,
            login_flow,
            injected_browser: None,
            engine: OnceCell::new(),
        })
    }

    /// Build a context, loading fixtures from `suite.fixtures_dir`.
    pub fn from_config(config: SuiteConfig) -> Result<Self> {
        let fixtures = Fixtures::load(&config.suite.fixtures_dir)?;
        Self::new(config, fixtures)
    }

    /// Use `db` instead of the configured gateway.
    #[must_use]
    pub fn with_executor(mut self, db: Arc<dyn QueryExecutor>) -> Self {
        self.db = db;
        self
    }

    /// Use `db` for customer and product test data instead of the
    /// configured test-data gateway.
    #[must_use]
    pub fn with_test_data_executor(mut self, db: Arc<dyn QueryExecutor>) -> Self {
        self.test_data_db = Some(db);
        self
    }

    /// Use `browser` instead of launching Chromium.
    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn BrowserActions>) -> Self {
        self.injected_browser = Some(browser);
        self
    }

    /// Use a different login flow for cached sessions.
    #[must_use]
    pub fn with_login_flow(mut self, flow: Arc<dyn LoginFlow>) -> Self {
        self.login_flow = flow;
        self
    }

    /// Use a different health checker.
    #[must_use]
    pub fn with_health_checker(mut self, health: HealthChecker) -> Self {
        self.health = health;
        self
    }

    /// Resolved configuration.
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Database holding orders, subscriptions and company settings.
    #[must_use]
    pub fn db(&self) -> &dyn QueryExecutor {
        self.db.as_ref()
    }

    /// Database holding customer and product test data; the main database
    /// when no `test_data_database` is configured.
    #[must_use]
    pub fn test_data_db(&self) -> &dyn QueryExecutor {
        self.test_data_db.as_deref().unwrap_or(self.db.as_ref())
    }

    /// Health checker over the configured endpoints.
    #[must_use]
    pub fn health(&self) -> &HealthChecker {
        &self.health
    }

    /// Cached login sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Loaded JSON fixtures.
    #[must_use]
    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub(crate) fn login_flow(&self) -> &dyn LoginFlow {
        self.login_flow.as_ref()
    }

    /// Wait settings derived from the configured command timeout.
    #[must_use]
    pub fn wait(&self) -> WaitOptions {
        WaitOptions::from_config(&self.config.timeouts)
    }

    /// The browser, launching Chromium on first use.
    pub async fn browser(&self) -> Result<Arc<dyn BrowserActions>> {
        if let Some(browser) = &self.injected_browser {
            return Ok(Arc::clone(browser));
        }
        let engine = self
            .engine
            .get_or_try_init(|| async {
                tracing::info!(
                    "Launching browser ({}x{}, headless: {})",
                    self.config.browser.viewport_width,
                    self.config.browser.viewport_height,
                    self.config.browser.headless
                );
                BrowserEngine::launch(&self.config.browser, &self.config.timeouts)
                    .await
                    .map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(engine) as Arc<dyn BrowserActions>)
    }

    /// The browser if one was injected or already launched.
    #[must_use]
    pub fn active_browser(&self) -> Option<Arc<dyn BrowserActions>> {
        if let Some(browser) = &self.injected_browser {
            return Some(Arc::clone(browser));
        }
        self.engine
            .get()
            .map(|engine| Arc::clone(engine) as Arc<dyn BrowserActions>)
    }

    /// Page helpers over `browser`.
    #[must_use]
    pub fn base<'a>(&'a self, browser: &'a dyn BrowserActions) -> BasePage<'a> {
        BasePage::new(browser, &self.config.app, self.wait())
    }

    /// Close the browser if one was launched.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(engine) = self.engine.get() {
            engine.close().await?;
            tracing::debug!("Browser closed");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use hubcheck_browser::testing::ScriptedBrowser;
    use hubcheck_db::QueryDescriptor;
    use std::path::Path;
    use tempfile::TempDir;

    pub const TEST_DATA: &str = r#"{
  "billingAddress": {
    "givenName": "Max",
    "surname": "Mustermann",
    "email": "max.mustermann+{{timestamp}}@example.com",
    "phone": "+49301234567",
    "street": "Musterstraße",
    "streetNumber": "1",
    "postalCode": "10115",
    "city": "Berlin",
    "country": "Germany"
  }
}"#;

    pub const SAMPLE_DATA: &str = r#"{
  "customers": [{ "firstName": "Erika", "lastName": "Musterfrau", "email": "erika@example.com" }],
  "products": [{ "name": "Refill Pack", "sku": "REFILL-01", "price": "9.99", "stock": "50" }]
}"#;

    const SCHEMA: [&str; 3] = [
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, order_id TEXT, company_id INTEGER, status TEXT, origin TEXT, created_at TEXT)",
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT, email TEXT, platform TEXT, is_test_data INTEGER, created_at TEXT)",
        "CREATE TABLE products (id INTEGER PRIMARY KEY, name TEXT, sku TEXT, price REAL, stock INTEGER, platform TEXT, is_test_data INTEGER, created_at TEXT)",
    ];

    pub fn write_fixtures(dir: &Path) -> Fixtures {
        std::fs::write(dir.join(Fixtures::TEST_DATA_FILE), TEST_DATA).expect("write test data");
        std::fs::write(dir.join(Fixtures::SAMPLE_DATA_FILE), SAMPLE_DATA)
            .expect("write sample data");
        Fixtures::load(dir).expect("load fixtures")
    }

    /// Context over a seeded SQLite file and a scripted browser.
    pub async fn context(tmp: &TempDir, browser: Arc<ScriptedBrowser>) -> CommandContext {
        let mut config = SuiteConfig::default();
        config.timeouts.command_ms = 200;
        config.timeouts.poll_interval_ms = 10;

        let gateway = SqlGateway::sqlite(tmp.path().join("hub.db").display().to_string());
        for statement in SCHEMA {
            gateway
                .execute_statement(&QueryDescriptor::raw(gateway.dialect(), statement))
                .await
                .expect("create table");
        }
        gateway
            .execute_statement(&QueryDescriptor::raw(
                gateway.dialect(),
                "INSERT INTO orders (order_id, company_id, status, origin, created_at) VALUES \
                 ('1001', 7, 'open', 'shop', '2024-01-01T10:00:00Z'), \
                 ('1002', 7, 'fulfilled', 'cms', '2024-01-02T10:00:00Z'), \
                 ('1003', 8, 'open', 'cms', '2024-01-03T10:00:00Z')",
            ))
            .await
            .expect("seed orders");

        CommandContext::new(config, write_fixtures(tmp.path()))
            .expect("context")
            .with_executor(Arc::new(gateway))
            .with_browser(browser)
    }

    /// Separate SQLite test-data database with the customer and product tables.
    pub async fn test_data_gateway(tmp: &TempDir) -> SqlGateway {
        let gateway = SqlGateway::sqlite(tmp.path().join("test-data.db").display().to_string());
        for statement in &SCHEMA[1..] {
            gateway
                .execute_statement(&QueryDescriptor::raw(gateway.dialect(), *statement))
                .await
                .expect("create table");
        }
        gateway
    }
}
