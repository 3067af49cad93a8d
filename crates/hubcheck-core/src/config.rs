//! Layered suite configuration.
//!
//! One schema, loaded from `hubcheck.toml`. A file may hold a `[base]` table
//! plus `[profiles.<name>]` overlays; the selected profile is deep-merged over
//! the base before deserializing. Environment variables are applied last.
//!
//! ```toml
//! [base.app]
//! base_url = "https://hub.development.example.com/"
//!
//! [profiles.health-check.suite]
//! groups = ["health-check"]
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hubcheck.toml";

/// Complete configuration for one suite run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application under test
    pub app: AppConfig,
    /// Test user credentials
    pub credentials: CredentialsConfig,
    /// Database connection used for verification queries
    pub database: DatabaseConfig,
    /// Separate database holding customer/product test data; `database`
    /// is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_data_database: Option<DatabaseConfig>,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Wait and request timeouts
    pub timeouts: TimeoutConfig,
    /// Scenario re-execution counts
    pub retries: RetryConfig,
    /// Dependent API health checks
    pub health: HealthConfig,
    /// Scenario selection and artifact locations
    pub suite: SuiteSelection,
}

impl SuiteConfig {
    /// Load configuration for `profile`.
    ///
    /// With `path == None` the default file in the working directory is used
    /// when present, otherwise built-in defaults apply. An explicit path that
    /// does not exist is an error.
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> ConfigResult<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => {
                return Err(ConfigError::NotFound {
                    path: p.display().to_string(),
                })
            }
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        match config_path {
            Some(p) => {
                tracing::debug!("Loading config from {}", p.display());
                let contents = fs::read_to_string(&p)?;
                Self::from_toml_str(&contents, profile)
            }
            None => {
                tracing::debug!("Config file not found, using defaults");
                if let Some(name) = profile {
                    return Err(ConfigError::UnknownProfile {
                        name: name.to_string(),
                        available: Vec::new(),
                    });
                }
                Ok(Self::default())
            }
        }
    }

    /// Load configuration, apply `HUBCHECK_*` environment overrides and validate.
    pub fn load_with_env(path: Option<&Path>, profile: Option<&str>) -> ConfigResult<Self> {
        let mut config = Self::load(path, profile)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config document and resolve `profile` against its base table.
    pub fn from_toml_str(contents: &str, profile: Option<&str>) -> ConfigResult<Self> {
        let mut doc: toml::Table = contents.parse()?;

        let layered = doc.contains_key("base") || doc.contains_key("profiles");
        let mut profiles = match doc.remove("profiles") {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                return Err(ConfigError::InvalidValue {
                    field: "profiles".to_string(),
                    reason: "must be a table of profile tables".to_string(),
                })
            }
            None => toml::Table::new(),
        };

        let mut merged = if layered {
            match doc.remove("base") {
                Some(toml::Value::Table(t)) => t,
                Some(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: "base".to_string(),
                        reason: "must be a table".to_string(),
                    })
                }
                None => toml::Table::new(),
            }
        } else {
            doc
        };

        if let Some(name) = profile {
            match profiles.remove(name) {
                Some(toml::Value::Table(overlay)) => {
                    tracing::debug!("Applying profile overlay '{}'", name);
                    merge_tables(&mut merged, overlay);
                }
                Some(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("profiles.{name}"),
                        reason: "must be a table".to_string(),
                    })
                }
                None => {
                    let mut available: Vec<String> = profiles.keys().cloned().collect();
                    available.sort();
                    return Err(ConfigError::UnknownProfile {
                        name: name.to_string(),
                        available,
                    });
                }
            }
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Recognized variables:
    /// - `HUBCHECK_BASE_URL`, `HUBCHECK_LOGIN_URL`, `HUBCHECK_COMPANY`
    /// - `HUBCHECK_TEST_USER_EMAIL`, `HUBCHECK_TEST_USER_PASSWORD`
    /// - `HUBCHECK_DB_ENGINE`, `HUBCHECK_DB_HOST`, `HUBCHECK_DB_PORT`,
    ///   `HUBCHECK_DB_USER`, `HUBCHECK_DB_PASSWORD`, `HUBCHECK_DB_NAME`,
    ///   `HUBCHECK_DB_SSL`
    /// - the same suffixes under `HUBCHECK_TEST_DATA_DB_` for
    ///   `test_data_database`, which is created from defaults when only the
    ///   environment names it
    /// - `HUBCHECK_HEADLESS`, `HUBCHECK_RETRIES`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HUBCHECK_BASE_URL") {
            self.app.base_url = val;
        }
        if let Some(val) = lookup("HUBCHECK_LOGIN_URL") {
            self.app.login_url = Some(val);
        }
        if let Some(val) = lookup("HUBCHECK_COMPANY") {
            self.app.company = val;
        }
        if let Some(val) = lookup("HUBCHECK_TEST_USER_EMAIL") {
            self.credentials.email = val;
        }
        if let Some(val) = lookup("HUBCHECK_TEST_USER_PASSWORD") {
            self.credentials.password = val;
        }
        self.database.apply_overrides("HUBCHECK_DB_", &lookup)?;
        let test_data_named = DB_OVERRIDE_SUFFIXES
            .iter()
            .any(|suffix| lookup(&format!("HUBCHECK_TEST_DATA_DB_{suffix}")).is_some());
        if test_data_named {
            self.test_data_database
                .get_or_insert_with(DatabaseConfig::default)
                .apply_overrides("HUBCHECK_TEST_DATA_DB_", &lookup)?;
        }
        if let Some(val) = lookup("HUBCHECK_HEADLESS") {
            self.browser.headless = parse_override("HUBCHECK_HEADLESS", &val)?;
            tracing::debug!("Override browser.headless from env: {}", self.browser.headless);
        }
        if let Some(val) = lookup("HUBCHECK_RETRIES") {
            self.retries.run_mode = parse_override("HUBCHECK_RETRIES", &val)?;
        }
        Ok(())
    }

    /// Check values that would otherwise fail deep inside a scenario.
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_http_url(&self.app.base_url) {
            return Err(invalid("app.base_url", "must be an http(s) URL"));
        }
        if let Some(login) = &self.app.login_url {
            if !is_http_url(login) {
                return Err(invalid("app.login_url", "must be an http(s) URL"));
            }
        }

        let t = &self.timeouts;
        for (field, value) in [
            ("timeouts.command_ms", t.command_ms),
            ("timeouts.request_ms", t.request_ms),
            ("timeouts.response_ms", t.response_ms),
            ("timeouts.page_load_ms", t.page_load_ms),
            ("timeouts.poll_interval_ms", t.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        self.database.validate("database")?;
        if let Some(test_data) = &self.test_data_database {
            test_data.validate("test_data_database")?;
        }

        for endpoint in &self.health.endpoints {
            if endpoint.name.is_empty() {
                return Err(invalid("health.endpoints.name", "must not be empty"));
            }
            if !is_http_url(&endpoint.url) {
                return Err(invalid(
                    &format!("health.endpoints.{}.url", endpoint.name),
                    "must be an http(s) URL",
                ));
            }
        }
        if self.health.accepted_statuses.is_empty() {
            return Err(invalid("health.accepted_statuses", "must not be empty"));
        }

        Ok(())
    }

    /// Render the resolved configuration as TOML without secrets.
    pub fn to_redacted_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Recursively merge `overlay` into `base`; tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_override<T: FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field: var.to_string(),
        reason: format!("cannot parse '{value}'"),
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Application under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root URL of the hub, with trailing slash
    pub base_url: String,
    /// Login page; derived from `base_url` when unset
    pub login_url: Option<String>,
    /// UI locale segment used in paths
    pub locale: String,
    /// Company (tenant) selected after login
    pub company: String,
}

impl AppConfig {
    /// Absolute URL for a path below the locale segment, e.g. `cms/orders`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{}/{path}", self.locale)
        }
    }

    /// Login page URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.login_url
            .clone()
            .unwrap_or_else(|| self.url_for("auth/login"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            login_url: None,
            locale: "en".to_string(),
            company: "shopify stripe".to_string(),
        }
    }
}

/// Test user credentials. The password is never serialized.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Login email
    pub email: String,
    /// Login password
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supported relational engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEngine {
    /// PostgreSQL
    #[default]
    Postgres,
    /// MySQL / MariaDB
    Mysql,
    /// SQLite file (local fixtures)
    Sqlite,
}

impl DbEngine {
    /// Conventional port for the engine (0 for SQLite).
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Mysql => 3306,
            Self::Sqlite => 0,
        }
    }
}

impl FromStr for DbEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(invalid(
                "database.engine",
                &format!("unknown engine '{other}' (expected postgres, mysql or sqlite)"),
            )),
        }
    }
}

impl fmt::Display for DbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

/// Variable suffixes read by [`DatabaseConfig::apply_overrides`].
const DB_OVERRIDE_SUFFIXES: [&str; 7] =
    ["ENGINE", "HOST", "PORT", "USER", "PASSWORD", "NAME", "SSL"];

/// Database connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Engine behind the endpoint
    pub engine: DbEngine,
    /// Host name (ignored for SQLite)
    pub host: String,
    /// Port; the engine's conventional port when unset (ignored for SQLite)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// User name
    pub user: String,
    /// Password, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name, or file path for SQLite
    pub name: String,
    /// Require TLS
    pub ssl: bool,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port())
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl", &self.ssl)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Port to connect to: the configured one, else the engine's default.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    /// Apply `<prefix>ENGINE`, `<prefix>HOST` and the other
    /// [`DB_OVERRIDE_SUFFIXES`] variables.
    fn apply_overrides<F>(&mut self, prefix: &str, lookup: &F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| format!("{prefix}{suffix}");
        if let Some(val) = lookup(&var("ENGINE")) {
            self.engine = val.parse()?;
        }
        if let Some(val) = lookup(&var("HOST")) {
            self.host = val;
        }
        if let Some(val) = lookup(&var("PORT")) {
            self.port = Some(parse_override(&var("PORT"), &val)?);
        }
        if let Some(val) = lookup(&var("USER")) {
            self.user = val;
        }
        if let Some(val) = lookup(&var("PASSWORD")) {
            self.password = val;
        }
        if let Some(val) = lookup(&var("NAME")) {
            self.name = val;
        }
        if let Some(val) = lookup(&var("SSL")) {
            self.ssl = parse_override(&var("SSL"), &val)?;
        }
        Ok(())
    }

    fn validate(&self, section: &str) -> ConfigResult<()> {
        if self.engine != DbEngine::Sqlite && self.port() == 0 {
            return Err(invalid(&format!("{section}.port"), "must be greater than zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(invalid(
                &format!("{section}.connect_timeout_secs"),
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: DbEngine::Postgres,
            host: "localhost".to_string(),
            port: None,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postgres".to_string(),
            ssl: false,
            connect_timeout_secs: 15,
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Save a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Fail scenarios on uncaught exceptions thrown by the page
    pub fail_on_page_errors: bool,
    /// Explicit Chrome/Chromium binary
    pub chrome_executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            screenshot_on_failure: true,
            fail_on_page_errors: false,
            chrome_executable: None,
        }
    }
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default wait for element and URL conditions
    pub command_ms: u64,
    /// HTTP connect timeout
    pub request_ms: u64,
    /// Time allowed for the response once connected; a request may take
    /// `request_ms + response_ms` in total
    pub response_ms: u64,
    /// Page navigation timeout
    pub page_load_ms: u64,
    /// Poll interval for condition waits
    pub poll_interval_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_ms: 20_000,
            request_ms: 15_000,
            response_ms: 15_000,
            page_load_ms: 30_000,
            poll_interval_ms: 100,
        }
    }
}

/// How often a failed scenario is re-executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries for `hubcheck run`
    pub run_mode: u32,
    /// Retries when running a single scenario interactively
    pub open_mode: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            run_mode: 2,
            open_mode: 0,
        }
    }
}

/// One dependent API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Short name used in logs and errors
    pub name: String,
    /// Version/health URL
    pub url: String,
    /// Retry once after `retry_delay_secs` when unhealthy
    #[serde(default = "default_true")]
    pub retry: bool,
}

fn default_true() -> bool {
    true
}

/// Dependent API health checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Endpoints checked by `check_all`, in order
    pub endpoints: Vec<EndpointConfig>,
    /// Delay before the single retry
    pub retry_delay_secs: u64,
    /// Status codes counted as healthy
    pub accepted_statuses: Vec<u16>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                EndpointConfig {
                    name: "hub-api".to_string(),
                    url: "http://localhost:8081/v1/version".to_string(),
                    retry: true,
                },
                EndpointConfig {
                    name: "checkout-api".to_string(),
                    url: "http://localhost:8082/v1/version".to_string(),
                    retry: true,
                },
            ],
            retry_delay_secs: 15,
            accepted_statuses: vec![200, 301, 302],
        }
    }
}

/// Scenario selection and file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteSelection {
    /// Scenario groups to run; empty means all
    pub groups: Vec<String>,
    /// Directory holding JSON fixtures
    pub fixtures_dir: PathBuf,
    /// Directory for screenshots and other artifacts
    pub artifacts_dir: PathBuf,
    /// Shop platform the test data belongs to
    pub platform: String,
}

impl Default for SuiteSelection {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            fixtures_dir: PathBuf::from("fixtures"),
            artifacts_dir: PathBuf::from("artifacts"),
            platform: "shopify".to_string(),
        }
    }
}

impl SuiteSelection {
    /// Whether scenarios of `group` are selected.
    #[must_use]
    pub fn includes_group(&self, group: &str) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|g| g == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const LAYERED: &str = r#"
[base.app]
base_url = "https://hub.development.example.com/"
company = "shopify stripe"

[base.database]
host = "db.development.internal"
user = "qa"
password = "secret"

[profiles.health-check.suite]
groups = ["health-check"]

[profiles.health-check.browser]
screenshot_on_failure = false

[profiles.staging.app]
base_url = "https://hub.staging.example.com/"
"#;

    #[test]
    fn test_default_config() {
        let config = SuiteConfig::default();
        assert_eq!(config.browser.viewport_width, 1920);
        assert_eq!(config.browser.viewport_height, 1080);
        assert_eq!(config.timeouts.command_ms, 20_000);
        assert_eq!(config.timeouts.page_load_ms, 30_000);
        assert_eq!(config.retries.run_mode, 2);
        assert_eq!(config.retries.open_mode, 0);
        assert_eq!(config.database.port(), 5432);
        assert!(config.test_data_database.is_none());
        assert!(!config.database.ssl);
        assert_eq!(config.health.accepted_statuses, vec![200, 301, 302]);
        assert_eq!(config.health.retry_delay_secs, 15);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_base_without_profile() {
        let config = SuiteConfig::from_toml_str(LAYERED, None).expect("parse base");
        assert_eq!(config.app.base_url, "https://hub.development.example.com/");
        assert_eq!(config.database.host, "db.development.internal");
        assert!(config.suite.groups.is_empty());
        assert!(config.browser.screenshot_on_failure);
    }

    #[test]
    fn test_profile_overlay_merges_over_base() {
        let config =
            SuiteConfig::from_toml_str(LAYERED, Some("health-check")).expect("parse profile");
        assert_eq!(config.suite.groups, vec!["health-check".to_string()]);
        assert!(!config.browser.screenshot_on_failure);
        // untouched base values survive the overlay
        assert_eq!(config.app.base_url, "https://hub.development.example.com/");
        assert_eq!(config.database.user, "qa");
        assert_eq!(config.browser.viewport_width, 1920);
    }

    #[test]
    fn test_profile_overlay_replaces_nested_value() {
        let config = SuiteConfig::from_toml_str(LAYERED, Some("staging")).expect("parse profile");
        assert_eq!(config.app.base_url, "https://hub.staging.example.com/");
        assert_eq!(config.app.company, "shopify stripe");
    }

    #[test]
    fn test_unknown_profile() {
        let err = SuiteConfig::from_toml_str(LAYERED, Some("prod")).unwrap_err();
        match err {
            ConfigError::UnknownProfile { name, available } => {
                assert_eq!(name, "prod");
                assert_eq!(available, vec!["health-check", "staging"]);
            }
            other => panic!("expected UnknownProfile, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_document_is_base() {
        let toml_str = r#"
[app]
company = "acme"

[timeouts]
command_ms = 5000
"#;
        let config = SuiteConfig::from_toml_str(toml_str, None).expect("parse flat config");
        assert_eq!(config.app.company, "acme");
        assert_eq!(config.timeouts.command_ms, 5000);
        assert_eq!(config.timeouts.request_ms, 15_000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HUBCHECK_BASE_URL", "https://hub.ci.example.com/"),
            ("HUBCHECK_TEST_USER_EMAIL", "qa@example.com"),
            ("HUBCHECK_DB_ENGINE", "mysql"),
            ("HUBCHECK_DB_PORT", "3307"),
            ("HUBCHECK_DB_SSL", "true"),
            ("HUBCHECK_HEADLESS", "false"),
            ("HUBCHECK_RETRIES", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .expect("apply overrides");

        assert_eq!(config.app.base_url, "https://hub.ci.example.com/");
        assert_eq!(config.credentials.email, "qa@example.com");
        assert_eq!(config.database.engine, DbEngine::Mysql);
        assert_eq!(config.database.port(), 3307);
        assert!(config.database.ssl);
        assert!(!config.browser.headless);
        assert_eq!(config.retries.run_mode, 0);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_overrides(|key| (key == "HUBCHECK_DB_PORT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = SuiteConfig::default();
        config.timeouts.command_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts.command_ms"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = SuiteConfig::default();
        config.app.base_url = "hub.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_toml_hides_secrets() {
        let mut config = SuiteConfig::default();
        config.credentials.password = "Pa$$word".to_string();
        config.database.password = "db-secret".to_string();

        let rendered = config.to_redacted_toml().expect("render config");
        assert!(!rendered.contains("Pa$$word"));
        assert!(!rendered.contains("db-secret"));
        assert!(rendered.contains("[database]"));

        let debug = format!("{:?}", config.credentials);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("Pa$$word"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("hubcheck.toml");
        fs::write(&path, LAYERED).expect("write config");

        let config = SuiteConfig::load(Some(&path), Some("health-check")).expect("load");
        assert_eq!(config.suite.groups, vec!["health-check".to_string()]);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("missing.toml");
        let err = SuiteConfig::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_app_urls() {
        let app = AppConfig {
            base_url: "https://hub.example.com/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(app.url_for("cms/orders"), "https://hub.example.com/en/cms/orders");
        assert_eq!(app.url_for(""), "https://hub.example.com/");
        assert_eq!(app.login_url(), "https://hub.example.com/en/auth/login");
    }

    #[test]
    fn test_engine_parsing() {
        assert_eq!("PostgreSQL".parse::<DbEngine>().unwrap(), DbEngine::Postgres);
        assert_eq!("mariadb".parse::<DbEngine>().unwrap(), DbEngine::Mysql);
        assert!("oracle".parse::<DbEngine>().is_err());
    }

    #[test]
    fn test_group_selection() {
        let mut selection = SuiteSelection::default();
        assert!(selection.includes_group("order-list"));
        selection.groups = vec!["health-check".to_string()];
        assert!(selection.includes_group("health-check"));
        assert!(!selection.includes_group("order-list"));
    }

    #[test]
    fn test_engine_default_port_applies_when_port_unset() {
        let config = SuiteConfig::from_toml_str("[database]\nengine = \"mysql\"\n", None)
            .expect("parse config");
        assert_eq!(config.database.port, None);
        assert_eq!(config.database.port(), 3306);

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| (key == "HUBCHECK_DB_ENGINE").then(|| "mysql".to_string()))
            .expect("apply overrides");
        assert_eq!(config.database.port(), 3306);

        let explicit = SuiteConfig::from_toml_str(
            "[database]\nengine = \"mysql\"\nport = 3310\n",
            None,
        )
        .expect("parse config");
        assert_eq!(explicit.database.port(), 3310);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = SuiteConfig::default();
        config.database.port = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("database.port"));
    }

    #[test]
    fn test_test_data_database_section() {
        let toml_str = r#"
[base.database]
host = "orders-db.internal"

[base.test_data_database]
engine = "mysql"
host = "testdata-db.internal"
name = "hub_test_data"
password = "td-secret"
"#;
        let config = SuiteConfig::from_toml_str(toml_str, None).expect("parse config");
        let test_data = config.test_data_database.as_ref().expect("test data section");
        assert_eq!(test_data.engine, DbEngine::Mysql);
        assert_eq!(test_data.port(), 3306);
        assert_eq!(test_data.name, "hub_test_data");
        assert_eq!(config.database.host, "orders-db.internal");
        config.validate().expect("valid config");

        let rendered = config.to_redacted_toml().expect("render config");
        assert!(rendered.contains("[test_data_database]"));
        assert!(!rendered.contains("td-secret"));
    }

    #[test]
    fn test_test_data_database_from_env() {
        let env: HashMap<&str, &str> = [
            ("HUBCHECK_TEST_DATA_DB_ENGINE", "mysql"),
            ("HUBCHECK_TEST_DATA_DB_HOST", "testdata-db.ci"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .expect("apply overrides");

        let test_data = config.test_data_database.expect("created from env");
        assert_eq!(test_data.engine, DbEngine::Mysql);
        assert_eq!(test_data.host, "testdata-db.ci");
        assert_eq!(test_data.port(), 3306);
        assert_eq!(config.database.engine, DbEngine::Postgres);
    }
}
