//! Hubcheck Core - shared foundation for the hubcheck end-to-end suite.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - Layered TOML configuration with named profiles and env overrides
//! - [`types`] - Shared newtypes (`SessionKey`, `OrderId`, `SubscriptionId`)
//! - [`fixtures`] - JSON fixtures (billing address template, sample customers/products)
//!
//! # Example
//!
//! ```rust
//! use hubcheck_core::SuiteConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SuiteConfig::from_toml_str(
//!     "[base.app]\ncompany = \"acme\"\n[profiles.health-check.suite]\ngroups = [\"health-check\"]\n",
//!     Some("health-check"),
//! )?;
//! assert!(config.suite.includes_group("health-check"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod fixtures;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CredentialsConfig, DatabaseConfig, DbEngine, EndpointConfig,
    HealthConfig, RetryConfig, SuiteConfig, SuiteSelection, TimeoutConfig,
};
pub use error::{ConfigError, ConfigResult, HubError, Result};
pub use fixtures::{BillingAddress, Fixtures, SampleCustomer, SampleData, SampleProduct, TestData};
pub use types::{OrderId, SessionKey, SubscriptionId, SubscriptionType};
