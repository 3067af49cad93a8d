//! Health checks for the services the hub depends on.
//!
//! Each endpoint is requested without following redirects. A status outside
//! the accepted set (default `200`, `301`, `302`) is retried once after a
//! delay; the second result is final.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod checker;
pub mod error;

// Re-export commonly used types
pub use checker::{HealthChecker, HealthStatus};
pub use error::{HealthError, Result};
