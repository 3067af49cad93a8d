//! Hubcheck Database Layer
//!
//! Read-mostly access to the hub's relational database for cross-checking
//! what the UI shows.
//!
//! # Architecture
//!
//! - **Query Library**: pure functions per table family ([`orders`],
//!   [`subscriptions`], [`draft_orders`], [`customers`], [`products`]) that
//!   return a [`QueryDescriptor`]. Caller values are always bound parameters.
//! - **Gateway**: [`SqlGateway`] implements [`QueryExecutor`] for PostgreSQL,
//!   MySQL and SQLite, with one connection per call.
//!
//! # Example
//!
//! ```ignore
//! use hubcheck_db::{orders, QueryExecutor, SqlGateway};
//!
//! let gateway = SqlGateway::new(config.database.clone());
//! let rows = gateway
//!     .execute(&orders::order_count_for_company(gateway.dialect(), "shopify stripe"))
//!     .await?;
//! let total = rows[0].get_i64("total_orders");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod customers;
pub mod decode;
pub mod descriptor;
pub mod draft_orders;
pub mod error;
pub mod gateway;
pub mod orders;
pub mod products;
pub mod record;
pub mod subscriptions;

// Re-export commonly used types
pub use descriptor::{escape_like, Dialect, QueryBuilder, QueryDescriptor, SqlParam};
pub use error::{DatabaseError, Result};
pub use gateway::{QueryExecutor, SqlGateway};
pub use record::Record;
