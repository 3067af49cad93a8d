//! Named operations shared by hubcheck scenarios.
//!
//! Every command is a method on [`CommandContext`], which owns the
//! configuration, the database gateway, the health checker, the session
//! cache and the lazily launched browser.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

/// API health and generated-link commands.
pub mod api;
/// Login and session commands.
pub mod auth;
/// The shared command context.
pub mod context;
/// Customer commands.
pub mod customers;
/// Order database queries.
pub mod db;
/// Command errors.
pub mod error;
/// Legacy orders tab commands.
pub mod orders;
/// Product commands.
pub mod products;
/// UI plus database verification.
pub mod verify;

// Re-export commonly used types
pub use api::{CHECKOUT_API, HUB_API};
pub use context::CommandContext;
pub use error::{CommandError, Result};
