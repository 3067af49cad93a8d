//! Session handling for hubcheck.
//!
//! Logging in through the UI is slow, so each authenticated browser state
//! is captured once per [`SessionKey`](hubcheck_core::SessionKey) and
//! restored on later requests in the same run.
//!
//! # State per key
//!
//! 1. **Uncached**: the first `establish` runs the [`LoginFlow`] and caches
//!    the captured storage state. A failing flow leaves the key uncached.
//! 2. **Cached**: later calls with the same credentials restore the state.
//! 3. A credential change, `invalidate` or `clear` returns the key to
//!    uncached.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod credentials;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use credentials::Credentials;
pub use error::{AuthError, Result};
pub use session::{CachedSession, LoginFlow, SessionManager, SessionOutcome};
