//! Browser automation for hubcheck.
//!
//! Chromium control through CDP, prioritized element locators and
//! condition-based waits and assertions.

pub mod actions;
pub mod engine;
pub mod error;
pub mod expect;
pub mod locator;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wait;

pub use actions::BrowserActions;
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use locator::{Index, Locator, Strategy};
pub use state::{StorageState, StoredCookie};
pub use wait::{poll_until, WaitOptions};
