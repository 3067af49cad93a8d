//! Browser storage-state snapshots.

use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cookie as captured from the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Unix seconds; `None` for session cookies.
    #[serde(default)]
    pub expires: Option<f64>,
}

/// Cookies plus localStorage of one origin, captured after login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    /// Origin (`scheme://host[:port]`) the state was captured on
    pub origin: String,
    /// All cookies visible to the page
    pub cookies: Vec<StoredCookie>,
    /// localStorage entries of `origin`
    pub local_storage: BTreeMap<String, String>,
}

impl StorageState {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_storage.is_empty()
    }

    /// Cookie by name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&StoredCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

/// Origin (`scheme://host[:port]`) of a URL.
pub fn origin_of(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("invalid URL '{url}': {e}")))?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Ok(origin.ascii_serialization()),
        url::Origin::Opaque(_) => Err(BrowserError::NavigationError(format!(
            "URL has no origin: {url}"
        ))),
    }
}
