//! Shared newtypes used across the hubcheck crates.

use crate::error::HubError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Name of one cached authenticated browser state.
///
/// Keys are 1-64 characters of ASCII letters, digits, `-`, `_` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    /// Session key used by the plain `login` command.
    pub const DEFAULT: &'static str = "userLogin";

    /// Create a new `SessionKey`.
    ///
    /// # Errors
    /// Returns error if the key is empty, too long or has unsupported characters.
    pub fn new(key: impl Into<String>) -> Result<Self, HubError> {
        let key = key.into();
        static KEY_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            KEY_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]{1,64}$").expect("valid regex"));

        if regex.is_match(&key) {
            Ok(Self(key))
        } else {
            Err(HubError::Validation(format!(
                "invalid session key: expected 1-64 of [A-Za-z0-9._-], got '{key}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public order number as shown in the hub UI (the `order_id` column).
///
/// Order numbers are alphanumeric with optional `-`, e.g. `1042` or `HUB-1042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new `OrderId`.
    ///
    /// # Errors
    /// Returns error if the value is empty or contains unsupported characters.
    pub fn new(id: impl Into<String>) -> Result<Self, HubError> {
        let id = id.into();
        static ORDER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = ORDER_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,63}$").expect("valid regex"));

        if regex.is_match(&id) {
            Ok(Self(id))
        } else {
            Err(HubError::Validation(format!("invalid order id: '{id}'")))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription identifier read from the order detail product table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Create a new `SubscriptionId`.
    ///
    /// Surrounding whitespace is trimmed since table cells carry padding.
    ///
    /// # Errors
    /// Returns error if the value is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, HubError> {
        let id = id.into();
        let trimmed = id.trim();
        static SUB_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SUB_REGEX.get_or_init(|| Regex::new(r"^\S{1,64}$").expect("valid regex"));

        if regex.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(HubError::Validation(format!(
                "invalid subscription id: '{id}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of subscription attached to an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Usage-based subscription
    Consumable,
    /// Regular recurring subscription
    Normal,
    /// Digital goods subscription
    Digital,
}

impl SubscriptionType {
    /// Parse the text of a product-table cell; unknown text yields `None`.
    #[must_use]
    pub fn from_cell(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "consumable" => Some(Self::Consumable),
            "normal" => Some(Self::Normal),
            "digital" => Some(Self::Digital),
            _ => None,
        }
    }

    /// Label as rendered by the hub.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consumable => "consumable",
            Self::Normal => "normal",
            Self::Digital => "digital",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
