//! Login credentials.

use crate::error::{AuthError, Result};
use hubcheck_core::CredentialsConfig;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::Zeroizing;

/// Email and password of one account. The password is zeroized on drop
/// and never printed.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Create credentials. Both parts must be non-empty.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let password = Zeroizing::new(password.into());
        if email.trim().is_empty() {
            return Err(AuthError::InvalidCredentials("email is empty".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials(format!(
                "password for {email} is empty"
            )));
        }
        Ok(Self { email, password })
    }

    /// Credentials of the configured test user.
    pub fn from_config(config: &CredentialsConfig) -> Result<Self> {
        Self::new(config.email.clone(), config.password.clone())
    }

    /// Login email
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Login password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// In-process fingerprint used to notice credential changes for a key.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.email.hash(&mut hasher);
        self.password.as_str().hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
