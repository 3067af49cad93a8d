//! Keyed session cache.
//!
//! Each [`SessionKey`] is either uncached or cached with the storage state
//! captured right after a successful login. A cached key restores that state
//! instead of logging in again; a failed login stores nothing.

use crate::credentials::Credentials;
use crate::error::Result;
use hubcheck_browser::{BrowserActions, StorageState};
use hubcheck_core::SessionKey;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Steps that take a logged-out browser to an authenticated landing page.
#[async_trait::async_trait]
pub trait LoginFlow: Send + Sync {
    /// Run the flow. Must fail unless the landing page was reached.
    async fn log_in(&self, browser: &dyn BrowserActions, credentials: &Credentials) -> Result<()>;
}

/// A captured session.
#[derive(Debug, Clone)]
pub struct CachedSession {
    /// Storage state captured after login
    pub state: StorageState,
    fingerprint: u64,
}

/// How [`SessionManager::establish`] satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The login flow ran and its state was cached
    LoggedIn,
    /// A cached state was restored
    Restored,
}

#[derive(Debug, Default)]
struct Sessions {
    cached: HashMap<SessionKey, CachedSession>,
    logins: HashMap<SessionKey, u32>,
}

/// Session cache owned by the command context for the whole run.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Mutex<Sessions>,
}

impl SessionManager {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `browser` authenticated as `credentials` under `key`.
    ///
    /// Establishment is serialized, so at most one flow runs per key even
    /// when callers race.
    pub async fn establish(
        &self,
        key: &SessionKey,
        credentials: &Credentials,
        browser: &dyn BrowserActions,
        flow: &dyn LoginFlow,
    ) -> Result<SessionOutcome> {
        let mut sessions = self.sessions.lock().await;
        let fingerprint = credentials.fingerprint();

        if let Some(session) = sessions.cached.get(key) {
            if session.fingerprint == fingerprint {
                browser.restore_state(&session.state).await?;
                tracing::debug!("Restored cached session '{}'", key);
                return Ok(SessionOutcome::Restored);
            }
            tracing::info!("Credentials changed for session '{}', logging in again", key);
        }
        sessions.cached.remove(key);

        browser.clear_state().await?;
        *sessions.logins.entry(key.clone()).or_insert(0) += 1;
        tracing::info!("Logging in as {} (session '{}')", credentials.email(), key);
        flow.log_in(browser, credentials).await?;

        let state = browser.capture_state().await?;
        tracing::info!(
            "Session '{}' cached ({} cookies, {} storage entries)",
            key,
            state.cookies.len(),
            state.local_storage.len()
        );
        sessions
            .cached
            .insert(key.clone(), CachedSession { state, fingerprint });
        Ok(SessionOutcome::LoggedIn)
    }

    /// Whether `key` has a cached session.
    pub async fn is_cached(&self, key: &SessionKey) -> bool {
        self.sessions.lock().await.cached.contains_key(key)
    }

    /// Number of login flows run for `key`.
    pub async fn login_count(&self, key: &SessionKey) -> u32 {
        self.sessions
            .lock()
            .await
            .logins
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Drop the session of `key`. Returns whether one was cached.
    pub async fn invalidate(&self, key: &SessionKey) -> bool {
        let removed = self.sessions.lock().await.cached.remove(key).is_some();
        if removed {
            tracing::debug!("Session '{}' invalidated", key);
        }
        removed
    }

    /// Drop every cached session.
    pub async fn clear(&self) {
        self.sessions.lock().await.cached.clear();
        tracing::debug!("Session cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};
    use hubcheck_browser::Locator;
    use std::sync::atomic::{AtomicBool, Ordering};

    const LOGIN_URL: &str = "http://localhost:3000/en/auth/login";

    fn submit() -> Locator {
        Locator::role("button", "Log in")
    }

    /// Navigates to the login page and clicks submit.
    struct ClickThrough;

    #[async_trait::async_trait]
    impl LoginFlow for ClickThrough {
        async fn log_in(&self, browser: &dyn BrowserActions, _: &Credentials) -> Result<()> {
            browser.navigate(LOGIN_URL).await?;
            browser.click(&submit()).await?;
            Ok(())
        }
    }

    struct Failing(AtomicBool);

    #[async_trait::async_trait]
    impl LoginFlow for Failing {
        async fn log_in(&self, browser: &dyn BrowserActions, creds: &Credentials) -> Result<()> {
            browser.navigate(LOGIN_URL).await?;
            if self.0.swap(false, Ordering::SeqCst) {
                return Err(AuthError::LoginFailed {
                    email: creds.email().to_string(),
                    reason: "still on /auth/login".to_string(),
                });
            }
            browser.click(&submit()).await?;
            Ok(())
        }
    }

    fn browser() -> ScriptedBrowser {
        let browser = ScriptedBrowser::new();
        browser.on_navigate(
            "/auth/login",
            vec![Reaction::Show(submit(), FakeElement::visible("Log in"))],
        );
        browser.on_click(
            &submit(),
            vec![
                Reaction::SetUrl("http://localhost:3000/en/cms/orders".to_string()),
                Reaction::SetCookie("session".to_string(), "s1".to_string()),
            ],
        );
        browser
    }

    fn creds(password: &str) -> Credentials {
        Credentials::new("qa@example.com", password).unwrap()
    }

    #[tokio::test]
    async fn test_same_key_logs_in_once() {
        let manager = SessionManager::new();
        let browser = browser();
        let key = SessionKey::default();

        let first = manager
            .establish(&key, &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();
        let second = manager
            .establish(&key, &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();

        assert_eq!(first, SessionOutcome::LoggedIn);
        assert_eq!(second, SessionOutcome::Restored);
        assert_eq!(browser.navigations_to("/auth/login"), 1);
        assert_eq!(manager.login_count(&key).await, 1);
        assert!(manager.is_cached(&key).await);
    }

    #[tokio::test]
    async fn test_distinct_keys_log_in_separately() {
        let manager = SessionManager::new();
        let browser = browser();
        let admin = SessionKey::new("admin").unwrap();

        manager
            .establish(&SessionKey::default(), &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();
        manager
            .establish(&admin, &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();
        assert_eq!(browser.navigations_to("/auth/login"), 2);
    }

    #[tokio::test]
    async fn test_credential_change_runs_flow_again() {
        let manager = SessionManager::new();
        let browser = browser();
        let key = SessionKey::default();

        manager
            .establish(&key, &creds("old"), &browser, &ClickThrough)
            .await
            .unwrap();
        let outcome = manager
            .establish(&key, &creds("new"), &browser, &ClickThrough)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::LoggedIn);
        assert_eq!(manager.login_count(&key).await, 2);
    }

    #[tokio::test]
    async fn test_failed_login_stores_nothing() {
        let manager = SessionManager::new();
        let browser = browser();
        let key = SessionKey::default();
        let flow = Failing(AtomicBool::new(true));

        let err = manager
            .establish(&key, &creds("pw"), &browser, &flow)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::LoginFailed { .. }));
        assert!(!manager.is_cached(&key).await);

        let outcome = manager
            .establish(&key, &creds("pw"), &browser, &flow)
            .await
            .unwrap();
        assert_eq!(outcome, SessionOutcome::LoggedIn);
        assert_eq!(manager.login_count(&key).await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let manager = SessionManager::new();
        let browser = browser();
        let key = SessionKey::default();

        manager
            .establish(&key, &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();
        assert!(manager.invalidate(&key).await);
        assert!(!manager.invalidate(&key).await);

        manager
            .establish(&key, &creds("pw"), &browser, &ClickThrough)
            .await
            .unwrap();
        manager.clear().await;
        assert!(!manager.is_cached(&key).await);
        assert_eq!(browser.navigations_to("/auth/login"), 2);
    }
}
