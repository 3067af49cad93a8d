//! Authentication commands.

use crate::context::CommandContext;
use crate::error::Result;
use hubcheck_auth::{Credentials, SessionOutcome};
use hubcheck_core::SessionKey;
use hubcheck_pages::HubFormLoginPage;

impl CommandContext {
    /// Log in as the configured test user under the default session key.
    ///
    /// The login flow runs once per run; later calls restore the cached
    /// browser state.
    pub async fn login(&self) -> Result<SessionOutcome> {
        let credentials = Credentials::from_config(&self.config().credentials)?;
        self.login_as(&SessionKey::default(), &credentials).await
    }

    /// Log in under `key`, reusing the cached session when credentials match.
    pub async fn login_as(
        &self,
        key: &SessionKey,
        credentials: &Credentials,
    ) -> Result<SessionOutcome> {
        let browser = self.browser().await?;
        let outcome = self
            .sessions()
            .establish(key, credentials, browser.as_ref(), self.login_flow())
            .await?;
        tracing::info!("Session '{}' ready ({:?})", key, outcome);
        Ok(outcome)
    }

    /// Log in through the plain `/login` form. Not cached.
    pub async fn login_to_hub(&self, username: &str, password: &str) -> Result<()> {
        let browser = self.browser().await?;
        HubFormLoginPage::new(self.base(browser.as_ref()))
            .log_in(username, password)
            .await?;
        tracing::info!("Verified: logged in to hub as {}", username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::context::test_support::context;
    use async_trait::async_trait;
    use hubcheck_auth::{Credentials, LoginFlow, SessionOutcome};
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};
    use hubcheck_browser::BrowserActions;
    use hubcheck_core::SessionKey;
    use hubcheck_pages::HubFormLoginPage;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NavigatingFlow;

    #[async_trait]
    impl LoginFlow for NavigatingFlow {
        async fn log_in(
            &self,
            browser: &dyn BrowserActions,
            _credentials: &Credentials,
        ) -> hubcheck_auth::Result<()> {
            browser
                .navigate("http://localhost:3000/en/auth/login")
                .await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_login_runs_flow_once_per_key() {
        let tmp = TempDir::new().unwrap();
        let browser = Arc::new(ScriptedBrowser::new());
        browser.on_navigate(
            "/auth/login",
            vec![Reaction::SetCookie("session".to_string(), "s1".to_string())],
        );
        let mut ctx = context(&tmp, Arc::clone(&browser)).await;
        ctx = ctx.with_login_flow(Arc::new(NavigatingFlow));

        let credentials = Credentials::new("qa@example.com", "secret").unwrap();
        let key = SessionKey::default();
        assert_eq!(
            ctx.login_as(&key, &credentials).await.unwrap(),
            SessionOutcome::LoggedIn
        );
        assert_eq!(
            ctx.login_as(&key, &credentials).await.unwrap(),
            SessionOutcome::Restored
        );
        assert_eq!(browser.navigations_to("/auth/login"), 1);
        assert_eq!(ctx.sessions().login_count(&key).await, 1);
    }

    #[tokio::test]
    async fn test_login_without_credentials_fails() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, Arc::new(ScriptedBrowser::new())).await;
        assert!(ctx.login().await.is_err());
    }

    #[tokio::test]
    async fn test_login_to_hub_form() {
        let tmp = TempDir::new().unwrap();
        let browser = Arc::new(ScriptedBrowser::new());
        browser
            .set(&HubFormLoginPage::username_input(), FakeElement::field(""))
            .set(&HubFormLoginPage::password_input(), FakeElement::field(""))
            .set(&HubFormLoginPage::submit_button(), FakeElement::visible("Sign in"))
            .on_click(
                &HubFormLoginPage::submit_button(),
                vec![Reaction::SetUrl(
                    "http://localhost:3000/dashboard".to_string(),
                )],
            );
        let ctx = context(&tmp, Arc::clone(&browser)).await;

        ctx.login_to_hub("qa", "secret").await.unwrap();
        assert_eq!(browser.navigations_to("/login"), 1);
        assert_eq!(
            browser.filled(&HubFormLoginPage::username_input()).as_deref(),
            Some("qa")
        );
    }
}
