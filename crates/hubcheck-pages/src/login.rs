//! Hub login page and the login flow built on it.

use crate::base::{BasePage, PageModel};
use hubcheck_auth::{AuthError, Credentials, LoginFlow};
use hubcheck_browser::{BrowserActions, BrowserError, Locator, Result, WaitOptions};
use hubcheck_core::AppConfig;

/// Login and company selection.
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    base: BasePage<'a>,
}

impl<'a> LoginPage<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Email field.
    pub fn email_input() -> Locator {
        Locator::css("input[type=\"email\"]")
    }

    /// Password field.
    pub fn password_input() -> Locator {
        Locator::css("input[type=\"password\"]")
    }

    /// Sign-in button.
    pub fn sign_in_button() -> Locator {
        Locator::css("button[name=\"login\"]")
    }

    /// Search field of the company picker.
    pub fn company_search_input() -> Locator {
        Locator::css("#input-v-0-3")
    }

    /// Entry for `company` in the company picker.
    pub fn company_option(company: &str) -> Locator {
        Locator::text(company)
    }

    /// Open the configured login URL.
    pub async fn visit(&self) -> Result<()> {
        self.base.goto(&self.base.app().login_url()).await?;
        self.wait_until_loaded().await
    }

    /// Fill the email field.
    pub async fn enter_email(&self, email: &str) -> Result<()> {
        self.base.fill(&Self::email_input(), email).await
    }

    /// Fill the password field. The value is not read back.
    pub async fn enter_password(&self, password: &str) -> Result<()> {
        self.base
            .browser()
            .fill(&Self::password_input(), password)
            .await
    }

    /// Submit the sign-in form; see [`LoginPage::verify_login_success`].
    pub async fn click_sign_in(&self) -> Result<()> {
        self.base.click(&Self::sign_in_button()).await
    }

    /// The hub moves on to tenant selection after a valid sign-in.
    pub async fn verify_login_success(&self) -> Result<()> {
        self.base.expect_url_contains("/auth/company").await?;
        tracing::info!("Verified: signed in");
        Ok(())
    }

    /// Search for `company` and pick it.
    pub async fn select_company(&self, company: &str) -> Result<()> {
        self.base
            .type_into(&Self::company_search_input(), company)
            .await?;
        self.base.click(&Self::company_option(company)).await?;
        tracing::info!("Verified: selected company {}", company);
        Ok(())
    }

    /// Expect the order list after picking a company.
    pub async fn verify_company_selection(&self) -> Result<()> {
        self.base.expect_url_contains("cms/orders").await?;
        Ok(())
    }

    /// Full flow: sign in, pick the company, land on the order list.
    pub async fn log_in(&self, credentials: &Credentials, company: &str) -> Result<()> {
        self.visit().await?;
        self.enter_email(credentials.email()).await?;
        self.enter_password(credentials.password()).await?;
        self.click_sign_in().await?;
        self.verify_login_success().await?;
        self.select_company(company).await?;
        self.verify_company_selection().await
    }
}

#[async_trait::async_trait]
impl PageModel for LoginPage<'_> {
    fn name(&self) -> &'static str {
        "login"
    }

    fn path(&self) -> String {
        "auth/login".to_string()
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.base.expect_visible(&Self::email_input()).await
    }
}

/// Plain username/password form at `/login` that lands on `/dashboard`.
#[derive(Debug, Clone, Copy)]
pub struct HubFormLoginPage<'a> {
    base: BasePage<'a>,
}

impl<'a> HubFormLoginPage<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    /// Username field.
    pub fn username_input() -> Locator {
        Locator::css("#username")
    }

    /// Password field.
    pub fn password_input() -> Locator {
        Locator::css("#password")
    }

    /// Log-in button.
    pub fn submit_button() -> Locator {
        Locator::css("button[type=\"submit\"]")
    }

    /// Log in through the form and wait for the dashboard.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/login", self.base.app().base_url.trim_end_matches('/'));
        self.base.goto(&url).await?;
        self.base.fill(&Self::username_input(), username).await?;
        self.base
            .browser()
            .fill(&Self::password_input(), password)
            .await?;
        self.base.click(&Self::submit_button()).await?;
        self.base.expect_url_contains("/dashboard").await?;
        Ok(())
    }
}

/// [`LoginFlow`] over [`LoginPage`], used by the session cache.
#[derive(Debug, Clone)]
pub struct HubLoginFlow {
    app: AppConfig,
    wait: WaitOptions,
}

impl HubLoginFlow {
    /// Flow for `app`, waiting with `wait`.
    #[must_use]
    pub fn new(app: AppConfig, wait: WaitOptions) -> Self {
        Self { app, wait }
    }
}

#[async_trait::async_trait]
impl LoginFlow for HubLoginFlow {
    async fn log_in(
        &self,
        browser: &dyn BrowserActions,
        credentials: &Credentials,
    ) -> hubcheck_auth::Result<()> {
        let page = LoginPage::new(BasePage::new(browser, &self.app, self.wait));
        page.log_in(credentials, &self.app.company)
            .await
            .map_err(|e| match e {
                BrowserError::Assertion(reason) | BrowserError::Timeout(reason) => {
                    AuthError::LoginFailed {
                        email: credentials.email().to_string(),
                        reason,
                    }
                }
                other => AuthError::Browser(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(100).with_poll_interval(10)
    }

    fn scripted_hub(company: &str) -> ScriptedBrowser {
        let browser = ScriptedBrowser::new();
        browser.on_navigate(
            "/auth/login",
            vec![
                Reaction::Show(LoginPage::email_input(), FakeElement::field("")),
                Reaction::Show(LoginPage::password_input(), FakeElement::field("")),
                Reaction::Show(LoginPage::sign_in_button(), FakeElement::visible("Sign in")),
            ],
        );
        browser.on_click(
            &LoginPage::sign_in_button(),
            vec![
                Reaction::SetUrl("http://localhost:3000/en/auth/company".to_string()),
                Reaction::Show(LoginPage::company_search_input(), FakeElement::field("")),
                Reaction::Show(LoginPage::company_option(company), FakeElement::visible(company)),
            ],
        );
        browser.on_click(
            &LoginPage::company_option(company),
            vec![
                Reaction::SetUrl("http://localhost:3000/en/cms/orders".to_string()),
                Reaction::SetCookie("hub_session".to_string(), "abc".to_string()),
            ],
        );
        browser
    }

    #[tokio::test]
    async fn test_login_flow_lands_on_orders() {
        let app = AppConfig::default();
        let browser = scripted_hub(&app.company);
        let creds = Credentials::new("qa@example.com", "pw").unwrap();

        HubLoginFlow::new(app.clone(), fast())
            .log_in(&browser, &creds)
            .await
            .unwrap();

        assert_eq!(
            browser.current_url().await.unwrap(),
            "http://localhost:3000/en/cms/orders"
        );
        assert_eq!(
            browser.filled(&LoginPage::email_input()).as_deref(),
            Some("qa@example.com")
        );
        assert!(browser.clicked(&LoginPage::company_option(&app.company)));
    }

    #[tokio::test]
    async fn test_login_flow_reports_wrong_landing_page() {
        let app = AppConfig::default();
        let browser = scripted_hub(&app.company);
        // Sign-in click that leaves the user on the login page
        browser.on_click(
            &LoginPage::sign_in_button(),
            vec![Reaction::SetUrl(app.login_url())],
        );
        let creds = Credentials::new("qa@example.com", "wrong").unwrap();

        let err = HubLoginFlow::new(app, fast())
            .log_in(&browser, &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::LoginFailed { .. }));
    }

    #[tokio::test]
    async fn test_form_login_reaches_dashboard() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser
            .set(&HubFormLoginPage::username_input(), FakeElement::field(""))
            .set(&HubFormLoginPage::password_input(), FakeElement::field(""))
            .set(&HubFormLoginPage::submit_button(), FakeElement::visible("Log in"))
            .on_click(
                &HubFormLoginPage::submit_button(),
                vec![Reaction::SetUrl("http://localhost:3000/dashboard".to_string())],
            );

        let page = HubFormLoginPage::new(BasePage::new(&browser, &app, fast()));
        page.log_in("hub-user", "secret").await.unwrap();
        assert_eq!(browser.navigations_to("localhost:3000/login"), 1);
    }
}
