//! Helpers shared by every page object.

use hubcheck_browser::expect;
use hubcheck_browser::{BrowserActions, Locator, Result, WaitOptions};
use hubcheck_core::AppConfig;

/// Browser handle, app URLs and wait settings a page works with.
///
/// Action helpers end with an assertion that the action took effect, so a
/// page method never returns before the UI caught up.
#[derive(Clone, Copy)]
pub struct BasePage<'a> {
    browser: &'a dyn BrowserActions,
    app: &'a AppConfig,
    wait: WaitOptions,
}

impl<'a> BasePage<'a> {
    /// Create a base page.
    #[must_use]
    pub fn new(browser: &'a dyn BrowserActions, app: &'a AppConfig, wait: WaitOptions) -> Self {
        Self { browser, app, wait }
    }

    /// Browser the page drives.
    #[must_use]
    pub fn browser(&self) -> &'a dyn BrowserActions {
        self.browser
    }

    /// Application settings.
    #[must_use]
    pub fn app(&self) -> &'a AppConfig {
        self.app
    }

    /// Wait settings for assertions.
    #[must_use]
    pub fn wait(&self) -> &WaitOptions {
        &self.wait
    }

    /// Navigate to `path` below the locale segment (`""` for the root).
    pub async fn visit(&self, path: &str) -> Result<()> {
        self.goto(&self.app.url_for(path)).await
    }

    /// Navigate to an absolute URL.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.browser.navigate(url).await
    }

    /// Current URL.
    pub async fn url(&self) -> Result<String> {
        self.browser.current_url().await
    }

    /// Click once the element is visible.
    ///
    /// This is the bare primitive: the caller asserts what the click changed.
    /// Prefer [`BasePage::click_revealing`] or [`BasePage::click_changing`]
    /// when the effect is a landmark or a label.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.browser.click(locator).await
    }

    /// Click, then wait for `revealed` to become visible.
    pub async fn click_revealing(&self, locator: &Locator, revealed: &Locator) -> Result<()> {
        self.browser.click(locator).await?;
        self.expect_visible(revealed).await
    }

    /// Click, then wait for the text of `watched` to differ from its text
    /// before the click. Returns the new text.
    pub async fn click_changing(&self, locator: &Locator, watched: &Locator) -> Result<String> {
        let before = self.text(watched).await?;
        self.browser.click(locator).await?;
        self.expect_text_not(watched, &before).await
    }

    /// Replace a field's value and confirm it.
    pub async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        self.browser.fill(locator, value).await?;
        self.expect_value(locator, value).await
    }

    /// Append text to a field and confirm the field holds it.
    pub async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        let before = self.value(locator).await?;
        self.browser.type_text(locator, text).await?;
        self.expect_value(locator, &format!("{before}{text}")).await
    }

    /// Tick a checkbox and confirm it.
    pub async fn check(&self, locator: &Locator) -> Result<()> {
        self.browser.check(locator).await?;
        self.expect_checked(locator).await
    }

    /// Choose a `<select>` option by value and confirm the selection.
    pub async fn select(&self, locator: &Locator, option: &str) -> Result<()> {
        self.browser.select_option(locator, option).await?;
        self.expect_value(locator, option).await
    }

    /// Text of the element once it exists.
    pub async fn text(&self, locator: &Locator) -> Result<String> {
        self.browser.text_content(locator).await
    }

    /// Value of the field once it exists.
    pub async fn value(&self, locator: &Locator) -> Result<String> {
        self.browser.input_value(locator).await
    }

    /// Number of matches right now.
    pub async fn count(&self, locator: &Locator) -> Result<usize> {
        self.browser.count(locator).await
    }

    /// Whether the element is visible right now.
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        self.browser.is_visible(locator).await
    }

    /// Wait for the element to be visible.
    pub async fn expect_visible(&self, locator: &Locator) -> Result<()> {
        expect::expect_visible(self.browser, locator, &self.wait).await
    }

    /// Wait for the element to be hidden or detached.
    pub async fn expect_hidden(&self, locator: &Locator) -> Result<()> {
        expect::expect_hidden(self.browser, locator, &self.wait).await
    }

    /// Wait for the URL to contain `fragment`; returns the URL.
    pub async fn expect_url_contains(&self, fragment: &str) -> Result<String> {
        expect::expect_url_contains(self.browser, fragment, &self.wait).await
    }

    /// Wait for the field to hold exactly `expected`.
    pub async fn expect_value(&self, locator: &Locator, expected: &str) -> Result<()> {
        expect::expect_value(self.browser, locator, expected, &self.wait).await
    }

    /// Expect the element's text to contain `text`; returns the full text.
    pub async fn expect_text(&self, locator: &Locator, text: &str) -> Result<String> {
        expect::expect_text_contains(self.browser, locator, text, &self.wait).await
    }

    /// Wait for the element's text to differ from `unexpected`; returns it.
    pub async fn expect_text_not(&self, locator: &Locator, unexpected: &str) -> Result<String> {
        expect::expect_text_not(self.browser, locator, unexpected, &self.wait).await
    }

    /// Wait for the checkbox to be checked.
    pub async fn expect_checked(&self, locator: &Locator) -> Result<()> {
        expect::expect_checked(self.browser, locator, &self.wait).await
    }

    /// Wait for at least `min` matches; returns the count.
    pub async fn expect_count_at_least(&self, locator: &Locator, min: usize) -> Result<usize> {
        expect::expect_count_at_least(self.browser, locator, min, &self.wait).await
    }
}

impl std::fmt::Debug for BasePage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePage")
            .field("base_url", &self.app.base_url)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

/// Page object contract.
#[async_trait::async_trait]
pub trait PageModel: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Path below the locale segment
    fn path(&self) -> String;

    /// Shared helpers
    fn base(&self) -> &BasePage<'_>;

    /// Wait until the page's landmark element is visible
    async fn wait_until_loaded(&self) -> Result<()>;

    /// Navigate to the page and wait for it.
    async fn open(&self) -> Result<()> {
        tracing::debug!("Opening {} page", self.name());
        self.base().visit(&self.path()).await?;
        self.wait_until_loaded().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(100).with_poll_interval(10)
    }

    #[tokio::test]
    async fn test_click_changing_requires_new_text() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let button = Locator::test_id("refresh");
        let label = Locator::test_id("status");
        browser
            .set(&button, FakeElement::visible("Refresh"))
            .set(&label, FakeElement::visible("stale"));
        let base = BasePage::new(&browser, &app, fast());

        let err = base.click_changing(&button, &label).await.unwrap_err();
        assert!(err.to_string().contains("stale"));

        browser.on_click(&button, vec![Reaction::SetText(label.clone(), "fresh".to_string())]);
        assert_eq!(base.click_changing(&button, &label).await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_click_revealing_waits_for_landmark() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let button = Locator::test_id("open");
        let dialog = Locator::test_id("dialog");
        browser.set(&button, FakeElement::visible("Open"));
        let base = BasePage::new(&browser, &app, fast());

        assert!(base.click_revealing(&button, &dialog).await.is_err());

        browser.on_click(&button, vec![Reaction::Show(dialog.clone(), FakeElement::visible(""))]);
        base.click_revealing(&button, &dialog).await.unwrap();
    }

    #[tokio::test]
    async fn test_type_into_confirms_appended_value() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let input = Locator::test_id("search");
        browser.set(&input, FakeElement::field("Ac"));
        let base = BasePage::new(&browser, &app, fast());

        base.type_into(&input, "me").await.unwrap();
        assert_eq!(browser.input_value(&input).await.unwrap(), "Acme");
    }

    #[tokio::test]
    async fn test_select_confirms_value() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let select = Locator::test_id("select-customer");
        browser.set(&select, FakeElement::field(""));
        let base = BasePage::new(&browser, &app, fast());

        base.select(&select, "cus_1").await.unwrap();
        assert_eq!(browser.input_value(&select).await.unwrap(), "cus_1");
        assert!(base.select(&Locator::test_id("missing"), "cus_1").await.is_err());
    }
}
