//! In-memory [`BrowserActions`] for tests.
//!
//! [`ScriptedBrowser`] keeps a table of fake elements keyed by the canonical
//! form of a [`Locator`] (its `Display` output) and records every action.
//! Reactions let a click or a navigation change the page, which is enough to
//! drive page objects and commands without Chromium.

use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::state::{origin_of, StorageState, StoredCookie};
use std::collections::HashMap;
use std::sync::Mutex;

/// A fake element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeElement {
    /// Whether the element is visible
    pub visible: bool,
    /// Text content
    pub text: String,
    /// Form value
    pub value: String,
    /// Checkbox state
    pub checked: bool,
    /// Number of matches reported by `count`
    pub count: usize,
    /// Texts reported by `all_text_contents`
    pub texts: Vec<String>,
}

impl FakeElement {
    /// A visible element with the given text.
    #[must_use]
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            visible: true,
            text: text.into(),
            count: 1,
            ..Self::default()
        }
    }

    /// An element that exists but is hidden.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            count: 1,
            ..Self::default()
        }
    }

    /// A visible form field holding `value`.
    #[must_use]
    pub fn field(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::visible("")
        }
    }

    /// A visible list of `texts`, one match per entry.
    #[must_use]
    pub fn list<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        Self {
            visible: !texts.is_empty(),
            text: texts.first().cloned().unwrap_or_default(),
            count: texts.len(),
            texts,
            ..Self::default()
        }
    }
}

/// Page change triggered by a click or a navigation.
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Change the current URL
    SetUrl(String),
    /// Add or replace an element
    Show(Locator, FakeElement),
    /// Remove an element
    Hide(Locator),
    /// Replace an element's text
    SetText(Locator, String),
    /// Set a cookie on the current origin
    SetCookie(String, String),
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `navigate(url)`
    Navigate(String),
    /// `click(locator)`
    Click(String),
    /// `fill(locator, value)`
    Fill(String, String),
    /// `type_text(locator, text)`
    Type(String, String),
    /// `clear(locator)`
    Clear(String),
    /// `check(locator)`
    Check(String),
    /// `select_option(locator, option)`
    Select(String, String),
    /// `restore_state`
    RestoreState,
    /// `clear_state`
    ClearState,
}

#[derive(Debug, Default)]
struct Inner {
    url: String,
    elements: HashMap<String, FakeElement>,
    on_click: HashMap<String, Vec<Reaction>>,
    on_navigate: Vec<(String, Vec<Reaction>)>,
    cookies: Vec<StoredCookie>,
    local_storage: std::collections::BTreeMap<String, String>,
    page_errors: Vec<String>,
    actions: Vec<Action>,
}

impl Inner {
    fn apply(&mut self, reactions: &[Reaction]) {
        for reaction in reactions {
            match reaction {
                Reaction::SetUrl(url) => self.url.clone_from(url),
                Reaction::Show(locator, element) => {
                    self.elements.insert(locator.to_string(), element.clone());
                }
                Reaction::Hide(locator) => {
                    self.elements.remove(&locator.to_string());
                }
                Reaction::SetText(locator, text) => {
                    if let Some(element) = self.elements.get_mut(&locator.to_string()) {
                        element.text.clone_from(text);
                    }
                }
                Reaction::SetCookie(name, value) => {
                    let domain = url::Url::parse(&self.url)
                        .ok()
                        .and_then(|u| u.host_str().map(ToString::to_string))
                        .unwrap_or_default();
                    self.cookies.retain(|c| &c.name != name);
                    self.cookies.push(StoredCookie {
                        name: name.clone(),
                        value: value.clone(),
                        domain,
                        path: "/".to_string(),
                        secure: false,
                        http_only: true,
                        expires: None,
                    });
                }
            }
        }
    }

    fn visible_mut(&mut self, locator: &Locator) -> Result<&mut FakeElement> {
        match self.elements.get_mut(&locator.to_string()) {
            Some(element) if element.visible => Ok(element),
            _ => Err(BrowserError::SelectorNotFound(locator.to_string())),
        }
    }

    fn attached(&self, locator: &Locator) -> Result<&FakeElement> {
        self.elements
            .get(&locator.to_string())
            .ok_or_else(|| BrowserError::SelectorNotFound(locator.to_string()))
    }
}

/// Scripted, in-memory browser.
#[derive(Debug, Default)]
pub struct ScriptedBrowser {
    inner: Mutex<Inner>,
}

impl ScriptedBrowser {
    /// Empty page at `about:blank`.
    #[must_use]
    pub fn new() -> Self {
        let browser = Self::default();
        browser.lock().url = "about:blank".to_string();
        browser
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add or replace an element.
    pub fn set(&self, locator: &Locator, element: FakeElement) -> &Self {
        self.lock().elements.insert(locator.to_string(), element);
        self
    }

    /// Remove an element.
    pub fn remove(&self, locator: &Locator) -> &Self {
        self.lock().elements.remove(&locator.to_string());
        self
    }

    /// Run `reactions` whenever `locator` is clicked.
    pub fn on_click(&self, locator: &Locator, reactions: Vec<Reaction>) -> &Self {
        self.lock()
            .on_click
            .entry(locator.to_string())
            .or_default()
            .extend(reactions);
        self
    }

    /// Run `reactions` after navigating to a URL containing `fragment`.
    pub fn on_navigate(&self, fragment: impl Into<String>, reactions: Vec<Reaction>) -> &Self {
        self.lock().on_navigate.push((fragment.into(), reactions));
        self
    }

    /// Record an uncaught page exception.
    pub fn push_page_error(&self, message: impl Into<String>) {
        self.lock().page_errors.push(message.into());
    }

    /// Current element state.
    #[must_use]
    pub fn element(&self, locator: &Locator) -> Option<FakeElement> {
        self.lock().elements.get(&locator.to_string()).cloned()
    }

    /// Every action performed so far.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    /// Number of navigations to URLs containing `fragment`.
    #[must_use]
    pub fn navigations_to(&self, fragment: &str) -> usize {
        self.lock()
            .actions
            .iter()
            .filter(|a| matches!(a, Action::Navigate(url) if url.contains(fragment)))
            .count()
    }

    /// Value last filled into `locator`, if any.
    #[must_use]
    pub fn filled(&self, locator: &Locator) -> Option<String> {
        let key = locator.to_string();
        self.lock().actions.iter().rev().find_map(|a| match a {
            Action::Fill(k, v) if *k == key => Some(v.clone()),
            _ => None,
        })
    }

    /// Whether `locator` was clicked.
    #[must_use]
    pub fn clicked(&self, locator: &Locator) -> bool {
        let key = locator.to_string();
        self.lock()
            .actions
            .iter()
            .any(|a| matches!(a, Action::Click(k) if *k == key))
    }
}

#[async_trait::async_trait]
impl BrowserActions for ScriptedBrowser {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.actions.push(Action::Navigate(url.to_string()));
        inner.url = url.to_string();
        let reactions: Vec<Reaction> = inner
            .on_navigate
            .iter()
            .filter(|(fragment, _)| url.contains(fragment.as_str()))
            .flat_map(|(_, r)| r.clone())
            .collect();
        inner.apply(&reactions);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.lock().url.clone())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?;
        let key = locator.to_string();
        inner.actions.push(Action::Click(key.clone()));
        let reactions = inner.on_click.get(&key).cloned().unwrap_or_default();
        inner.apply(&reactions);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?.value = value.to_string();
        inner
            .actions
            .push(Action::Fill(locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?.value.push_str(text);
        inner
            .actions
            .push(Action::Type(locator.to_string(), text.to_string()));
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?.value.clear();
        inner.actions.push(Action::Clear(locator.to_string()));
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?.checked = true;
        inner.actions.push(Action::Check(locator.to_string()));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.visible_mut(locator)?.value = option.to_string();
        inner
            .actions
            .push(Action::Select(locator.to_string(), option.to_string()));
        Ok(())
    }

    async fn input_value(&self, locator: &Locator) -> Result<String> {
        Ok(self.lock().attached(locator)?.value.clone())
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        Ok(self.lock().attached(locator)?.text.trim().to_string())
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        let inner = self.lock();
        Ok(match inner.elements.get(&locator.to_string()) {
            Some(element) if !element.texts.is_empty() => element.texts.clone(),
            Some(element) => vec![element.text.trim().to_string()],
            None => Vec::new(),
        })
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self
            .lock()
            .elements
            .get(&locator.to_string())
            .is_some_and(|e| e.visible))
    }

    async fn is_checked(&self, locator: &Locator) -> Result<bool> {
        Ok(self.lock().attached(locator)?.checked)
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(self
            .lock()
            .elements
            .get(&locator.to_string())
            .map_or(0, |e| e.count))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        // PNG signature only
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn capture_state(&self) -> Result<StorageState> {
        let inner = self.lock();
        Ok(StorageState {
            origin: origin_of(&inner.url)?,
            cookies: inner.cookies.clone(),
            local_storage: inner.local_storage.clone(),
        })
    }

    async fn restore_state(&self, state: &StorageState) -> Result<()> {
        let mut inner = self.lock();
        inner.cookies.clone_from(&state.cookies);
        inner.local_storage.clone_from(&state.local_storage);
        inner.actions.push(Action::RestoreState);
        Ok(())
    }

    async fn clear_state(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.cookies.clear();
        inner.local_storage.clear();
        inner.actions.push(Action::ClearState);
        Ok(())
    }

    async fn take_page_errors(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().page_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expect::{expect_text_contains, expect_url_contains, expect_visible};
    use crate::wait::WaitOptions;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(100).with_poll_interval(10)
    }

    #[tokio::test]
    async fn test_click_reactions_change_page() {
        let browser = ScriptedBrowser::new();
        let submit = Locator::role("button", "Log in");
        let heading = Locator::css("h1");
        browser.set(&submit, FakeElement::visible("Log in")).on_click(
            &submit,
            vec![
                Reaction::SetUrl("http://localhost:3000/en/dashboard".to_string()),
                Reaction::Show(heading.clone(), FakeElement::visible("Dashboard")),
                Reaction::SetCookie("session".to_string(), "s1".to_string()),
            ],
        );

        browser.click(&submit).await.unwrap();
        expect_url_contains(&browser, "/dashboard", &fast()).await.unwrap();
        expect_text_contains(&browser, &heading, "Dash", &fast())
            .await
            .unwrap();

        let state = browser.capture_state().await.unwrap();
        assert_eq!(state.origin, "http://localhost:3000");
        assert_eq!(state.cookie("session").map(|c| c.domain.as_str()), Some("localhost"));
    }

    #[tokio::test]
    async fn test_missing_element_is_selector_not_found() {
        let browser = ScriptedBrowser::new();
        let err = browser.click(&Locator::test_id("nope")).await.unwrap_err();
        assert!(matches!(err, BrowserError::SelectorNotFound(_)));

        let hidden = Locator::test_id("hidden");
        browser.set(&hidden, FakeElement::hidden());
        assert!(browser.fill(&hidden, "x").await.is_err());
        let err = expect_visible(&browser, &hidden, &fast()).await.unwrap_err();
        assert!(matches!(err, BrowserError::Assertion(_)));
    }

    #[tokio::test]
    async fn test_fill_and_type_record_values() {
        let browser = ScriptedBrowser::new();
        let email = Locator::css("#username");
        browser.set(&email, FakeElement::field("old"));
        browser.fill(&email, "max@example.com").await.unwrap();
        browser.type_text(&email, "!").await.unwrap();
        assert_eq!(browser.input_value(&email).await.unwrap(), "max@example.com!");
        assert_eq!(browser.filled(&email).as_deref(), Some("max@example.com"));
    }

    #[tokio::test]
    async fn test_navigation_reactions_and_count() {
        let browser = ScriptedBrowser::new();
        let rows = Locator::css("tbody tr");
        browser.on_navigate(
            "/cms/orders",
            vec![Reaction::Show(rows.clone(), FakeElement::list(["#1001", "#1002"]))],
        );
        browser
            .navigate("http://localhost:3000/en/cms/orders")
            .await
            .unwrap();
        assert_eq!(browser.count(&rows).await.unwrap(), 2);
        assert_eq!(browser.navigations_to("/cms/orders"), 1);
        assert_eq!(
            browser.all_text_contents(&rows).await.unwrap(),
            vec!["#1001".to_string(), "#1002".to_string()]
        );
    }

    #[tokio::test]
    async fn test_page_errors_are_drained() {
        let browser = ScriptedBrowser::new();
        browser.push_page_error("TypeError: x is undefined");
        assert_eq!(browser.take_page_errors().await.len(), 1);
        assert!(browser.take_page_errors().await.is_empty());
    }
}
