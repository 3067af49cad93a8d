use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::state::{origin_of, StorageState, StoredCookie};
use crate::wait::{poll_until, WaitOptions};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCookiesParams, CookieParam, TimeSinceEpoch,
};
use chromiumoxide::cdp::js_protocol::runtime::EventExceptionThrown;
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use hubcheck_core::{BrowserConfig, TimeoutConfig};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Attribute used to hand a resolved element over to CDP.
const TARGET_ATTRIBUTE: &str = "data-hubcheck-target";

/// JS expression deciding whether `el` (with computed `style`) is visible.
/// Shared by the probe and by action targeting so both agree.
const VISIBLE_EXPR: &str = "!!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) \
    && style.visibility !== 'hidden' && style.display !== 'none'";

/// What the page reports about a locator's selected element.
#[derive(Debug, Default, Deserialize)]
struct ElementProbe {
    found: bool,
    #[serde(default)]
    visible: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    checked: bool,
}

/// Chromium-backed implementation of [`BrowserActions`].
///
/// Owns one browser process and one page. Element actions wait for the
/// locator to resolve to a visible element within the command timeout.
pub struct BrowserEngine {
    browser: tokio::sync::Mutex<Browser>,
    page: Page,
    wait: WaitOptions,
    page_load_timeout: Duration,
    page_errors: Arc<Mutex<Vec<String>>>,
    next_target: AtomicU64,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for BrowserEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserEngine")
            .field("wait", &self.wait)
            .field("page_load_timeout", &self.page_load_timeout)
            .finish_non_exhaustive()
    }
}

impl BrowserEngine {
    /// Launch Chromium and open a blank page.
    pub async fn launch(config: &BrowserConfig, timeouts: &TimeoutConfig) -> Result<Self> {
        let mut builder = CdpConfig::builder()
            .no_sandbox()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(Duration::from_millis(timeouts.request_ms));
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        }));

        let page = browser.new_page("about:blank").await?;

        let page_errors = Arc::new(Mutex::new(Vec::new()));
        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let sink = Arc::clone(&page_errors);
        tasks.push(tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let details = &event.exception_details;
                let message = details
                    .exception
                    .as_ref()
                    .and_then(|e| e.description.clone())
                    .unwrap_or_else(|| details.text.clone());
                tracing::debug!("Page error: {}", message);
                if let Ok(mut errors) = sink.lock() {
                    errors.push(message);
                }
            }
        }));

        tracing::info!(
            "Browser launched ({}x{}, headless: {})",
            config.viewport_width,
            config.viewport_height,
            config.headless
        );

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            wait: WaitOptions::from_config(timeouts),
            page_load_timeout: Duration::from_millis(timeouts.page_load_ms),
            page_errors,
            next_target: AtomicU64::new(0),
            tasks,
        })
    }

    /// Close the browser process.
    pub async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        for task in &self.tasks {
            task.abort();
        }
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let result = self
            .page
            .evaluate_expression(expression)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn probe(&self, locator: &Locator) -> Result<ElementProbe> {
        self.eval(&probe_script(locator)).await
    }

    /// Probe until the element exists, without requiring visibility.
    async fn attached(&self, locator: &Locator) -> Result<ElementProbe> {
        let description = format!("{locator} attached");
        poll_until(&self.wait, &description, move || async move {
            let probe = self.probe(locator).await?;
            if probe.found {
                Ok(Some(probe))
            } else {
                Err(BrowserError::SelectorNotFound(locator.to_string()))
            }
        })
        .await
    }

    /// Wait for a visible element, tag it and fetch it through CDP.
    async fn target(&self, locator: &Locator) -> Result<(Element, String)> {
        let description = format!("{locator} visible");
        let token = self.next_target.fetch_add(1, Ordering::Relaxed).to_string();
        let token = &token;
        let script = target_script(locator, token);
        let script = &script;
        poll_until(&self.wait, &description, move || async move {
            let tagged: bool = self.eval(script).await?;
            if !tagged {
                return Err(BrowserError::SelectorNotFound(locator.to_string()));
            }
            let selector = target_selector(token);
            let element = self.page.find_element(selector.as_str()).await?;
            Ok(Some((element, selector)))
        })
        .await
    }

    async fn clear_target(&self, selector: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el) return false; \
             const proto = Object.getPrototypeOf(el); \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value')?.set; \
             if (setter) setter.call(el, ''); else el.value = ''; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            sel = serde_json::Value::String(selector.to_string()),
        );
        let _: bool = self.eval(&script).await?;
        Ok(())
    }

    async fn focus_end(&self, selector: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el) return false; el.focus(); \
             try {{ const n = (el.value || '').length; el.setSelectionRange(n, n); }} catch (e) {{}} \
             return true; }})()",
            sel = serde_json::Value::String(selector.to_string()),
        );
        let _: bool = self.eval(&script).await?;
        Ok(())
    }
}

fn target_selector(token: &str) -> String {
    format!("[{TARGET_ATTRIBUTE}=\"{token}\"]")
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        tokio::time::timeout(self.page_load_timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!(
                    "navigation to {url} after {}ms",
                    self.page_load_timeout.as_millis()
                ))
            })?
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let (element, _) = self.target(locator).await?;
        element.click().await?;
        tracing::debug!("Clicked {}", locator);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let (element, selector) = self.target(locator).await?;
        self.clear_target(&selector).await?;
        self.focus_end(&selector).await?;
        if !value.is_empty() {
            element.type_str(value).await?;
        }
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let (element, selector) = self.target(locator).await?;
        self.focus_end(&selector).await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        let (_, selector) = self.target(locator).await?;
        self.clear_target(&selector).await
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        let (element, _) = self.target(locator).await?;
        if !self.probe(locator).await?.checked {
            element.click().await?;
        }
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, option: &str) -> Result<()> {
        let (_, selector) = self.target(locator).await?;
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el || !el.options) return false; \
             const opt = Array.from(el.options).find(o => o.value === {option} || o.text.trim() === {option}); \
             if (!opt) return false; el.value = opt.value; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            sel = serde_json::Value::String(selector),
            option = serde_json::Value::String(option.to_string()),
        );
        let selected: bool = self.eval(&script).await?;
        if selected {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(format!(
                "{locator} has no option {option:?}"
            )))
        }
    }

    async fn input_value(&self, locator: &Locator) -> Result<String> {
        Ok(self.attached(locator).await?.value)
    }

    async fn text_content(&self, locator: &Locator) -> Result<String> {
        Ok(self.attached(locator).await?.text)
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        let script = format!(
            "({}).map(el => (el.innerText ?? el.textContent ?? '').trim())",
            locator.to_query_all()
        );
        self.eval(&script).await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let probe = self.probe(locator).await?;
        Ok(probe.found && probe.visible)
    }

    async fn is_checked(&self, locator: &Locator) -> Result<bool> {
        Ok(self.attached(locator).await?.checked)
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        self.eval(&locator.to_count_query()).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let bytes = self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await?;
        Ok(bytes)
    }

    async fn capture_state(&self) -> Result<StorageState> {
        let url = self.current_url().await?;
        let origin = origin_of(&url)?;
        let cookies = self
            .page
            .get_cookies()
            .await?
            .into_iter()
            .map(|c| StoredCookie {
                expires: (!c.session).then_some(c.expires),
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect();
        let local_storage: BTreeMap<String, String> = self
            .eval("Object.fromEntries(Object.entries(window.localStorage))")
            .await?;
        tracing::debug!("Captured storage state for {}", origin);
        Ok(StorageState {
            origin,
            cookies,
            local_storage,
        })
    }

    async fn restore_state(&self, state: &StorageState) -> Result<()> {
        let mut params = Vec::with_capacity(state.cookies.len());
        for cookie in &state.cookies {
            let mut builder = CookieParam::builder()
                .name(cookie.name.clone())
                .value(cookie.value.clone())
                .domain(cookie.domain.clone())
                .path(cookie.path.clone())
                .secure(cookie.secure)
                .http_only(cookie.http_only);
            if let Some(expires) = cookie.expires {
                builder = builder.expires(TimeSinceEpoch::new(expires));
            }
            params.push(builder.build().map_err(BrowserError::Script)?);
        }
        if !params.is_empty() {
            self.page.set_cookies(params).await?;
        }

        if !state.local_storage.is_empty() {
            let on_origin = self
                .current_url()
                .await
                .ok()
                .and_then(|url| origin_of(&url).ok())
                .is_some_and(|origin| origin == state.origin);
            if !on_origin {
                self.navigate(&state.origin).await?;
            }
            let entries = serde_json::to_string(&state.local_storage)
                .map_err(|e| BrowserError::Script(e.to_string()))?;
            let script = format!(
                "(() => {{ const entries = {entries}; \
                 for (const [k, v] of Object.entries(entries)) window.localStorage.setItem(k, v); \
                 return true; }})()"
            );
            let _: bool = self.eval(&script).await?;
        }
        tracing::debug!("Restored storage state for {}", state.origin);
        Ok(())
    }

    async fn clear_state(&self) -> Result<()> {
        self.page.execute(ClearBrowserCookiesParams::default()).await?;
        let _: bool = self
            .eval(
                "(() => { try { window.localStorage.clear(); window.sessionStorage.clear(); } \
                 catch (e) {} return true; })()",
            )
            .await?;
        Ok(())
    }

    async fn take_page_errors(&self) -> Vec<String> {
        self.page_errors
            .lock()
            .map(|mut errors| std::mem::take(&mut *errors))
            .unwrap_or_default()
    }
}

/// Script reporting found/visible/text/value/checked for `locator`.
fn probe_script(locator: &Locator) -> String {
    format!(
        "(() => {{ const el = {query}; if (!el) return {{ found: false }}; \
         const style = window.getComputedStyle(el); \
         const visible = {VISIBLE_EXPR}; \
         return {{ found: true, visible, text: (el.innerText ?? el.textContent ?? '').trim(), \
           value: el.value == null ? '' : String(el.value), checked: !!el.checked }}; }})()",
        query = locator.to_query()
    )
}

/// Script tagging `locator`'s element with `token` when it is visible.
fn target_script(locator: &Locator, token: &str) -> String {
    format!(
        "(() => {{ const el = {query}; if (!el) return false; \
         const style = window.getComputedStyle(el); \
         if (!({VISIBLE_EXPR})) return false; \
         document.querySelectorAll('[{TARGET_ATTRIBUTE}]').forEach(e => e.removeAttribute('{TARGET_ATTRIBUTE}')); \
         el.setAttribute('{TARGET_ATTRIBUTE}', {token}); return true; }})()",
        query = locator.to_query(),
        token = serde_json::Value::String(token.to_string()),
    )
}
