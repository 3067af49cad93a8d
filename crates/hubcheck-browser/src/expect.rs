//! Retrying assertions over [`BrowserActions`].
//!
//! Each expectation polls until it holds and turns a timeout into
//! [`BrowserError::Assertion`] naming the locator and the last observation.

use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::wait::{poll_until, WaitOptions};
use std::sync::Mutex;

fn into_assertion(
    err: BrowserError,
    expectation: String,
    observed: &Mutex<Option<String>>,
) -> BrowserError {
    match err {
        BrowserError::Timeout(detail) => {
            let last = observed
                .lock()
                .ok()
                .and_then(|o| o.clone())
                .map(|o| format!("; last observed {o}"))
                .unwrap_or_default();
            BrowserError::Assertion(format!("{expectation}{last} ({detail})"))
        }
        other => other,
    }
}

fn observe(slot: &Mutex<Option<String>>, value: String) {
    if let Ok(mut guard) = slot.lock() {
        *guard = Some(value);
    }
}

/// Expect the element to become visible.
pub async fn expect_visible(
    browser: &dyn BrowserActions,
    locator: &Locator,
    wait: &WaitOptions,
) -> Result<()> {
    let description = format!("{locator} visible");
    poll_until(wait, &description, move || async move {
        Ok(browser.is_visible(locator).await?.then_some(()))
    })
    .await
    .map_err(|e| match e {
        BrowserError::Timeout(detail) => {
            BrowserError::Assertion(format!("expected {locator} to be visible ({detail})"))
        }
        other => other,
    })
}

/// Expect the element to be absent or hidden.
pub async fn expect_hidden(
    browser: &dyn BrowserActions,
    locator: &Locator,
    wait: &WaitOptions,
) -> Result<()> {
    let description = format!("{locator} hidden");
    poll_until(wait, &description, move || async move {
        Ok((!browser.is_visible(locator).await?).then_some(()))
    })
    .await
    .map_err(|e| match e {
        BrowserError::Timeout(detail) => {
            BrowserError::Assertion(format!("expected {locator} to be hidden ({detail})"))
        }
        other => other,
    })
}

/// Expect the current URL to contain `fragment`. Returns the URL.
pub async fn expect_url_contains(
    browser: &dyn BrowserActions,
    fragment: &str,
    wait: &WaitOptions,
) -> Result<String> {
    let observed = Mutex::new(None);
    let slot = &observed;
    let description = format!("url contains {fragment:?}");
    poll_until(wait, &description, move || async move {
        let url = browser.current_url().await?;
        if url.contains(fragment) {
            Ok(Some(url))
        } else {
            observe(slot, format!("{url:?}"));
            Ok(None)
        }
    })
    .await
    .map_err(|e| into_assertion(e, format!("expected url to contain {fragment:?}"), &observed))
}

/// Expect the element's text to contain `text`. Returns the full text.
pub async fn expect_text_contains(
    browser: &dyn BrowserActions,
    locator: &Locator,
    text: &str,
    wait: &WaitOptions,
) -> Result<String> {
    let observed = Mutex::new(None);
    let slot = &observed;
    let description = format!("{locator} text contains {text:?}");
    poll_until(wait, &description, move || async move {
        let actual = browser.text_content(locator).await?;
        if actual.contains(text) {
            Ok(Some(actual))
        } else {
            observe(slot, format!("{actual:?}"));
            Ok(None)
        }
    })
    .await
    .map_err(|e| {
        into_assertion(
            e,
            format!("expected {locator} to contain text {text:?}"),
            &observed,
        )
    })
}

/// Expect the element's text to differ from `unexpected`. Returns the text.
pub async fn expect_text_not(
    browser: &dyn BrowserActions,
    locator: &Locator,
    unexpected: &str,
    wait: &WaitOptions,
) -> Result<String> {
    let description = format!("{locator} text is not {unexpected:?}");
    poll_until(wait, &description, move || async move {
        let actual = browser.text_content(locator).await?;
        Ok((actual != unexpected).then_some(actual))
    })
    .await
    .map_err(|e| match e {
        BrowserError::Timeout(detail) => BrowserError::Assertion(format!(
            "expected {locator} text to change from {unexpected:?} ({detail})"
        )),
        other => other,
    })
}

/// Expect a form field to hold exactly `expected`.
pub async fn expect_value(
    browser: &dyn BrowserActions,
    locator: &Locator,
    expected: &str,
    wait: &WaitOptions,
) -> Result<()> {
    let observed = Mutex::new(None);
    let slot = &observed;
    let description = format!("{locator} value {expected:?}");
    poll_until(wait, &description, move || async move {
        let actual = browser.input_value(locator).await?;
        if actual == expected {
            Ok(Some(()))
        } else {
            observe(slot, format!("{actual:?}"));
            Ok(None)
        }
    })
    .await
    .map_err(|e| {
        into_assertion(
            e,
            format!("expected {locator} to have value {expected:?}"),
            &observed,
        )
    })
}

/// Expect a checkbox to be checked.
pub async fn expect_checked(
    browser: &dyn BrowserActions,
    locator: &Locator,
    wait: &WaitOptions,
) -> Result<()> {
    let description = format!("{locator} checked");
    poll_until(wait, &description, move || async move {
        Ok(browser.is_checked(locator).await?.then_some(()))
    })
    .await
    .map_err(|e| match e {
        BrowserError::Timeout(detail) => {
            BrowserError::Assertion(format!("expected {locator} to be checked ({detail})"))
        }
        other => other,
    })
}

/// Expect at least `min` matches. Returns the count.
pub async fn expect_count_at_least(
    browser: &dyn BrowserActions,
    locator: &Locator,
    min: usize,
    wait: &WaitOptions,
) -> Result<usize> {
    let observed = Mutex::new(None);
    let slot = &observed;
    let description = format!("{locator} count >= {min}");
    poll_until(wait, &description, move || async move {
        let count = browser.count(locator).await?;
        if count >= min {
            Ok(Some(count))
        } else {
            observe(slot, count.to_string());
            Ok(None)
        }
    })
    .await
    .map_err(|e| {
        into_assertion(
            e,
            format!("expected at least {min} matches for {locator}"),
            &observed,
        )
    })
}
