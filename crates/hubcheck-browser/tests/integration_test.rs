use hubcheck_browser::expect::{expect_text_contains, expect_url_contains, expect_visible};
use hubcheck_browser::{BrowserActions, BrowserEngine, Locator, WaitOptions};
use hubcheck_core::{BrowserConfig, TimeoutConfig};

const FORM: &str = "data:text/html,<label for='email'>Email</label><input id='email' data-cy='email'>\
<button onclick=\"document.getElementById('out').textContent='saved '+document.getElementById('email').value\">Save</button>\
<p id='out'></p>";

async fn engine() -> BrowserEngine {
    BrowserEngine::launch(&BrowserConfig::default(), &TimeoutConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_engine_launch() {
    let engine = BrowserEngine::launch(&BrowserConfig::default(), &TimeoutConfig::default()).await;
    assert!(engine.is_ok(), "Failed to launch browser engine");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation() {
    let engine = engine().await;
    engine.navigate("https://example.com").await.unwrap();
    expect_url_contains(&engine, "example.com", &WaitOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_fill_click_and_read_back() {
    let engine = engine().await;
    let wait = WaitOptions::new().with_timeout(5_000);
    engine.navigate(FORM).await.unwrap();

    let email = Locator::label("Email").or_css("#email");
    expect_visible(&engine, &email, &wait).await.unwrap();
    engine.fill(&email, "max@example.com").await.unwrap();
    assert_eq!(engine.input_value(&email).await.unwrap(), "max@example.com");

    engine.click(&Locator::role("button", "Save")).await.unwrap();
    expect_text_contains(&engine, &Locator::css("#out"), "saved max@example.com", &wait)
        .await
        .unwrap();
    assert_eq!(engine.count(&Locator::test_id("email")).await.unwrap(), 1);
    assert!(engine.take_page_errors().await.is_empty());
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_missing_element_times_out() {
    let engine = engine().await;
    engine.navigate(FORM).await.unwrap();
    let wait = WaitOptions::new().with_timeout(300);
    let err = expect_visible(&engine, &Locator::test_id("does-not-exist"), &wait)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("testid=does-not-exist"));
}
