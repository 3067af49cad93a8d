use crate::error::Result;
use crate::locator::Locator;
use crate::state::StorageState;

/// Browser actions for automation.
///
/// Element actions auto-wait: implementations poll until the locator
/// resolves to a visible element or the command timeout elapses.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// Click an element
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Replace the value of a form field
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Type text at the end of the field's current value
    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Clear a form field
    async fn clear(&self, locator: &Locator) -> Result<()>;

    /// Tick a checkbox; no-op when already checked
    async fn check(&self, locator: &Locator) -> Result<()>;

    /// Choose the option of a `<select>` whose value or label equals `option`
    async fn select_option(&self, locator: &Locator, option: &str) -> Result<()>;

    /// Current value of a form field
    async fn input_value(&self, locator: &Locator) -> Result<String>;

    /// Trimmed text content of an element
    async fn text_content(&self, locator: &Locator) -> Result<String>;

    /// Trimmed text content of every match
    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Whether the locator resolves to a visible element right now
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Whether the checkbox is checked
    async fn is_checked(&self, locator: &Locator) -> Result<bool>;

    /// Number of matches right now
    async fn count(&self, locator: &Locator) -> Result<usize>;

    /// Take a PNG screenshot of the page
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Capture cookies and localStorage of the current origin
    async fn capture_state(&self) -> Result<StorageState>;

    /// Restore a captured storage state
    async fn restore_state(&self, state: &StorageState) -> Result<()>;

    /// Drop all cookies and storage
    async fn clear_state(&self) -> Result<()>;

    /// Uncaught page exceptions seen since the last call
    async fn take_page_errors(&self) -> Vec<String>;
}
