//! Order list page: search, filters, tabs, pagination and bulk actions.

use crate::base::{BasePage, PageModel};
use hubcheck_browser::{poll_until, BrowserError, Locator, Result, Strategy};
use regex::Regex;
use std::sync::OnceLock;

/// Message shown by bulk-action modals once the request was accepted.
pub const SUCCESSFULLY_REQUESTED: &str = "Successfully requested!";

/// Parsed "`from`-`to` of `total`" pagination label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// First row shown, 1-based
    pub from: u64,
    /// Last row shown
    pub to: u64,
    /// Orders matching the current filters
    pub total: u64,
}

impl Pagination {
    /// Parse labels like `1-10 of 245` or `11 - 20 of 245`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        static RANGE: OnceLock<Regex> = OnceLock::new();
        let regex = RANGE
            .get_or_init(|| Regex::new(r"(\d+)\s*-\s*(\d+)\s+of\s+(\d+)").expect("valid regex"));
        let caps = regex.captures(text)?;
        Some(Self {
            from: caps[1].parse().ok()?,
            to: caps[2].parse().ok()?,
            total: caps[3].parse().ok()?,
        })
    }

    /// Total from any label containing `of N`.
    #[must_use]
    pub fn parse_total(text: &str) -> Option<u64> {
        static TOTAL: OnceLock<Regex> = OnceLock::new();
        let regex = TOTAL.get_or_init(|| Regex::new(r"of\s+(\d+)").expect("valid regex"));
        regex.captures(text)?[1].parse().ok()
    }
}

/// Order list at `cms/orders`.
#[derive(Debug, Clone, Copy)]
pub struct OrderListPage<'a> {
    base: BasePage<'a>,
}

impl<'a> OrderListPage<'a> {
    /// Wrap a base page.
    #[must_use]
    pub fn new(base: BasePage<'a>) -> Self {
        Self { base }
    }

    // Locators

    /// Order search field above the table.
    pub fn search_input() -> Locator {
        Locator::css(".flex.flex-col.space-y-1.w-64")
            .locate(Locator::css("input[type=\"text\"]"))
            .first()
    }

    /// Body rows of the order table.
    pub fn rows() -> Locator {
        Locator::css("tbody tr")
    }

    /// First row mentioning `text`.
    pub fn row_with(text: &str) -> Locator {
        Self::rows().has_text(text).first()
    }

    /// Dropdown button of the filter labelled `label`.
    pub fn filter_button(label: &str) -> Locator {
        Locator::text_in("button[aria-haspopup=\"listbox\"]", label).first()
    }

    /// Open filter dropdown.
    pub fn listbox() -> Locator {
        Locator::css("div[role=\"listbox\"][aria-labelledby]")
    }

    /// Option of an open filter listbox. The label is matched as given and
    /// capitalized, since the URL value (`open`) and the rendered label
    /// (`Open`) may differ in case.
    pub fn filter_option(label: &str) -> Locator {
        const OPTION: &str = "div[role=\"listbox\"] div[role=\"option\"] span.block";
        Locator::text_in(OPTION, label)
            .or(Strategy::Text {
                text: capitalize(label),
                selector: Some(OPTION.to_string()),
            })
            .first()
    }

    /// Button that resets every filter.
    pub fn clear_filters_button() -> Locator {
        Locator::text_in("button", "Clear").first()
    }

    /// General orders tab.
    pub fn general_tab() -> Locator {
        Locator::text_in(".v-tabs button", "General").first()
    }

    /// General orders tab while it is the selected tab.
    pub fn active_general_tab() -> Locator {
        Locator::text_in(".v-tabs button[aria-selected=\"true\"]", "General").first()
    }

    /// Draft orders tab.
    pub fn draft_tab() -> Locator {
        Locator::text_in("a", "Draft").first()
    }

    /// Consumable orders tab.
    pub fn consumable_tab() -> Locator {
        Locator::text_in("a", "Consumable").first()
    }

    /// "`from`-`to` of `total`" label under the table.
    pub fn pagination_text() -> Locator {
        Locator::test_id("from-to-of-total")
    }

    /// Jump to the first page.
    pub fn first_page_button() -> Locator {
        Locator::test_id("btn-go-to-first")
    }

    /// Go back one page.
    pub fn previous_page_button() -> Locator {
        Locator::test_id("btn-prev-page")
    }

    /// Go forward one page.
    pub fn next_page_button() -> Locator {
        Locator::test_id("btn-next-page")
    }

    /// Jump to the last page.
    pub fn last_page_button() -> Locator {
        Locator::test_id("btn-go-to-last")
    }

    /// Select-all checkbox in the table header.
    pub fn header_checkbox() -> Locator {
        Locator::css("thead input[type=\"checkbox\"]")
    }

    /// Checkbox of the row at `index`, 0-based.
    pub fn row_checkbox(index: usize) -> Locator {
        Locator::css("tbody input[type=\"checkbox\"]").nth(index)
    }

    /// Bulk export action.
    pub fn export_button() -> Locator {
        Locator::text_in("span", "Export").first()
    }

    /// Bulk "Mark fulfilled" action.
    pub fn mark_fulfilled_button() -> Locator {
        Locator::text_in("button", "Mark fulfilled").first()
    }

    /// Submit button of a bulk-action modal.
    pub fn modal_submit_button() -> Locator {
        Locator::test_id("btn-submit")
    }

    /// Close button of a bulk-action modal.
    pub fn modal_close_button() -> Locator {
        Locator::test_id("btn-close")
    }

    /// Confirmation shown once a bulk action was accepted.
    pub fn success_message() -> Locator {
        Locator::text_in("p", SUCCESSFULLY_REQUESTED).first()
    }

    // Navigation

    /// Open the order list and wait for the table.
    pub async fn navigate(&self) -> Result<()> {
        self.open().await?;
        tracing::info!("Verified: navigated to order list");
        Ok(())
    }

    // Search

    /// Type an order id into the search field.
    pub async fn search_by_order_id(&self, order_id: &str) -> Result<()> {
        let input = Self::search_input();
        self.base.click(&input).await?;
        self.base.fill(&input, order_id).await?;
        tracing::info!("Verified: searched for order {}", order_id);
        Ok(())
    }

    /// Expect the table to show `order_id`.
    pub async fn verify_order_in_table(&self, order_id: &str) -> Result<()> {
        let cell = Locator::css("tbody").locate(Locator::text(order_id)).first();
        self.base.expect_visible(&cell).await?;
        tracing::info!("Verified: order {} is visible in table", order_id);
        Ok(())
    }

    /// Click the row of `order_id`.
    pub async fn open_order(&self, order_id: &str) -> Result<()> {
        let cell = Self::rows().locate(Locator::text(order_id)).first();
        self.base.click(&cell).await?;
        tracing::info!("Verified: opened order {} from list", order_id);
        Ok(())
    }

    // Filters

    async fn select_filter(&self, filter: &str, option: &str) -> Result<()> {
        self.base.click(&Self::filter_button(filter)).await?;
        self.base.expect_visible(&Self::listbox()).await?;
        self.base.click(&Self::filter_option(option)).await?;
        tracing::info!("Verified: selected {} filter: {}", filter, option);
        Ok(())
    }

    /// Pick a status filter option, e.g. `open`.
    pub async fn select_status_filter(&self, status: &str) -> Result<()> {
        self.select_filter("Status", status).await
    }

    /// Pick a payment status filter option, e.g. `paid`.
    pub async fn select_payment_status_filter(&self, payment_status: &str) -> Result<()> {
        self.select_filter("Payment status", payment_status).await
    }

    /// Reset every filter.
    ///
    /// Succeeds once the URL carries no status filter or the pagination
    /// label moved. With no filter applied there is nothing to wait for.
    pub async fn clear_all_filters(&self) -> Result<()> {
        let url_before = self.base.url().await?;
        let label = Self::pagination_text();
        let label_before = self.base.text(&label).await.ok();
        self.base.click(&Self::clear_filters_button()).await?;

        let browser = self.base.browser();
        let label = &label;
        let label_before = label_before.as_deref();
        if !has_status_filter(&url_before) {
            tracing::debug!("No status filter in {}, nothing to wait for", url_before);
        }
        poll_until(self.base.wait(), "filters to clear", move || async move {
            let url = browser.current_url().await?;
            if !has_status_filter(&url) {
                return Ok(Some(()));
            }
            let Some(before) = label_before else {
                return Ok(None);
            };
            let moved = browser.text_content(label).await? != before;
            Ok(moved.then_some(()))
        })
        .await
        .map_err(|e| match e {
            BrowserError::Timeout(detail) => {
                BrowserError::Assertion(format!("clearing filters had no effect ({detail})"))
            }
            other => other,
        })?;
        tracing::info!("Verified: cleared all filters");
        Ok(())
    }

    /// Expect `parameter=value` in the URL.
    pub async fn verify_url_contains(&self, parameter: &str, value: &str) -> Result<()> {
        self.base
            .expect_url_contains(&format!("{parameter}={value}"))
            .await?;
        tracing::info!("Verified: URL contains {}={}", parameter, value);
        Ok(())
    }

    // Tabs

    /// Switch to the general tab and wait until it is selected.
    pub async fn click_general_tab(&self) -> Result<()> {
        self.base
            .click_revealing(&Self::general_tab(), &Self::active_general_tab())
            .await?;
        tracing::info!("Verified: general tab is active");
        Ok(())
    }

    /// Switch to the draft tab.
    pub async fn click_draft_tab(&self) -> Result<()> {
        self.base.click(&Self::draft_tab()).await?;
        self.base.expect_url_contains("draft").await?;
        Ok(())
    }

    /// Switch to the consumable tab.
    pub async fn click_consumable_tab(&self) -> Result<()> {
        self.base.click(&Self::consumable_tab()).await?;
        self.base.expect_url_contains("consumable").await?;
        Ok(())
    }

    // Pagination

    /// Current pagination label.
    pub async fn pagination(&self) -> Result<String> {
        self.base.text(&Self::pagination_text()).await
    }

    /// Wait until the pagination label contains `range`, e.g. `1-10`.
    pub async fn expect_range(&self, range: &str) -> Result<()> {
        self.base
            .expect_text(&Self::pagination_text(), range)
            .await
            .map(|_| ())
    }

    /// Total number of orders shown by the pagination label.
    pub async fn total_order_count(&self) -> Result<u64> {
        let text = self.pagination().await?;
        let total = Pagination::parse_total(&text).ok_or_else(|| {
            BrowserError::Assertion(format!("pagination label {text:?} has no total"))
        })?;
        tracing::info!("Verified: total orders shown in pagination: {}", total);
        Ok(total)
    }

    /// Click a pagination button and wait for the label to move.
    async fn paginate(&self, button: Locator) -> Result<()> {
        let label = self
            .base
            .click_changing(&button, &Self::pagination_text())
            .await?;
        tracing::debug!("Paginated with {}: now {}", button, label);
        Ok(())
    }

    /// Jump to the first page.
    pub async fn go_to_first_page(&self) -> Result<()> {
        self.paginate(Self::first_page_button()).await
    }

    /// Go back one page.
    pub async fn go_to_previous_page(&self) -> Result<()> {
        self.paginate(Self::previous_page_button()).await
    }

    /// Go forward one page.
    pub async fn go_to_next_page(&self) -> Result<()> {
        self.paginate(Self::next_page_button()).await
    }

    /// Jump to the last page.
    pub async fn go_to_last_page(&self) -> Result<()> {
        self.paginate(Self::last_page_button()).await
    }

    // Selection and bulk actions

    /// Tick the header checkbox.
    pub async fn select_all_orders(&self) -> Result<()> {
        self.base.check(&Self::header_checkbox()).await?;
        tracing::info!("Verified: selected all orders");
        Ok(())
    }

    /// Tick the row checkbox at `index`.
    pub async fn select_order_by_index(&self, index: usize) -> Result<()> {
        self.base.check(&Self::row_checkbox(index)).await
    }

    /// Tick the row checkboxes at `indices`.
    pub async fn select_orders(&self, indices: &[usize]) -> Result<()> {
        for &index in indices {
            self.select_order_by_index(index).await?;
        }
        tracing::info!("Verified: selected {} orders", indices.len());
        Ok(())
    }

    /// Tick the checkbox of the row mentioning `order_id`.
    pub async fn select_order_by_order_id(&self, order_id: &str) -> Result<()> {
        let checkbox = Self::row_with(order_id).locate(Locator::css("input[type=\"checkbox\"]"));
        self.base.check(&checkbox).await?;
        tracing::info!("Verified: selected order {}", order_id);
        Ok(())
    }

    /// Submit the open bulk-action modal, confirm the request and close it.
    async fn confirm_modal(&self) -> Result<()> {
        self.base.click(&Self::modal_submit_button()).await?;
        self.base.expect_visible(&Self::success_message()).await?;
        tracing::info!("Verified: {} message is displayed", SUCCESSFULLY_REQUESTED);
        self.base.click(&Self::modal_close_button()).await?;
        self.base.expect_hidden(&Self::success_message()).await
    }

    /// Export the selected orders.
    pub async fn export_selected(&self) -> Result<()> {
        self.base
            .click_revealing(&Self::export_button(), &Self::modal_submit_button())
            .await?;
        self.confirm_modal().await
    }

    /// Mark the selected orders fulfilled.
    pub async fn mark_fulfilled(&self) -> Result<()> {
        self.base
            .click_revealing(&Self::mark_fulfilled_button(), &Self::modal_submit_button())
            .await?;
        self.confirm_modal().await
    }
}

#[async_trait::async_trait]
impl PageModel for OrderListPage<'_> {
    fn name(&self) -> &'static str {
        "order-list"
    }

    fn path(&self) -> String {
        "cms/orders".to_string()
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.base.expect_visible(&Self::pagination_text()).await
    }
}

/// Whether the query string carries `status=` or `payment_status=`.
fn has_status_filter(url: &str) -> bool {
    url.split_once('?')
        .is_some_and(|(_, query)| query.contains("status="))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};
    use hubcheck_browser::{BrowserActions, WaitOptions};
    use hubcheck_core::AppConfig;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(100).with_poll_interval(10)
    }

    #[test]
    fn test_pagination_parse() {
        assert_eq!(
            Pagination::parse("1-10 of 245"),
            Some(Pagination {
                from: 1,
                to: 10,
                total: 245
            })
        );
        assert_eq!(Pagination::parse("11 - 20 of 245").map(|p| p.from), Some(11));
        assert_eq!(Pagination::parse_total("Showing 1-10 of 7"), Some(7));
        assert_eq!(Pagination::parse("no orders"), None);
        assert_eq!(Pagination::parse_total("no orders"), None);
    }

    #[test]
    fn test_filter_option_tries_capitalized_label() {
        let option = OrderListPage::filter_option("open");
        assert_eq!(option.strategies().len(), 2);
        assert!(option.to_string().contains("text=\"Open\""));
    }

    #[tokio::test]
    async fn test_pagination_round_trip() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let label = OrderListPage::pagination_text();
        browser
            .set(&label, FakeElement::visible("1-10 of 245"))
            .set(&OrderListPage::next_page_button(), FakeElement::visible(""))
            .set(&OrderListPage::previous_page_button(), FakeElement::visible(""))
            .on_click(
                &OrderListPage::next_page_button(),
                vec![Reaction::SetText(label.clone(), "11-20 of 245".to_string())],
            )
            .on_click(
                &OrderListPage::previous_page_button(),
                vec![Reaction::SetText(label.clone(), "1-10 of 245".to_string())],
            );

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.expect_range("1-10").await.unwrap();
        page.go_to_next_page().await.unwrap();
        page.expect_range("11-20").await.unwrap();
        page.go_to_previous_page().await.unwrap();
        page.expect_range("1-10").await.unwrap();
        assert_eq!(page.total_order_count().await.unwrap(), 245);
    }

    #[tokio::test]
    async fn test_mark_fulfilled_confirms_modal() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let checkbox =
            OrderListPage::row_with("1042").locate(Locator::css("input[type=\"checkbox\"]"));
        browser
            .set(&checkbox, FakeElement::visible(""))
            .set(&OrderListPage::mark_fulfilled_button(), FakeElement::visible("Mark fulfilled"))
            .on_click(
                &OrderListPage::mark_fulfilled_button(),
                vec![Reaction::Show(
                    OrderListPage::modal_submit_button(),
                    FakeElement::visible("Submit"),
                )],
            )
            .on_click(
                &OrderListPage::modal_submit_button(),
                vec![
                    Reaction::Show(
                        OrderListPage::success_message(),
                        FakeElement::visible(SUCCESSFULLY_REQUESTED),
                    ),
                    Reaction::Show(OrderListPage::modal_close_button(), FakeElement::visible("Close")),
                ],
            )
            .on_click(
                &OrderListPage::modal_close_button(),
                vec![Reaction::Hide(OrderListPage::success_message())],
            );

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.select_order_by_order_id("1042").await.unwrap();
        page.mark_fulfilled().await.unwrap();
        assert!(browser.is_checked(&checkbox).await.unwrap());
        assert!(browser.clicked(&OrderListPage::modal_close_button()));
    }

    #[tokio::test]
    async fn test_status_filter_updates_url() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let option = OrderListPage::filter_option("open");
        browser
            .set(&OrderListPage::filter_button("Status"), FakeElement::visible("Status"))
            .on_click(
                &OrderListPage::filter_button("Status"),
                vec![
                    Reaction::Show(OrderListPage::listbox(), FakeElement::visible("")),
                    Reaction::Show(option.clone(), FakeElement::visible("Open")),
                ],
            )
            .on_click(
                &option,
                vec![Reaction::SetUrl(
                    "http://localhost:3000/en/cms/orders?status=open".to_string(),
                )],
            );

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.select_status_filter("open").await.unwrap();
        page.verify_url_contains("status", "open").await.unwrap();
    }

    /// Next and Clear exist but clicking them leaves the page as it was.
    fn inert_list(browser: &ScriptedBrowser) {
        browser
            .set(&OrderListPage::pagination_text(), FakeElement::visible("1-10 of 245"))
            .set(&OrderListPage::next_page_button(), FakeElement::visible(""))
            .set(&OrderListPage::clear_filters_button(), FakeElement::visible("Clear"));
    }

    #[tokio::test]
    async fn test_next_page_fails_when_label_stays() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        inert_list(&browser);

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        let err = page.go_to_next_page().await.unwrap_err();
        assert!(err.to_string().contains("1-10 of 245"));
        assert!(browser.clicked(&OrderListPage::next_page_button()));
    }

    #[tokio::test]
    async fn test_clear_filters_fails_when_nothing_changes() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        inert_list(&browser);
        browser.navigate("http://localhost:3000/en/cms/orders?status=open").await.unwrap();

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        let err = page.clear_all_filters().await.unwrap_err();
        assert!(err.to_string().contains("clearing filters had no effect"));
    }

    #[tokio::test]
    async fn test_clear_filters_drops_status_from_url() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        inert_list(&browser);
        browser
            .navigate("http://localhost:3000/en/cms/orders?status=open&payment_status=paid")
            .await
            .unwrap();
        browser.on_click(
            &OrderListPage::clear_filters_button(),
            vec![Reaction::SetUrl("http://localhost:3000/en/cms/orders".to_string())],
        );

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.clear_all_filters().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_filters_accepts_label_change_when_url_keeps_filter() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        inert_list(&browser);
        browser.navigate("http://localhost:3000/en/cms/orders?status=open").await.unwrap();
        browser.on_click(
            &OrderListPage::clear_filters_button(),
            vec![Reaction::SetText(
                OrderListPage::pagination_text(),
                "1-10 of 980".to_string(),
            )],
        );

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.clear_all_filters().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_filters_without_active_filter() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        inert_list(&browser);
        browser.navigate("http://localhost:3000/en/cms/orders").await.unwrap();

        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));
        page.clear_all_filters().await.unwrap();
        assert!(browser.clicked(&OrderListPage::clear_filters_button()));
    }

    #[tokio::test]
    async fn test_general_tab_must_become_active() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser.set(&OrderListPage::general_tab(), FakeElement::visible("General"));
        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));

        assert!(page.click_general_tab().await.is_err());

        browser.on_click(
            &OrderListPage::general_tab(),
            vec![Reaction::Show(
                OrderListPage::active_general_tab(),
                FakeElement::visible("General"),
            )],
        );
        page.click_general_tab().await.unwrap();
    }

    #[tokio::test]
    async fn test_select_all_checks_header() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser.set(&OrderListPage::header_checkbox(), FakeElement::visible(""));
        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));

        page.select_all_orders().await.unwrap();
        assert!(browser
            .is_checked(&OrderListPage::header_checkbox())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_export_requires_modal() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser.set(&OrderListPage::export_button(), FakeElement::visible("Export"));
        let page = OrderListPage::new(BasePage::new(&browser, &app, fast()));

        assert!(page.export_selected().await.is_err());
        assert!(!browser.clicked(&OrderListPage::modal_submit_button()));
    }

    #[test]
    fn test_status_filter_detection() {
        assert!(has_status_filter("http://h/en/cms/orders?status=open"));
        assert!(has_status_filter("http://h/en/cms/orders?page=2&payment_status=paid"));
        assert!(!has_status_filter("http://h/en/cms/orders?page=2"));
        assert!(!has_status_filter("http://h/en/status=open"));
    }
}
