//! Order detail page: notes, product rows and subscription creation.

use crate::base::{BasePage, PageModel};
use crate::order_list::SUCCESSFULLY_REQUESTED;
use hubcheck_browser::{poll_until, BrowserError, Locator, Result};
use hubcheck_core::{OrderId, SubscriptionId, SubscriptionType};

/// Prompt shown by the create-subscription modal.
pub const CREATE_SUBSCRIPTION_PROMPT: &str =
    "Create a subscription for the order to start charging recurring payments";

const SUBSCRIPTION_ID_COLUMN: usize = 5;
const SUBSCRIPTION_TYPE_COLUMN: usize = 8;

/// Subscription id from a table cell; placeholders like `-` yield `None`.
fn subscription_cell(text: &str) -> Option<SubscriptionId> {
    if text.chars().any(char::is_alphanumeric) {
        SubscriptionId::new(text).ok()
    } else {
        None
    }
}

/// One line of the product table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    /// Zero-based row index
    pub index: usize,
    /// Subscription id cell, when it holds one
    pub subscription_id: Option<SubscriptionId>,
    /// Subscription type cell, when it names a known type
    pub subscription_type: Option<SubscriptionType>,
    /// Whether the row offers a "Create subscription" button
    pub can_create_subscription: bool,
}

/// First subscription id found per subscription type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedSubscriptions {
    /// Consumable subscription
    pub consumable: Option<SubscriptionId>,
    /// Normal subscription
    pub normal: Option<SubscriptionId>,
    /// Digital subscription
    pub digital: Option<SubscriptionId>,
}

impl CollectedSubscriptions {
    /// Keep the first row of each type.
    #[must_use]
    pub fn from_rows(rows: &[ProductRow]) -> Self {
        let mut collected = Self::default();
        for row in rows {
            let (Some(kind), Some(id)) = (row.subscription_type, &row.subscription_id) else {
                continue;
            };
            let slot = collected.slot_mut(kind);
            if slot.is_none() {
                tracing::info!("Found {} subscription at row {}: {}", kind, row.index + 1, id);
                *slot = Some(id.clone());
            }
        }
        collected
    }

    fn slot_mut(&mut self, kind: SubscriptionType) -> &mut Option<SubscriptionId> {
        match kind {
            SubscriptionType::Consumable => &mut self.consumable,
            SubscriptionType::Normal => &mut self.normal,
            SubscriptionType::Digital => &mut self.digital,
        }
    }

    /// Subscription id collected for `kind`.
    #[must_use]
    pub fn get(&self, kind: SubscriptionType) -> Option<&SubscriptionId> {
        match kind {
            SubscriptionType::Consumable => self.consumable.as_ref(),
            SubscriptionType::Normal => self.normal.as_ref(),
            SubscriptionType::Digital => self.digital.as_ref(),
        }
    }

    /// Types with no row on the page.
    #[must_use]
    pub fn missing(&self) -> Vec<SubscriptionType> {
        [
            SubscriptionType::Consumable,
            SubscriptionType::Normal,
            SubscriptionType::Digital,
        ]
        .into_iter()
        .filter(|kind| self.get(*kind).is_none())
        .collect()
    }
}

/// Order detail at `cms/orders/{id}`.
#[derive(Debug, Clone)]
pub struct OrderDetailPage<'a> {
    base: BasePage<'a>,
    order_id: OrderId,
}

impl<'a> OrderDetailPage<'a> {
    /// Detail page of `order_id`.
    #[must_use]
    pub fn new(base: BasePage<'a>, order_id: OrderId) -> Self {
        Self { base, order_id }
    }

    /// Order the page shows.
    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    // Locators

    /// Opens the note form.
    pub fn create_note_button() -> Locator {
        Locator::text_in("button", "Create note").first()
    }

    /// Note text area.
    pub fn note_input() -> Locator {
        Locator::css("textarea[id^=\"input-v-\"]").first()
    }

    /// Submit button of the open dialog.
    pub fn submit_button() -> Locator {
        Locator::test_id("btn-submit").first()
    }

    /// Close button of the open dialog.
    pub fn close_button() -> Locator {
        Locator::test_id("btn-close").first()
    }

    /// Listed notes.
    pub fn notes() -> Locator {
        Locator::test_id("note-message")
    }

    /// Rows of the product table.
    pub fn product_rows() -> Locator {
        Locator::css("tbody tr.v-data-table__tr")
    }

    /// Cell at `row` and `column`, both 0-based.
    pub fn product_cell(row: usize, column: usize) -> Locator {
        Self::product_rows()
            .nth(row)
            .locate(Locator::css("td").nth(column))
    }

    /// "Create subscription" button of `row`.
    pub fn create_subscription_button(row: usize) -> Locator {
        Self::product_rows()
            .nth(row)
            .locate(Locator::text_in("button", "Create subscription").first())
    }

    /// Prompt of the create-subscription dialog.
    pub fn subscription_prompt() -> Locator {
        Locator::text(CREATE_SUBSCRIPTION_PROMPT).first()
    }

    /// Generates subscription values.
    pub fn generate_button() -> Locator {
        Locator::text_in("button", "Generate").first()
    }

    /// Adds the generated subscription.
    pub fn add_button() -> Locator {
        Locator::text_in("button", "Add").first()
    }

    /// Confirmation once the request was accepted.
    pub fn success_message() -> Locator {
        Locator::text_in("p", SUCCESSFULLY_REQUESTED).first()
    }

    // Navigation

    /// Expect `/orders/{id}` in the URL.
    pub async fn verify_url_contains_order_id(&self) -> Result<()> {
        self.base
            .expect_url_contains(&format!("/orders/{}", self.order_id))
            .await?;
        tracing::info!("Verified: URL contains /orders/{}", self.order_id);
        Ok(())
    }

    // Notes

    /// Create a note and wait until it is listed.
    pub async fn create_note(&self, message: &str) -> Result<()> {
        self.base.click(&Self::create_note_button()).await?;
        let input = Self::note_input();
        self.base.expect_visible(&input).await?;
        self.base.fill(&input, message).await?;
        self.base.click(&Self::submit_button()).await?;
        self.verify_note_exists(message).await
    }

    /// Expect a note containing `message`.
    pub async fn verify_note_exists(&self, message: &str) -> Result<()> {
        self.base.expect_text(&Self::notes(), message).await?;
        tracing::info!("Verified: note with message {:?} is visible", message);
        Ok(())
    }

    // Product table

    /// Read every product row.
    pub async fn product_table(&self) -> Result<Vec<ProductRow>> {
        let count = self.base.count(&Self::product_rows()).await?;
        tracing::info!("Found {} product rows", count);

        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            let kind = self
                .base
                .text(&Self::product_cell(index, SUBSCRIPTION_TYPE_COLUMN))
                .await?;
            let id = self
                .base
                .text(&Self::product_cell(index, SUBSCRIPTION_ID_COLUMN))
                .await?;
            let can_create_subscription = self
                .base
                .is_visible(&Self::create_subscription_button(index))
                .await?;
            tracing::debug!("Row {}: subscription type = {}", index + 1, kind);
            rows.push(ProductRow {
                index,
                subscription_id: subscription_cell(&id),
                subscription_type: SubscriptionType::from_cell(&kind),
                can_create_subscription,
            });
        }
        Ok(rows)
    }

    /// First subscription of each type in the product table.
    pub async fn collect_subscription_types(&self) -> Result<CollectedSubscriptions> {
        let collected = CollectedSubscriptions::from_rows(&self.product_table().await?);
        for kind in collected.missing() {
            tracing::warn!("{} type subscription is missing", kind);
        }
        Ok(collected)
    }

    /// Subscription id shown in a row, once the cell holds one.
    pub async fn subscription_id_at(&self, row: usize) -> Result<SubscriptionId> {
        let cell = Self::product_cell(row, SUBSCRIPTION_ID_COLUMN);
        let base = &self.base;
        let cell = &cell;
        poll_until(
            base.wait(),
            &format!("subscription id in row {}", row + 1),
            move || async move { Ok(subscription_cell(&base.text(cell).await?)) },
        )
        .await
        .map_err(|e| match e {
            BrowserError::Timeout(detail) => {
                BrowserError::Assertion(format!("row {} has no subscription id ({detail})", row + 1))
            }
            other => other,
        })
    }

    /// Open the create-subscription modal of a row and run it to the end.
    pub async fn create_subscription_for_row(&self, row: usize) -> Result<()> {
        self.base
            .click(&Self::create_subscription_button(row))
            .await?;
        tracing::info!("Verified: clicked Create subscription for row {}", row + 1);
        self.create_subscription_flow().await
    }

    /// Prompt, Generate, Add, Submit, success message, Close.
    pub async fn create_subscription_flow(&self) -> Result<()> {
        self.base.expect_visible(&Self::subscription_prompt()).await?;
        tracing::info!("Verified: create subscription message is displayed");

        self.base.click(&Self::generate_button()).await?;
        self.base.click(&Self::add_button()).await?;
        self.base.click(&Self::submit_button()).await?;
        self.base.expect_visible(&Self::success_message()).await?;
        tracing::info!("Verified: {} message is displayed", SUCCESSFULLY_REQUESTED);
        self.base.click(&Self::close_button()).await?;
        self.base.expect_hidden(&Self::success_message()).await
    }
}

#[async_trait::async_trait]
impl PageModel for OrderDetailPage<'_> {
    fn name(&self) -> &'static str {
        "order-detail"
    }

    fn path(&self) -> String {
        format!("cms/orders/{}", self.order_id)
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.verify_url_contains_order_id().await?;
        self.base.expect_visible(&Self::create_note_button()).await
    }
}
