//! Order and quote creation: line items, billing address and submission.

use crate::base::{BasePage, PageModel};
use hubcheck_browser::{BrowserError, Locator, Result, Strategy};
use hubcheck_core::BillingAddress;

/// Which of the two creation flows the page drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// Regular order, lands on `/cms/orders/{id}`
    Order,
    /// Draft order (quote), lands on `/cms/orders/drafts/{id}`
    Quote,
}

impl CreationMode {
    /// Text of the navigation button, page title and submit button.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Order => "Create order",
            Self::Quote => "Create quote",
        }
    }

    /// URL segment preceding the created id.
    #[must_use]
    pub const fn url_marker(self) -> &'static str {
        match self {
            Self::Order => "/cms/orders/",
            Self::Quote => "/cms/orders/drafts/",
        }
    }

    /// Id following the mode's marker in `url`.
    #[must_use]
    pub fn id_from_url(self, url: &str) -> Option<String> {
        let (_, rest) = url.split_once(self.url_marker())?;
        let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
        (!id.is_empty()).then(|| id.to_string())
    }
}

/// Values of one subscription line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionItem {
    /// Unit price
    pub price: String,
    /// Quantity
    pub quantity: String,
    /// Contract duration in months
    pub duration: String,
    /// Subscription type option; the first option when `None`
    pub type_name: Option<String>,
    /// Interval the form derives for a monthly frequency
    pub expected_interval: String,
    /// Prepaid duration the form derives for a monthly frequency
    pub expected_prepaid_duration: String,
}

impl Default for SubscriptionItem {
    fn default() -> Self {
        Self {
            price: "10".to_string(),
            quantity: "1".to_string(),
            duration: "10".to_string(),
            type_name: None,
            expected_interval: "1".to_string(),
            expected_prepaid_duration: "1".to_string(),
        }
    }
}

/// Billing form field, keyed by its `data-cy` container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingField {
    /// First name
    GivenName,
    /// Last name
    Surname,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// VAT number
    VatNumber,
    /// Company name
    Company,
    /// Street
    Street,
    /// House number
    StreetNumber,
    /// Address line 2
    AddressAddition,
    /// Postal code
    PostalCode,
    /// City
    City,
}

impl BillingField {
    /// Every text field in form order.
    pub const ALL: [Self; 11] = [
        Self::GivenName,
        Self::Surname,
        Self::Email,
        Self::Phone,
        Self::VatNumber,
        Self::Company,
        Self::Street,
        Self::StreetNumber,
        Self::AddressAddition,
        Self::PostalCode,
        Self::City,
    ];

    /// `data-cy` of the field's container.
    #[must_use]
    pub const fn test_id(self) -> &'static str {
        match self {
            Self::GivenName => "billing-first-name",
            Self::Surname => "billing-last-name",
            Self::Email => "billing-email",
            Self::Phone => "billing-phone",
            Self::VatNumber => "billing-vat-number",
            Self::Company => "billing-company",
            Self::Street => "billing-street",
            Self::StreetNumber => "billing-street-number",
            Self::AddressAddition => "billing-address-addition",
            Self::PostalCode => "billing-postal-code",
            Self::City => "billing-city",
        }
    }

    /// Value of this field in `address`, with `email` standing in for the
    /// templated address email.
    fn value<'v>(self, address: &'v BillingAddress, email: &'v str) -> &'v str {
        match self {
            Self::GivenName => &address.given_name,
            Self::Surname => &address.surname,
            Self::Email => email,
            Self::Phone => &address.phone,
            Self::VatNumber => &address.vat_number,
            Self::Company => &address.company,
            Self::Street => &address.street,
            Self::StreetNumber => &address.street_number,
            Self::AddressAddition => &address.address_addition,
            Self::PostalCode => &address.postal_code,
            Self::City => &address.city,
        }
    }
}

const COMBOBOX_BUTTON: &str = "[id*=\"headlessui-combobox-button\"]";
const LISTBOX_BUTTON: &str = "button[id*=\"headlessui-listbox-button\"]";
const TEXT_INPUT: &str = "input[type=\"text\"]";
const OPTION: &str = "[role=\"option\"]";
const ZERO_TOTAL: &str = "0,00 €";

/// Order or quote creation page.
#[derive(Debug, Clone, Copy)]
pub struct OrderCreationPage<'a> {
    base: BasePage<'a>,
    mode: CreationMode,
}

impl<'a> OrderCreationPage<'a> {
    /// Creation page in `mode`.
    #[must_use]
    pub fn new(base: BasePage<'a>, mode: CreationMode) -> Self {
        Self { base, mode }
    }

    /// Whether the page creates an order or a quote.
    #[must_use]
    pub fn mode(&self) -> CreationMode {
        self.mode
    }

    // Locators

    /// Button on the order list that opens the form.
    pub fn create_button(mode: CreationMode) -> Locator {
        Locator::text_in("button", mode.label()).first()
    }

    /// Form title.
    pub fn title(mode: CreationMode) -> Locator {
        Locator::text_in("p", mode.label()).first()
    }

    /// Final submit button.
    pub fn submit_button(mode: CreationMode) -> Locator {
        Locator::test_id("btn-submit").has_text(mode.label()).first()
    }

    /// Opens the item dialog.
    pub fn add_item_button() -> Locator {
        Locator::text_in("button", "Add item").first()
    }

    /// Item dialog heading.
    pub fn item_dialog() -> Locator {
        Locator::text_in("h2, h3, p, div", "Item selection")
            .or(Strategy::Text {
                text: "Add Item".to_string(),
                selector: None,
            })
            .first()
    }

    /// Product combobox of the item dialog.
    pub fn product_dropdown() -> Locator {
        Locator::css(COMBOBOX_BUTTON).first()
    }

    /// Variant combobox of the item dialog.
    pub fn variant_dropdown() -> Locator {
        Locator::label_control("Select variant", COMBOBOX_BUTTON).first()
    }

    /// First option of an open dropdown.
    pub fn first_option() -> Locator {
        Locator::css(OPTION).first()
    }

    /// Option labelled `text` of an open dropdown.
    pub fn option(text: &str) -> Locator {
        Locator::text_in(OPTION, text).first()
    }

    /// Subscription toggle of the item dialog.
    pub fn subscription_checkbox() -> Locator {
        Locator::css("input[type=\"checkbox\"][aria-label=\"Subscription\"]")
    }

    /// Subscription type listbox.
    pub fn type_dropdown() -> Locator {
        Locator::label_control("Type", LISTBOX_BUTTON).first()
    }

    /// Billing frequency listbox.
    pub fn frequency_dropdown() -> Locator {
        Locator::label_control("Frequency", LISTBOX_BUTTON).first()
    }

    /// Text input next to the label `label` of the item dialog.
    pub fn item_input(label: &str) -> Locator {
        Locator::label_control(label, TEXT_INPUT).first()
    }

    /// "Unit price:" label.
    pub fn unit_price_label() -> Locator {
        Locator::text("Unit price:").first()
    }

    /// "Row total:" label.
    pub fn row_total_label() -> Locator {
        Locator::text("Row total:").first()
    }

    /// Confirms the start-date picker.
    pub fn date_select_button() -> Locator {
        Locator::text_in("button", "Select").first()
    }

    /// Submits the item dialog.
    pub fn submit_item_button() -> Locator {
        Locator::css("button[type=\"submit\"][data-cy=\"btn-submit\"]").first()
    }

    /// Value cell of the last row total.
    pub fn row_total_cell() -> Locator {
        Locator::css("tr")
            .has_text("Row total:")
            .last()
            .locate(Locator::css("td").last())
    }

    /// Heading of the billing section.
    pub fn billing_header() -> Locator {
        Locator::text_in("p", "Billing address").first()
    }

    /// Text input of a billing field.
    pub fn billing_input(field: BillingField) -> Locator {
        Locator::test_id(field.test_id()).locate(Locator::css(TEXT_INPUT).first())
    }

    /// Country autocomplete input.
    pub fn country_input() -> Locator {
        Locator::test_id("billing-country").locate(Locator::css(TEXT_INPUT).first())
    }

    /// "Charge by invoice" checkbox.
    pub fn charge_by_invoice_checkbox() -> Locator {
        Locator::css("input[aria-label=\"Charge by invoice\"]")
    }

    // Item dialog

    /// Open the item dialog.
    pub async fn open_item_dialog(&self) -> Result<()> {
        self.base.click(&Self::add_item_button()).await?;
        self.base.expect_visible(&Self::item_dialog()).await?;
        tracing::info!("Verified: item dialog opened");
        Ok(())
    }

    /// Open a dropdown and pick its first option; returns the option text.
    async fn pick_first(&self, dropdown: &Locator) -> Result<String> {
        self.base.click(dropdown).await?;
        let option = Self::first_option();
        self.base.expect_visible(&option).await?;
        let text = self.base.text(&option).await?;
        self.base.click(&option).await?;
        self.base.expect_text(dropdown, &text).await?;
        Ok(text)
    }

    /// Pick the first product; returns its label.
    pub async fn select_first_product(&self) -> Result<String> {
        let product = self.pick_first(&Self::product_dropdown()).await?;
        tracing::info!("Verified: {:?} has been selected", product);
        Ok(product)
    }

    /// Pick the first variant; returns its label.
    pub async fn select_first_variant(&self) -> Result<String> {
        let variant = self.pick_first(&Self::variant_dropdown()).await?;
        tracing::info!("Verified: {:?} has been selected", variant);
        Ok(variant)
    }

    /// Expect the subscription toggle to be on.
    pub async fn verify_subscription_enabled(&self) -> Result<()> {
        self.base.expect_checked(&Self::subscription_checkbox()).await?;
        tracing::info!("Verified: subscription is enabled");
        Ok(())
    }

    /// Pick a subscription type by name, or the first type.
    pub async fn select_type(&self, type_name: Option<&str>) -> Result<()> {
        match type_name {
            None => {
                let first = self.pick_first(&Self::type_dropdown()).await?;
                tracing::info!("Verified: type {} has been selected", first);
            }
            Some(name) => {
                self.base.click(&Self::type_dropdown()).await?;
                self.base.click(&Self::option(name)).await?;
                self.base.expect_text(&Self::type_dropdown(), name).await?;
                tracing::info!("Verified: type {} has been selected", name);
            }
        }
        Ok(())
    }

    /// Fill the item dialog field labelled `label`.
    pub async fn set_item_field(&self, label: &str, value: &str) -> Result<()> {
        self.base.fill(&Self::item_input(label), value).await?;
        tracing::info!("Verified: {} set to {:?}", label, value);
        Ok(())
    }

    /// Expect unit price and row total labels.
    pub async fn verify_price_calculation(&self) -> Result<()> {
        self.base.expect_visible(&Self::unit_price_label()).await?;
        self.base.expect_visible(&Self::row_total_label()).await
    }

    /// Pick the monthly frequency.
    pub async fn select_monthly_frequency(&self) -> Result<()> {
        self.base.click(&Self::frequency_dropdown()).await?;
        self.base.click(&Self::option("monthly")).await?;
        tracing::info!("Verified: frequency monthly has been selected");
        Ok(())
    }

    /// Pick today in the start-date picker; returns the chosen date.
    pub async fn select_current_start_date(&self) -> Result<String> {
        let input = Self::item_input("Start date");
        self.base.click(&input).await?;
        self.base.click(&Self::date_select_button()).await?;
        let date = self.base.value(&input).await?;
        tracing::info!("Verified: start date selected - {:?}", date);
        Ok(date)
    }

    /// Submit the item and return the row total, which must not be zero.
    pub async fn submit_item(&self) -> Result<String> {
        self.base.click(&Self::submit_item_button()).await?;
        let cell = Self::row_total_cell();
        self.base.expect_visible(&cell).await?;
        let total = self.base.expect_text_not(&cell, ZERO_TOTAL).await?;
        tracing::info!("Verified: row total is {:?} (not zero)", total);
        Ok(total)
    }

    /// Add one subscription line item end to end.
    pub async fn add_subscription_item(&self, item: &SubscriptionItem) -> Result<String> {
        self.open_item_dialog().await?;
        self.select_first_product().await?;
        self.select_first_variant().await?;
        self.verify_subscription_enabled().await?;
        self.select_type(item.type_name.as_deref()).await?;
        self.set_item_field("Price", &item.price).await?;
        self.set_item_field("Quantity", &item.quantity).await?;
        self.verify_price_calculation().await?;
        self.set_item_field("Duration", &item.duration).await?;
        self.select_monthly_frequency().await?;
        self.base
            .expect_value(&Self::item_input("Interval"), &item.expected_interval)
            .await?;
        self.base
            .expect_value(
                &Self::item_input("Prepaid duration"),
                &item.expected_prepaid_duration,
            )
            .await?;
        self.select_current_start_date().await?;
        let end = self.base.value(&Self::item_input("End date")).await?;
        tracing::info!("Verified: end date is {:?}", end);
        self.submit_item().await
    }

    // Billing address

    /// Type `country` and pick the matching option.
    pub async fn select_country(&self, country: &str) -> Result<()> {
        self.base.click(&Self::country_input()).await?;
        self.base.click(&Self::option(country)).await?;
        tracing::info!("Verified: country {:?} has been selected", country);
        Ok(())
    }

    /// Fill the billing form; returns the email actually entered.
    pub async fn fill_billing_address(&self, address: &BillingAddress) -> Result<String> {
        self.base.expect_visible(&Self::billing_header()).await?;
        let email = address.unique_email();
        for field in BillingField::ALL {
            let value = field.value(address, &email);
            // Address addition is optional
            if value.is_empty() {
                continue;
            }
            self.base.fill(&Self::billing_input(field), value).await?;
            tracing::debug!("Billing field {} set to {:?}", field.test_id(), value);
        }
        self.select_country(&address.country).await?;
        tracing::info!("Verified: billing address filled successfully");
        Ok(email)
    }

    /// Check every billing field holds the value from `address`.
    pub async fn verify_billing_address(&self, address: &BillingAddress, email: &str) -> Result<()> {
        for field in BillingField::ALL {
            let expected = field.value(address, email);
            self.base
                .expect_value(&Self::billing_input(field), expected)
                .await?;
            tracing::info!("Verified: {} is {:?}", field.test_id(), expected);
        }
        Ok(())
    }

    /// Tick "Charge by invoice".
    pub async fn enable_charge_by_invoice(&self) -> Result<()> {
        self.base.check(&Self::charge_by_invoice_checkbox()).await
    }

    // Submission

    /// Submit the order or quote and return the id from the landing URL.
    pub async fn submit(&self) -> Result<String> {
        self.base.click(&Self::submit_button(self.mode)).await?;
        let url = self.base.expect_url_contains(self.mode.url_marker()).await?;
        let id = self.mode.id_from_url(&url).ok_or_else(|| {
            BrowserError::Assertion(format!("no id after {} in {url}", self.mode.url_marker()))
        })?;
        tracing::info!("Verified: id extracted from URL: {}", id);
        Ok(id)
    }
}

#[async_trait::async_trait]
impl PageModel for OrderCreationPage<'_> {
    fn name(&self) -> &'static str {
        match self.mode {
            CreationMode::Order => "order-creation",
            CreationMode::Quote => "quote-creation",
        }
    }

    /// The creation page has no own route; it opens from the home page.
    fn path(&self) -> String {
        String::new()
    }

    fn base(&self) -> &BasePage<'_> {
        &self.base
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        self.base.expect_visible(&Self::title(self.mode)).await?;
        tracing::info!("Verified: {} page loaded", self.name());
        Ok(())
    }

    async fn open(&self) -> Result<()> {
        self.base.visit(&self.path()).await?;
        self.base.click(&Self::create_button(self.mode)).await?;
        self.wait_until_loaded().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubcheck_browser::testing::{FakeElement, Reaction, ScriptedBrowser};
    use hubcheck_browser::WaitOptions;
    use hubcheck_core::AppConfig;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(100).with_poll_interval(10)
    }

    fn address() -> BillingAddress {
        BillingAddress {
            given_name: "Max".to_string(),
            surname: "Mustermann".to_string(),
            email: "max.mustermann+{{timestamp}}@example.com".to_string(),
            phone: "+49301234567".to_string(),
            vat_number: "DE123456789".to_string(),
            company: "Musterfirma GmbH".to_string(),
            street: "Musterstraße".to_string(),
            street_number: "1".to_string(),
            address_addition: String::new(),
            postal_code: "10115".to_string(),
            city: "Berlin".to_string(),
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(
            CreationMode::Order
                .id_from_url("https://hub.example.com/en/cms/orders/1042")
                .as_deref(),
            Some("1042")
        );
        assert_eq!(
            CreationMode::Quote
                .id_from_url("https://hub.example.com/en/cms/orders/drafts/D-77?tab=items")
                .as_deref(),
            Some("D-77")
        );
        assert_eq!(
            CreationMode::Quote.id_from_url("https://hub.example.com/en/cms/orders/1042"),
            None
        );
        assert_eq!(
            CreationMode::Order.id_from_url("https://hub.example.com/en/cms/orders/"),
            None
        );
    }

    #[tokio::test]
    async fn test_fill_billing_address() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser.set(&OrderCreationPage::billing_header(), FakeElement::visible("Billing address"));
        for field in BillingField::ALL {
            browser.set(&OrderCreationPage::billing_input(field), FakeElement::field(""));
        }
        browser
            .set(&OrderCreationPage::country_input(), FakeElement::field(""))
            .on_click(
                &OrderCreationPage::country_input(),
                vec![Reaction::Show(
                    OrderCreationPage::option("Germany"),
                    FakeElement::visible("Germany"),
                )],
            );

        let page = OrderCreationPage::new(BasePage::new(&browser, &app, fast()), CreationMode::Quote);
        let address = address();
        let email = page.fill_billing_address(&address).await.unwrap();
        assert!(email.starts_with("max.mustermann+"));
        assert!(!email.contains("{{timestamp}}"));

        let filled = |field| browser.filled(&OrderCreationPage::billing_input(field));
        assert_eq!(filled(BillingField::GivenName).as_deref(), Some("Max"));
        assert_eq!(filled(BillingField::Surname).as_deref(), Some("Mustermann"));
        assert_eq!(filled(BillingField::City).as_deref(), Some("Berlin"));
        assert_eq!(filled(BillingField::AddressAddition), None);
        assert!(browser.clicked(&OrderCreationPage::option("Germany")));

        page.verify_billing_address(&address, &email).await.unwrap();
        assert!(page.verify_billing_address(&address, "other@example.com").await.is_err());
    }

    #[tokio::test]
    async fn test_submit_quote_returns_draft_id() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let submit = OrderCreationPage::submit_button(CreationMode::Quote);
        browser.set(&submit, FakeElement::visible("Create quote")).on_click(
            &submit,
            vec![Reaction::SetUrl(
                "http://localhost:3000/en/cms/orders/drafts/D-77".to_string(),
            )],
        );

        let page = OrderCreationPage::new(BasePage::new(&browser, &app, fast()), CreationMode::Quote);
        assert_eq!(page.submit().await.unwrap(), "D-77");
    }

    #[tokio::test]
    async fn test_submit_item_rejects_zero_total() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        browser
            .set(&OrderCreationPage::submit_item_button(), FakeElement::visible("Add item"))
            .set(&OrderCreationPage::row_total_cell(), FakeElement::visible(ZERO_TOTAL));

        let page = OrderCreationPage::new(BasePage::new(&browser, &app, fast()), CreationMode::Order);
        let err = page.submit_item().await.unwrap_err();
        assert!(matches!(err, BrowserError::Assertion(_)));

        browser.set(&OrderCreationPage::row_total_cell(), FakeElement::visible("20,00 €"));
        assert_eq!(page.submit_item().await.unwrap(), "20,00 €");
    }

    #[tokio::test]
    async fn test_select_first_product_waits_for_selection() {
        let app = AppConfig::default();
        let browser = ScriptedBrowser::new();
        let dropdown = OrderCreationPage::product_dropdown();
        let option = OrderCreationPage::first_option();
        browser
            .set(&dropdown, FakeElement::visible("Select product"))
            .on_click(
                &dropdown,
                vec![Reaction::Show(option.clone(), FakeElement::visible("Refill Pack"))],
            );
        let page = OrderCreationPage::new(BasePage::new(&browser, &app, fast()), CreationMode::Order);

        // Option clicked but the dropdown still shows the placeholder
        assert!(page.select_first_product().await.is_err());

        browser.on_click(
            &option,
            vec![Reaction::SetText(dropdown.clone(), "Refill Pack".to_string())],
        );
        assert_eq!(page.select_first_product().await.unwrap(), "Refill Pack");
    }
}
