//! Page objects for the hub.
//!
//! Each page bundles the locators of one screen with the actions a scenario
//! performs there. Pages share [`BasePage`], whose action helpers end with an
//! assertion that the UI caught up.

#![warn(missing_docs)]

/// Shared page helpers and the page contract.
pub mod base;
/// Customers tab.
pub mod customers;
/// Login and company selection.
pub mod login;
/// Order and quote creation form.
pub mod order_creation;
/// Order detail: notes, products, subscriptions.
pub mod order_detail;
/// Order list.
pub mod order_list;
/// Legacy orders tab.
pub mod orders_tab;
/// Products tab.
pub mod products;

pub use base::{BasePage, PageModel};
pub use customers::CustomersPage;
pub use login::{HubFormLoginPage, HubLoginFlow, LoginPage};
pub use order_creation::{BillingField, CreationMode, OrderCreationPage, SubscriptionItem};
pub use order_detail::{CollectedSubscriptions, OrderDetailPage, ProductRow};
pub use order_list::{OrderListPage, Pagination};
pub use orders_tab::{NewOrder, OrdersTab};
pub use products::ProductsPage;
