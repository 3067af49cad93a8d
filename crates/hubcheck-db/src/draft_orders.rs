//! Draft (quote) order queries.

use crate::descriptor::{Dialect, QueryBuilder, QueryDescriptor};

/// Draft order by the id shown in `/cms/orders/drafts/{id}`.
///
/// Returns `id`, `draft_id`, `order_checkout_link` and `status`.
#[must_use]
pub fn draft_order_by_draft_id(dialect: Dialect, draft_id: &str) -> QueryDescriptor {
    let mut q = QueryBuilder::new(dialect);
    q.push("SELECT id, draft_id, order_checkout_link, status FROM draft_orders WHERE draft_id = ")
        .push_bind(draft_id);
    q.build()
}
