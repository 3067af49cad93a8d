//! Scenario registry.
//!
//! Scenarios run strictly in registry order. Groups mirror the suite's
//! feature areas and are what profiles select on.

use futures::future::BoxFuture;
use hubcheck_browser::BrowserActions;
use hubcheck_commands::{CommandContext, Result};
use std::sync::Arc;

mod billing_address;
mod customers;
mod health_check;
mod login;
mod order_creation;
mod order_database;
mod order_detail;
mod order_list;
mod products;
mod session_example;

/// Async body of a scenario.
pub type ScenarioFn = for<'a> fn(&'a CommandContext) -> BoxFuture<'a, Result<()>>;

/// One named check.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub group: &'static str,
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

macro_rules! scenario {
    ($group:expr, $name:expr, $run:path) => {
        Scenario {
            name: $name,
            group: $group,
            run: |ctx| Box::pin($run(ctx)),
        }
    };
}

pub(crate) use scenario;

/// Restore or establish the default session and return the browser.
pub(crate) async fn logged_in(ctx: &CommandContext) -> Result<Arc<dyn BrowserActions>> {
    ctx.login().await?;
    ctx.browser().await
}

/// Every registered scenario, in execution order.
#[must_use]
pub fn all() -> Vec<Scenario> {
    [
        health_check::SCENARIOS,
        login::SCENARIOS,
        session_example::SCENARIOS,
        order_list::SCENARIOS,
        order_detail::SCENARIOS,
        order_creation::SCENARIOS,
        billing_address::SCENARIOS,
        customers::SCENARIOS,
        products::SCENARIOS,
        order_database::SCENARIOS,
    ]
    .concat()
}

/// Scenarios whose group is in `groups` (all when empty) and whose name is
/// in `names` (all when empty).
#[must_use]
pub fn select(groups: &[String], names: &[String]) -> Vec<Scenario> {
    all()
        .into_iter()
        .filter(|s| groups.is_empty() || groups.iter().any(|g| g == s.group))
        .filter(|s| names.is_empty() || names.iter().any(|n| n == s.name))
        .collect()
}

/// Names of all registered groups, in registry order.
#[must_use]
pub fn groups() -> Vec<&'static str> {
    let mut groups: Vec<&'static str> = Vec::new();
    for scenario in all() {
        if !groups.contains(&scenario.group) {
            groups.push(scenario.group);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let scenarios = all();
        let names: HashSet<_> = scenarios.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn test_registered_groups() {
        assert_eq!(
            groups(),
            vec![
                "health-check",
                "login",
                "session-example",
                "order-list",
                "order-detail",
                "order-creation",
                "billing-address",
                "customers",
                "products",
                "order-database",
            ]
        );
    }

    #[test]
    fn test_select_by_group_and_name() {
        let order_list = select(&["order-list".to_string()], &[]);
        assert_eq!(order_list.len(), 11);
        assert!(order_list.iter().all(|s| s.group == "order-list"));

        let one = select(&[], &["order-database-count-orders".to_string()]);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].group, "order-database");

        assert!(select(&["nope".to_string()], &[]).is_empty());
    }
}
