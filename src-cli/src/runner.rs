//! Sequential scenario runner with flaky-retry, failure screenshots and the
//! page-error policy.

use crate::scenarios::Scenario;
use hubcheck_commands::{CommandContext, CommandError, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Outcome of one scenario after all attempts.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: &'static str,
    /// Group the scenario belongs to
    pub group: &'static str,
    /// Whether any attempt passed
    pub passed: bool,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Error of the last failed attempt
    pub error: Option<String>,
    /// Wall time across all attempts
    pub duration: Duration,
    /// Screenshots taken on failed attempts
    pub screenshots: Vec<PathBuf>,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Reports in run order
    pub scenarios: Vec<ScenarioReport>,
    /// Wall time of the whole run
    pub duration: Duration,
}

impl RunReport {
    /// Scenarios that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed).count()
    }

    /// Scenarios that failed every attempt.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// Whether no scenario failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Scenarios that passed only after a retry.
    #[must_use]
    pub fn flaky(&self) -> Vec<&ScenarioReport> {
        self.scenarios
            .iter()
            .filter(|s| s.passed && s.attempts > 1)
            .collect()
    }
}

/// Runs scenarios one after another against a shared context.
pub struct Runner<'a> {
    ctx: &'a CommandContext,
    retries: u32,
    screenshot_dir: PathBuf,
}

impl<'a> Runner<'a> {
    /// Runner retrying each failed scenario up to `retries` more times.
    #[must_use]
    pub fn new(ctx: &'a CommandContext, retries: u32) -> Self {
        let screenshot_dir = ctx.config().suite.artifacts_dir.join("screenshots");
        Self {
            ctx,
            retries,
            screenshot_dir,
        }
    }

    /// Run `scenarios` in order and collect their reports.
    pub async fn run(&self, scenarios: &[Scenario]) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::default();
        for scenario in scenarios {
            report.scenarios.push(self.run_scenario(scenario).await);
        }
        report.duration = started.elapsed();
        report
    }

    async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        let mut screenshots = Vec::new();
        let mut attempt = 0;
        let mut error = None;

        while attempt <= self.retries {
            attempt += 1;
            tracing::info!(
                "Running {} / {} (attempt {})",
                scenario.group,
                scenario.name,
                attempt
            );
            match self.attempt(scenario).await {
                Ok(()) => {
                    error = None;
                    break;
                }
                Err(e) => {
                    tracing::warn!("{} failed on attempt {}: {}", scenario.name, attempt, e);
                    if let Some(path) = self.capture_failure(scenario, attempt).await {
                        screenshots.push(path);
                    }
                    error = Some(e.to_string());
                }
            }
        }

        let passed = error.is_none();
        if passed {
            tracing::info!("✓ {} passed", scenario.name);
        } else {
            tracing::error!("✗ {} failed after {} attempts", scenario.name, attempt);
        }
        ScenarioReport {
            name: scenario.name,
            group: scenario.group,
            passed,
            attempts: attempt,
            error,
            duration: started.elapsed(),
            screenshots,
        }
    }

    async fn attempt(&self, scenario: &Scenario) -> Result<()> {
        let result = (scenario.run)(self.ctx).await;

        let Some(browser) = self.ctx.active_browser() else {
            return result;
        };
        let page_errors = browser.take_page_errors().await;
        if page_errors.is_empty() {
            return result;
        }
        for message in &page_errors {
            tracing::debug!("Uncaught page exception: {}", message);
        }
        if result.is_ok() && self.ctx.config().browser.fail_on_page_errors {
            return Err(CommandError::Assertion(format!(
                "{} uncaught page exception(s): {}",
                page_errors.len(),
                page_errors.join("; ")
            )));
        }
        result
    }

    /// Screenshot of the failed attempt, when enabled and a browser is up.
    async fn capture_failure(&self, scenario: &Scenario, attempt: u32) -> Option<PathBuf> {
        if !self.ctx.config().browser.screenshot_on_failure {
            return None;
        }
        let browser = self.ctx.active_browser()?;
        let png = match browser.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!("Failed to capture screenshot: {}", e);
                return None;
            }
        };

        let path = self.screenshot_dir.join(format!(
            "{} -- {} (failed) (attempt {}).png",
            scenario.group, scenario.name, attempt
        ));
        let written = async {
            tokio::fs::create_dir_all(&self.screenshot_dir).await?;
            tokio::fs::write(&path, png).await
        };
        match written.await {
            Ok(()) => {
                tracing::info!("Screenshot saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Failed to write screenshot {}: {}", path.display(), e);
                None
            }
        }
    }
}
