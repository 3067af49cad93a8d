//! HTTP health checks with a single delayed retry.

use crate::error::{HealthError, Result};
use hubcheck_core::{EndpointConfig, HealthConfig, TimeoutConfig};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Outcome of checking one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Endpoint name
    pub name: String,
    /// Checked URL
    pub url: String,
    /// Final HTTP status, `None` on transport failure
    pub status: Option<u16>,
    /// Requests made (1 or 2)
    pub attempts: u32,
    /// Whether the final status is accepted
    pub healthy: bool,
}

/// Checks configured endpoints.
///
/// Redirects are not followed, so a `301`/`302` from a version endpoint is
/// observed as such and counts as healthy by default.
#[derive(Debug, Clone)]
pub struct HealthChecker {
    client: Client,
    endpoints: Vec<EndpointConfig>,
    accepted: Vec<u16>,
    retry_delay: Duration,
}

impl HealthChecker {
    /// Create a checker from the health and timeout sections of the config.
    ///
    /// `request_ms` bounds connecting and `response_ms` the wait for the
    /// response after that, so a request gives up after their sum.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(health: &HealthConfig, timeouts: &TimeoutConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(timeouts.request_ms))
            .timeout(Duration::from_millis(
                timeouts.request_ms.saturating_add(timeouts.response_ms),
            ))
            .redirect(Policy::none())
            .build()
            .map_err(|e| HealthError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints: health.endpoints.clone(),
            accepted: health.accepted_statuses.clone(),
            retry_delay: Duration::from_secs(health.retry_delay_secs),
        })
    }

    /// Override the delay before the retry.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Configured endpoints in check order.
    #[must_use]
    pub fn endpoints(&self) -> &[EndpointConfig] {
        &self.endpoints
    }

    /// Endpoint by name.
    pub fn endpoint(&self, name: &str) -> Result<&EndpointConfig> {
        self.endpoints
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| HealthError::UnknownEndpoint(name.to_string()))
    }

    async fn attempt(&self, url: &str) -> Option<u16> {
        match self.client.get(url).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                tracing::warn!("Health request to {} failed: {}", url, e);
                None
            }
        }
    }

    fn is_accepted(&self, status: Option<u16>) -> bool {
        status.is_some_and(|s| self.accepted.contains(&s))
    }

    /// Check one endpoint.
    ///
    /// An unhealthy first attempt is retried once after the retry delay
    /// (when the endpoint allows it) and the retry's result is final.
    pub async fn check_api(&self, endpoint: &EndpointConfig) -> Result<HealthStatus> {
        let mut status = self.attempt(&endpoint.url).await;
        let mut attempts = 1;

        if !self.is_accepted(status) && endpoint.retry {
            tracing::info!(
                "{} returned {:?}, retrying in {}s",
                endpoint.name,
                status,
                self.retry_delay.as_secs()
            );
            tokio::time::sleep(self.retry_delay).await;
            status = self.attempt(&endpoint.url).await;
            attempts += 1;
        }

        let healthy = self.is_accepted(status);
        tracing::info!(
            "Health check {}: status {:?} after {} attempt(s)",
            endpoint.name,
            status,
            attempts
        );

        if !healthy {
            return Err(HealthError::Unhealthy {
                name: endpoint.name.clone(),
                url: endpoint.url.clone(),
                status,
            });
        }

        Ok(HealthStatus {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            status,
            attempts,
            healthy,
        })
    }

    /// Check the endpoint called `name`.
    pub async fn check_named(&self, name: &str) -> Result<HealthStatus> {
        let endpoint = self.endpoint(name)?.clone();
        self.check_api(&endpoint).await
    }

    /// Check that `url` answers with a 2xx or 3xx status, without retrying.
    ///
    /// Redirects are not followed, so a 3xx counts as reachable. Returns the
    /// observed status.
    pub async fn check_reachable(&self, name: &str, url: &str) -> Result<u16> {
        let status = self.attempt(url).await;
        tracing::info!("Reachability of {} ({}): {:?}", name, url, status);
        match status {
            Some(code) if (200..400).contains(&code) => Ok(code),
            _ => Err(HealthError::Unhealthy {
                name: name.to_string(),
                url: url.to_string(),
                status,
            }),
        }
    }

    /// Check every endpoint in order, stopping at the first failure.
    pub async fn check_all(&self) -> Result<Vec<HealthStatus>> {
        let mut results = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            results.push(self.check_api(endpoint).await?);
        }
        Ok(results)
    }
}
