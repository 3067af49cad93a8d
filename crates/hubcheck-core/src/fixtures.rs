//! Read-only JSON fixtures shared by scenarios.
//!
//! - `testData.json` holds the billing-address template used by order creation.
//! - `sample-data.json` holds customers and products expected to exist in the hub.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the current Unix time in milliseconds.
pub const TIMESTAMP_PLACEHOLDER: &str = "{{timestamp}}";

/// Billing address entered on the order creation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub given_name: String,
    pub surname: String,
    /// May contain `{{timestamp}}` to produce a unique address per run.
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub vat_number: String,
    #[serde(default)]
    pub company: String,
    pub street: String,
    pub street_number: String,
    #[serde(default)]
    pub address_addition: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl BillingAddress {
    /// Email with the timestamp placeholder replaced by `millis`.
    #[must_use]
    pub fn email_with_timestamp(&self, millis: i64) -> String {
        self.email
            .replace(TIMESTAMP_PLACEHOLDER, &millis.to_string())
    }

    /// Email with the placeholder replaced by the current time.
    #[must_use]
    pub fn unique_email(&self) -> String {
        self.email_with_timestamp(chrono::Utc::now().timestamp_millis())
    }
}

/// Contents of `testData.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestData {
    pub billing_address: BillingAddress,
}

/// A customer row expected to exist in the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A product row expected to exist in the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleProduct {
    pub name: String,
    pub sku: String,
    /// Kept as text; the UI form takes the literal value.
    pub price: String,
    #[serde(default)]
    pub stock: String,
}

/// Contents of `sample-data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleData {
    #[serde(default)]
    pub customers: Vec<SampleCustomer>,
    #[serde(default)]
    pub products: Vec<SampleProduct>,
}

/// Loaded fixture set.
#[derive(Debug, Clone)]
pub struct Fixtures {
    dir: PathBuf,
    pub test_data: TestData,
    pub sample_data: SampleData,
}

impl Fixtures {
    /// File name of the billing-address fixture.
    pub const TEST_DATA_FILE: &'static str = "testData.json";
    /// File name of the customers/products fixture.
    pub const SAMPLE_DATA_FILE: &'static str = "sample-data.json";

    /// Load both fixture files from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let test_data = read_json(&dir.join(Self::TEST_DATA_FILE))?;
        let sample_data = read_json(&dir.join(Self::SAMPLE_DATA_FILE))?;
        tracing::debug!("Loaded fixtures from {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            test_data,
            sample_data,
        })
    }

    /// Directory the fixtures were read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First sample customer.
    pub fn first_customer(&self) -> Result<&SampleCustomer> {
        self.sample_data.customers.first().ok_or_else(|| HubError::Fixture {
            path: self.dir.join(Self::SAMPLE_DATA_FILE).display().to_string(),
            reason: "no customers defined".to_string(),
        })
    }

    /// First sample product.
    pub fn first_product(&self) -> Result<&SampleProduct> {
        self.sample_data.products.first().ok_or_else(|| HubError::Fixture {
            path: self.dir.join(Self::SAMPLE_DATA_FILE).display().to_string(),
            reason: "no products defined".to_string(),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| HubError::Fixture {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| HubError::Fixture {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
