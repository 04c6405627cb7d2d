//! Telldus Live API client.
//!
//! One authenticated GET against the device listing endpoint, parsed into
//! the shared [`Device`] model. Unknown response fields and unrecognized
//! parameter names are dropped, never errors.

use crate::config::ApiConfig;
use crate::error::{CloudSyncError, Result};
use crate::oauth::{self, Credentials};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;
use tellstick_conf::{Device, DeviceParameters};
use thiserror::Error;
use tracing::debug;

/// Device listing endpoint, relative to the API base URL.
const LIST_DEVICES_PATH: &str = "/json/devices/list";

/// Fixed query: all supported methods plus extended device parameters.
const LIST_DEVICES_QUERY: [(&str, &str); 2] =
    [("supportedMethods", "23"), ("extras", "parameters")];

/// Typed failure of a single cloud fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP response
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Source of the remote device list. The reconciliation engine only knows
/// this trait, so tests can substitute a stub.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn list_devices(&self) -> std::result::Result<Vec<Device>, FetchError>;
}

/// Production device source backed by the Telldus Live HTTP API.
pub struct TelldusClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl TelldusClient {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CloudSyncError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(TelldusClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

#[async_trait]
impl DeviceSource for TelldusClient {
    async fn list_devices(&self) -> std::result::Result<Vec<Device>, FetchError> {
        let url = format!("{}{}", self.base_url, LIST_DEVICES_PATH);
        let auth = oauth::sign("GET", &url, &self.credentials, &LIST_DEVICES_QUERY);

        let response = self
            .client
            .get(&url)
            .query(&LIST_DEVICES_QUERY)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: DeviceListResponse = response.json().await?;
        let devices = payload.into_devices();
        debug!("Fetched {} devices from Telldus Live", devices.len());
        Ok(devices)
    }
}

// Response DTOs. Serde ignores unknown fields by default, which is the
// forward-compatibility contract with the API.

#[derive(Debug, Default, Deserialize)]
struct DeviceListResponse {
    #[serde(default)]
    device: Vec<CloudDevice>,
}

#[derive(Debug, Deserialize)]
struct CloudDevice {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    protocol: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    parameter: Vec<CloudParameter>,
}

#[derive(Debug, Default, Deserialize)]
struct CloudParameter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

impl DeviceListResponse {
    fn into_devices(self) -> Vec<Device> {
        self.device.into_iter().map(CloudDevice::into_device).collect()
    }
}

impl CloudDevice {
    fn into_device(self) -> Device {
        let mut parameters = DeviceParameters::default();
        for param in self.parameter {
            // Only the four recognized names survive
            parameters.set(&param.name, param.value);
        }
        Device {
            id: self.id,
            name: self.name,
            protocol: self.protocol,
            model: self.model,
            parameters,
        }
    }
}
