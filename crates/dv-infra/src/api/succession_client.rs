//! Client for the upstream succession-request collaborator: an HTTP service
//! that accepts a request id and a customer identity number and returns
//! normalized JSON business fields.

use anyhow::{Context, Result};
use dv_core::config::ApiConfig;
use dv_core::ids::OwnerId;
use dv_core::retry::{ApiError, RetryPolicy};
use serde::Deserialize;
use tracing::debug;

use crate::retry::with_retry;

/// Normalized succession case as returned by the translation proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuccessionCase {
    pub request_id: String,
    pub status: String,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub observations: Vec<String>,
}

pub struct SuccessionApiClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl SuccessionApiClient {
    pub fn new(config: &ApiConfig, policy: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build HTTP client failed")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    /// Fetches the case for `request_id` / `owner`, retrying per the
    /// configured policy.
    pub async fn fetch_case(
        &self,
        request_id: &str,
        owner: &OwnerId,
    ) -> Result<SuccessionCase, ApiError> {
        with_retry("fetch_case", &self.policy, || {
            self.get_case(request_id, owner)
        })
        .await
    }

    async fn get_case(&self, request_id: &str, owner: &OwnerId) -> Result<SuccessionCase, ApiError> {
        let url = format!(
            "{}/cases/{}?rut={}",
            self.base_url, request_id, owner
        );
        debug!(url = %url, "fetching succession case");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<SuccessionCase>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}
