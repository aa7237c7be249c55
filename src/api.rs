//! The remote portal API.
//!
//! [`PortalApi`] is the seam the applications manager talks through. It hands
//! back the raw status and body so the manager owns response validation and
//! can apply its two distinct failure policies (degrade on refresh, hard
//! error on submit).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use crate::{APPLICATIONS_LIST_PATH, SUBMIT_APPLICATION_PATH};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid portal base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("network error calling {path}: {message}")]
    Network { path: String, message: String },
}

/// Raw response from the portal: status code plus body bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `GET /api/getApplications`
    async fn fetch_applications(&self) -> Result<ApiResponse, ApiError>;

    /// `POST /api/submitCraftApplication` with a JSON body.
    async fn submit_application(&self, body: Vec<u8>) -> Result<ApiResponse, ApiError>;
}

/// HTTP implementation of [`PortalApi`] against a portal deployment.
#[derive(Debug, Clone)]
pub struct HttpPortalApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPortalApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build over a caller-configured client (timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|err| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|err| ApiError::InvalidBaseUrl {
            url: format!("{}{path}", self.base_url),
            reason: err.to_string(),
        })
    }

    async fn read_response(
        path: &str,
        request_id: Uuid,
        response: reqwest::Response,
    ) -> Result<ApiResponse, ApiError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| {
                error!(%request_id, error = %err, "failed to read portal response body");
                ApiError::Network {
                    path: path.to_string(),
                    message: err.to_string(),
                }
            })?
            .to_vec();
        debug!(%request_id, status, bytes = body.len(), "portal response received");
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn fetch_applications(&self) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        let url = self.endpoint(APPLICATIONS_LIST_PATH)?;
        debug!(%request_id, %url, "fetching submitted applications");

        let response = self.client.get(url).send().await.map_err(|err| {
            error!(%request_id, error = %err, "application list request failed");
            ApiError::Network {
                path: APPLICATIONS_LIST_PATH.to_string(),
                message: err.to_string(),
            }
        })?;

        Self::read_response(APPLICATIONS_LIST_PATH, request_id, response).await
    }

    async fn submit_application(&self, body: Vec<u8>) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        let url = self.endpoint(SUBMIT_APPLICATION_PATH)?;
        debug!(%request_id, %url, bytes = body.len(), "submitting application");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                error!(%request_id, error = %err, "application submission request failed");
                ApiError::Network {
                    path: SUBMIT_APPLICATION_PATH.to_string(),
                    message: err.to_string(),
                }
            })?;

        Self::read_response(SUBMIT_APPLICATION_PATH, request_id, response).await
    }
}
