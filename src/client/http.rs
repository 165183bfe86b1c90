//! Activities REST API client
//!
//! HTTP client for the remote activities backend.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::dto::{
    ActivityCatalog, ErrorBody, LoginRequest, LoginResponse, MessageResponse, VerifyResponse,
};
use super::error::{ClientError, ClientResult};
use super::ActivityApi;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the activities API (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// reqwest-backed [`ActivityApi`]
pub struct HttpActivityClient {
    client: Client,
    base_url: String,
}

impl HttpActivityClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn activity_url(&self, activity: &str, action: &str) -> String {
        format!(
            "{}/activities/{}/{}",
            self.base_url,
            urlencoding::encode(activity),
            action
        )
    }
}

/// Decode a response: JSON body on 2xx, `{detail}` error otherwise
async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ClientError::from_send)?;

    if status.is_success() {
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    } else {
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            detail: body.into_detail(),
        })
    }
}

#[async_trait]
impl ActivityApi for HttpActivityClient {
    async fn fetch_activities(&self) -> ClientResult<ActivityCatalog> {
        let url = format!("{}/activities", self.base_url);
        tracing::debug!(%url, "Fetching activities");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response).await
    }

    async fn verify(&self, token: &str) -> ClientResult<VerifyResponse> {
        let url = format!("{}/auth/verify", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response).await
    }

    async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        tracing::debug!(username = %credentials.username, "Sending login request");

        let response = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response).await
    }

    async fn signup(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse> {
        let url = self.activity_url(activity, "signup");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response).await
    }

    async fn unregister(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse> {
        let url = self.activity_url(activity, "unregister");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(ClientError::from_send)?;

        read_json(response).await
    }
}
