//! Activities API Client
//!
//! Typed access to the remote activities backend.
//!
//! ## Endpoints
//!
//! - `GET /activities` - full activity catalog
//! - `GET /auth/verify` - check a bearer token
//! - `POST /auth/login` - exchange credentials for a token
//! - `POST /activities/{name}/signup?email=` - register a student
//! - `DELETE /activities/{name}/unregister?email=` - remove a student
//!
//! The controller only sees the [`ActivityApi`] trait, so tests can swap in
//! a scripted backend.

mod dto;
mod error;
mod http;

pub use dto::{
    Activity, ActivityCatalog, LoginRequest, LoginResponse, MessageResponse, VerifyResponse,
};
pub use error::{ClientError, ClientResult};
pub use http::{ClientConfig, HttpActivityClient};

use async_trait::async_trait;

/// Operations the signup desk needs from the remote API
#[async_trait]
pub trait ActivityApi: Send + Sync {
    /// Fetch the full activity collection
    async fn fetch_activities(&self) -> ClientResult<ActivityCatalog>;

    /// Ask the server whether `token` is still valid
    async fn verify(&self, token: &str) -> ClientResult<VerifyResponse>;

    /// Exchange credentials for a bearer token
    async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse>;

    /// Register `email` for `activity`
    async fn signup(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse>;

    /// Remove `email` from `activity`
    async fn unregister(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse>;
}

#[async_trait]
impl<T: ActivityApi + ?Sized> ActivityApi for std::sync::Arc<T> {
    async fn fetch_activities(&self) -> ClientResult<ActivityCatalog> {
        (**self).fetch_activities().await
    }

    async fn verify(&self, token: &str) -> ClientResult<VerifyResponse> {
        (**self).verify(token).await
    }

    async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
        (**self).login(credentials).await
    }

    async fn signup(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse> {
        (**self).signup(token, activity, email).await
    }

    async fn unregister(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> ClientResult<MessageResponse> {
        (**self).unregister(token, activity, email).await
    }
}
