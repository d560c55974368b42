//! API client for the remote user service.
//!
//! This module provides the `ApiClient` struct for making requests against
//! the user directory REST API. The service is unauthenticated; non-2xx
//! status is the only error signal and error bodies carry no defined shape.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::models::{User, UserDraft};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow demo-API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the user directory service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(super::ApiError::from_status(status, &body).into())
        }
    }

    /// Fetch the full user list.
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let url = format!("{}/users", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let users: Vec<User> = response
            .json()
            .await
            .context("Failed to parse user list response")?;

        debug!(count = users.len(), "Users fetched");
        Ok(users)
    }

    /// Create a user from the given draft. Returns the record the server
    /// echoes back; the caller decides what to do with the server-assigned
    /// identifier.
    pub async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let url = format!("{}/users", self.base_url);

        let body = serde_json::json!({
            "name": draft.name,
            "username": draft.username,
            "email": draft.email,
            "phone": draft.phone,
            "website": draft.website,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;

        let created: User = response
            .json()
            .await
            .context("Failed to parse create response")?;

        debug!(id = created.id, "User created");
        Ok(created)
    }

    /// Replace the editable fields of the user with the given identifier.
    pub async fn update_user(&self, id: i64, draft: &UserDraft) -> Result<User> {
        let url = format!("{}/users/{}", self.base_url, id);

        let body = serde_json::json!({
            "id": id,
            "name": draft.name,
            "username": draft.username,
            "email": draft.email,
            "phone": draft.phone,
            "website": draft.website,
        });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to send PUT request to {}", url))?;

        let response = Self::check_response(response).await?;

        let updated: User = response
            .json()
            .await
            .context("Failed to parse update response")?;

        debug!(id = updated.id, "User updated");
        Ok(updated)
    }

    /// Delete the user with the given identifier. Success has an empty body.
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let url = format!("{}/users/{}", self.base_url, id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;

        debug!(id, "User deleted");
        Ok(())
    }
}
