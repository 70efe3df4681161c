//! User directory collaborator: profile resolution and account status.

use crate::error::AppError;
use crate::models::user::UserProfile;
use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve profile summaries for the given ids; unknown ids are omitted.
    async fn resolve_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError>;

    /// Whether the account is deactivated. Inactive users are filtered out
    /// of presence listings.
    async fn is_inactive(&self, id: Uuid) -> Result<bool, AppError>;
}

/// HTTP client against the user-service.
#[derive(Clone)]
pub struct HttpUserDirectory {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUserDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    active: bool,
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn resolve_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/api/v1/users/profiles", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("user-service: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ServiceUnavailable(format!(
                "user-service returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<UserProfile>>()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("user-service decode: {e}")))
    }

    async fn is_inactive(&self, id: Uuid) -> Result<bool, AppError> {
        let url = format!("{}/api/v1/users/{}/status", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("user-service: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // Unknown accounts are treated as inactive rather than online.
            return Ok(true);
        }
        if !response.status().is_success() {
            return Err(AppError::ServiceUnavailable(format!(
                "user-service returned {}",
                response.status()
            )));
        }

        let status = response
            .json::<StatusResponse>()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("user-service decode: {e}")))?;
        Ok(!status.active)
    }
}
