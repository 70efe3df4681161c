//! Listing resolver collaborator.
//!
//! Messages can reference a listing; at send time the listing is resolved
//! and a summary block is baked into the plaintext before encryption.
//! Resolution failure is non-fatal - enrichment is simply skipped.

use crate::error::AppError;
use crate::models::listing::ListingSummary;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ListingResolver: Send + Sync {
    /// `Ok(None)` when the listing does not exist.
    async fn resolve(&self, listing_id: Uuid) -> Result<Option<ListingSummary>, AppError>;
}

/// HTTP client against the listing-service.
#[derive(Clone)]
pub struct HttpListingResolver {
    base_url: String,
    client: reqwest::Client,
}

impl HttpListingResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ListingResolver for HttpListingResolver {
    async fn resolve(&self, listing_id: Uuid) -> Result<Option<ListingSummary>, AppError> {
        let url = format!("{}/api/v1/listings/{}", self.base_url, listing_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("listing-service: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::ServiceUnavailable(format!(
                "listing-service returned {}",
                response.status()
            )));
        }

        let listing = response
            .json::<ListingSummary>()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("listing-service decode: {e}")))?;
        Ok(Some(listing))
    }
}
