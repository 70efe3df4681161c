//! Shared harness: in-memory state with stubbed collaborators.

use async_trait::async_trait;
use marketplace_chat_service::config::Config;
use marketplace_chat_service::error::AppError;
use marketplace_chat_service::models::listing::ListingSummary;
use marketplace_chat_service::models::user::UserProfile;
use marketplace_chat_service::presence::PresenceTracker;
use marketplace_chat_service::services::cipher::MessageCipher;
use marketplace_chat_service::services::listing_client::ListingResolver;
use marketplace_chat_service::services::user_directory::UserDirectory;
use marketplace_chat_service::state::AppState;
use marketplace_chat_service::store::InMemoryMessageStore;
use marketplace_chat_service::websocket::RoomRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub struct StubListingResolver {
    pub listing: Option<ListingSummary>,
    pub fail: bool,
}

#[async_trait]
impl ListingResolver for StubListingResolver {
    async fn resolve(&self, _listing_id: Uuid) -> Result<Option<ListingSummary>, AppError> {
        if self.fail {
            return Err(AppError::ServiceUnavailable("listing-service down".into()));
        }
        Ok(self.listing.clone())
    }
}

pub struct StubUserDirectory {
    pub inactive: HashSet<Uuid>,
}

#[async_trait]
impl UserDirectory for StubUserDirectory {
    async fn resolve_profiles(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, AppError> {
        Ok(ids
            .iter()
            .map(|id| UserProfile {
                id: *id,
                display_name: format!("user-{id}"),
                avatar_url: None,
            })
            .collect())
    }

    async fn is_inactive(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.inactive.contains(&id))
    }
}

pub fn lake_view_villa() -> ListingSummary {
    ListingSummary {
        id: Uuid::new_v4(),
        name: "Lake View Villa".into(),
        address: "12 Shore Rd".into(),
        price: 250000,
        listing_type: "sale".into(),
        period: None,
        url: "https://example.com/listings/lake-view-villa".into(),
    }
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".into(),
        redis_url: None,
        port: 3000,
        message_secret: "integration-test-secret".into(),
        listing_service_url: "http://localhost:3001".into(),
        user_service_url: "http://localhost:3002".into(),
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: InMemoryMessageStore,
}

pub fn harness() -> Harness {
    harness_with(
        StubListingResolver {
            listing: None,
            fail: false,
        },
        StubUserDirectory {
            inactive: HashSet::new(),
        },
    )
}

pub fn harness_with(listings: StubListingResolver, directory: StubUserDirectory) -> Harness {
    let store = InMemoryMessageStore::new();
    let config = Arc::new(test_config());
    let state = AppState {
        store: Arc::new(store.clone()),
        cipher: Arc::new(MessageCipher::new(config.message_secret.clone())),
        presence: Arc::new(PresenceTracker::new()),
        registry: RoomRegistry::new(),
        redis: None,
        listings: Arc::new(listings),
        directory: Arc::new(directory),
        config,
    };
    Harness { state, store }
}

/// Extract the `type` discriminator from a pushed event payload.
pub fn event_type(payload: &str) -> String {
    let parsed: serde_json::Value = serde_json::from_str(payload).expect("event payload is JSON");
    parsed["type"].as_str().expect("type field").to_string()
}
