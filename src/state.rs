use crate::{
    config::Config,
    presence::PresenceTracker,
    services::{cipher::MessageCipher, listing_client::ListingResolver, user_directory::UserDirectory},
    store::MessageStore,
    websocket::RoomRegistry,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub cipher: Arc<MessageCipher>,
    pub presence: Arc<PresenceTracker>,
    pub registry: RoomRegistry,
    /// Cross-instance fan-out bridge; `None` runs single-instance.
    pub redis: Option<redis::Client>,
    pub listings: Arc<dyn ListingResolver>,
    pub directory: Arc<dyn UserDirectory>,
    pub config: Arc<Config>,
}
