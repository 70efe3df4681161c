pub mod cipher;
pub mod conversation_service;
pub mod listing_client;
pub mod message_service;
pub mod user_directory;
