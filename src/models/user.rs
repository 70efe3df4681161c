use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile summary resolved through the user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
