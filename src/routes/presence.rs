use crate::error::AppResult;
use crate::models::user::UserProfile;
use crate::services::message_service::MessageService;
use crate::state::AppState;
use actix_web::web;
use uuid::Uuid;

pub async fn list_online_users(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<web::Json<Vec<UserProfile>>> {
    let profiles = MessageService::list_online_users(&state, path.into_inner()).await?;
    Ok(web::Json(profiles))
}
