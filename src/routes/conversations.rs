use crate::error::AppResult;
use crate::models::conversation::ConversationSummary;
use crate::services::conversation_service::ConversationService;
use crate::state::AppState;
use actix_web::web;
use uuid::Uuid;

pub async fn list_conversations(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<web::Json<Vec<ConversationSummary>>> {
    let summaries = ConversationService::list_conversations(&state, path.into_inner()).await?;
    Ok(web::Json(summaries))
}
