use crate::error::AppResult;
use crate::models::message::MessageView;
use crate::services::message_service::MessageService;
use crate::state::AppState;
use actix_web::web;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub listing_id: Option<Uuid>,
}

pub async fn send_message(
    state: web::Data<AppState>,
    body: web::Json<SendMessageRequest>,
) -> AppResult<web::Json<MessageView>> {
    let view = MessageService::send(
        &state,
        body.sender_id,
        body.receiver_id,
        &body.content,
        body.listing_id,
    )
    .await?;
    Ok(web::Json(view))
}

pub async fn get_thread(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<web::Json<Vec<MessageView>>> {
    let (user_a, user_b) = path.into_inner();
    let thread = MessageService::fetch_thread(&state, user_a, user_b).await?;
    Ok(web::Json(thread))
}

pub async fn get_inbox(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<web::Json<Vec<MessageView>>> {
    let inbox = MessageService::fetch_inbox(&state, path.into_inner()).await?;
    Ok(web::Json(inbox))
}

pub async fn get_sent(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<web::Json<Vec<MessageView>>> {
    let sent = MessageService::fetch_sent(&state, path.into_inner()).await?;
    Ok(web::Json(sent))
}

#[derive(Deserialize)]
pub struct MarkReadRequest {
    pub viewer_id: Uuid,
    pub counterpart_id: Uuid,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub modified_count: u64,
}

pub async fn mark_messages_read(
    state: web::Data<AppState>,
    body: web::Json<MarkReadRequest>,
) -> AppResult<web::Json<MarkReadResponse>> {
    let modified_count =
        MessageService::mark_read(&state, body.viewer_id, body.counterpart_id).await?;
    Ok(web::Json(MarkReadResponse { modified_count }))
}
