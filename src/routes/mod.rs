use actix_web::{web, HttpResponse};

pub mod conversations;
pub mod messages;
pub mod presence;
pub mod wsroute;

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(wsroute::ws_handler)
        .service(
            web::scope("/api/v1")
                .route("/messages", web::post().to(messages::send_message))
                .route(
                    "/messages/read",
                    web::post().to(messages::mark_messages_read),
                )
                .route(
                    "/messages/thread/{user_a}/{user_b}",
                    web::get().to(messages::get_thread),
                )
                .route("/messages/inbox/{user_id}", web::get().to(messages::get_inbox))
                .route("/messages/sent/{user_id}", web::get().to(messages::get_sent))
                .route(
                    "/conversations/{user_id}",
                    web::get().to(conversations::list_conversations),
                )
                .route(
                    "/presence/online/{viewer_id}",
                    web::get().to(presence::list_online_users),
                ),
        );
}
