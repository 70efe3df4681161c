use actix_web::{web, App, HttpServer};
use marketplace_chat_service::{
    config, db, error, logging,
    presence::PresenceTracker,
    routes,
    services::{
        cipher::MessageCipher, listing_client::HttpListingResolver,
        user_directory::HttpUserDirectory,
    },
    state::AppState,
    store::postgres::PgMessageStore,
    websocket::{pubsub, RoomRegistry},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let pool = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;
    db::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| error::AppError::StartServer(format!("migrations: {e}")))?;

    let registry = RoomRegistry::new();

    // Cross-instance fan-out only runs when Redis is configured; without it
    // events reach the connections held by this process only.
    let redis = match cfg.redis_url.as_deref() {
        Some(url) => {
            let client = redis::Client::open(url)
                .map_err(|e| error::AppError::StartServer(format!("redis: {e}")))?;
            let listener_client = client.clone();
            let listener_registry = registry.clone();
            tokio::spawn(async move {
                if let Err(e) = pubsub::start_psub_listener(listener_client, listener_registry).await
                {
                    tracing::error!(error = %e, "redis pubsub listener failed");
                }
            });
            Some(client)
        }
        None => {
            tracing::info!("REDIS_URL not set, running single-instance");
            None
        }
    };

    let state = AppState {
        store: Arc::new(PgMessageStore::new(pool)),
        cipher: Arc::new(MessageCipher::new(cfg.message_secret.clone())),
        presence: Arc::new(PresenceTracker::new()),
        registry,
        redis,
        listings: Arc::new(HttpListingResolver::new(&cfg.listing_service_url)),
        directory: Arc::new(HttpUserDirectory::new(&cfg.user_service_url)),
        config: cfg.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting marketplace-chat-service");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure_routes)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("run: {e}")))
}
