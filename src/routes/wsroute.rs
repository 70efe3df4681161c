//! Persistent client connection.
//!
//! One actor session per WebSocket connection. The connecting client
//! supplies its user id as a query parameter; identity verification happens
//! out of band and the verified id is trusted here. On connect the session
//! joins the user's room, registers presence (broadcasting the online
//! transition when this is the first connection) and pushes the bulk
//! presence snapshot. Typing indicators are relayed to the target room and
//! never persisted.

use crate::presence::PresenceTransition;
use crate::state::AppState;
use crate::websocket::events::{publish_to_all, publish_to_user, ChatEvent};
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::SubscriberId;
use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub user_id: Uuid,
}

// Payload pushed from the room registry into this connection
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct PushText(String);

struct WsSession {
    user_id: Uuid,
    connection_id: Uuid,
    subscriber_id: SubscriberId,
    state: AppState,
    hb: Instant,
}

impl WsSession {
    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(user_id = %act.user_id, "websocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn relay_typing(&self, to: Uuid, stop: bool) {
        let state = self.state.clone();
        let from = self.user_id;
        actix::spawn(async move {
            let event = if stop {
                ChatEvent::StopTyping { from }
            } else {
                ChatEvent::Typing { from }
            };
            publish_to_user(&state, to, &event).await;
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "websocket session started");
        self.hb(ctx);

        // Bulk snapshot for this connection only, before any transition it
        // may itself cause is folded in.
        let snapshot = self.state.presence.snapshot();

        let transition = self
            .state
            .presence
            .register(self.user_id, self.connection_id);

        ctx.text(ChatEvent::PresenceBulk { user_ids: snapshot }.to_payload());

        if transition == Some(PresenceTransition::Online) {
            let state = self.state.clone();
            let user_id = self.user_id;
            actix::spawn(async move {
                publish_to_all(
                    &state,
                    &ChatEvent::PresenceUpdate {
                        user_id,
                        online: true,
                    },
                )
                .await;
            });
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "websocket session stopped");

        let transition = self
            .state
            .presence
            .unregister(self.user_id, self.connection_id);

        let state = self.state.clone();
        let user_id = self.user_id;
        let subscriber_id = self.subscriber_id;
        actix::spawn(async move {
            state.registry.leave(user_id, subscriber_id).await;
            if transition == Some(PresenceTransition::Offline) {
                publish_to_all(
                    &state,
                    &ChatEvent::PresenceUpdate {
                        user_id,
                        online: false,
                    },
                )
                .await;
            }
        });
    }
}

impl Handler<PushText> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: PushText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(WsInboundEvent::Typing { to }) => self.relay_typing(to, false),
                Ok(WsInboundEvent::StopTyping { to }) => self.relay_typing(to, true),
                Err(e) => {
                    tracing::warn!(user_id = %self.user_id, error = %e, "unparseable ws event");
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!("binary websocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(?reason, "websocket close received");
                ctx.stop();
            }
            _ => {}
        }
    }
}

#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    query: web::Query<WsParams>,
) -> Result<HttpResponse, Error> {
    let params = query.into_inner();
    let connection_id = Uuid::new_v4();

    let (subscriber_id, mut rx) = state.registry.join(params.user_id).await;

    let session = WsSession {
        user_id: params.user_id,
        connection_id,
        subscriber_id,
        state: state.as_ref().clone(),
        hb: Instant::now(),
    };

    let (addr, resp) = ws::WsResponseBuilder::new(session, &req, stream).start_with_addr()?;

    // Bridge the room registry channel into the actor mailbox; ends when the
    // room sender is dropped on leave.
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            addr.do_send(PushText(payload));
        }
    });

    Ok(resp)
}
