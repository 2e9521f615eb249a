//! # WebSocket Handlers
//!
//! Chat socket endpoint.
//!
//! ## Endpoints
//!
//! - `GET /api/ws/chat?token=<jwt>` - real-time messaging connection
//!
//! The credential is checked before the upgrade; a bad, expired or missing token
//! gets a plain `401` and no session is ever created.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{ConnectInfo, Extension, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::chat::{ConnectionSession, EventRouter, Identity, IdentityVerifier, PresenceRegistry};

#[derive(Debug, Deserialize)]
pub struct ChatSocketParams {
    pub token: Option<String>,
}

/// WebSocket handler for real-time chat.
///
/// **Route**: `GET /api/ws/chat?token=<jwt>`
///
/// Frames in both directions are JSON text:
///
/// ```json
/// { "event": "send_message", "data": { "receiverId": 2, "content": "hi" } }
/// ```
///
/// # Example
///
/// ```javascript
/// const ws = new WebSocket(`ws://localhost:5000/api/ws/chat?token=${token}`);
/// ws.onopen = () => ws.send(JSON.stringify({ event: 'set_online' }));
/// ws.onmessage = (e) => console.log(JSON.parse(e.data));
/// ```
pub async fn chat_websocket(
    Query(params): Query<ChatSocketParams>,
    headers: HeaderMap,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    State(verifier): State<IdentityVerifier>,
    State(registry): State<PresenceRegistry>,
    State(router): State<EventRouter>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let client_ip = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| connect_info.map(|Extension(ConnectInfo(addr))| addr.ip().to_string()));

    info!(client_ip = ?client_ip, "[WS] CONNECT_ATTEMPT path=/api/ws/chat");

    let identity = match verifier.verify(params.token.as_deref()).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!(client_ip = ?client_ip, code = err.code(), "[WS] REJECTED {}", err);
            return err.into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(user_id = identity.user_id, "[WS] UPGRADE_REJECTED {}", rejection);
            return rejection.into_response();
        }
    };

    debug!(user_id = identity.user_id, "[WS] UPGRADE_START");
    ws.on_upgrade(move |socket| run_session(socket, identity, registry, router, client_ip))
        .into_response()
}

/// Drive one authenticated connection until the transport closes.
///
/// Outbound events are drained by a writer task. Inbound frames are handled
/// inline, one at a time, so events from the same connection keep their order.
/// If the registry drops the connection for falling behind, the writer ends
/// after the queued events and the session closes.
async fn run_session(
    socket: WebSocket,
    identity: Identity,
    registry: PresenceRegistry,
    router: EventRouter,
    client_ip: Option<String>,
) {
    let connection_start = Instant::now();
    let (mut session, mut events) = ConnectionSession::open(identity, &registry).await;
    let connection_id = session.id();
    let (mut sender, mut receiver) = socket.split();

    info!(connection_id = %connection_id, client_ip = ?client_ip, "[WS] CONNECTED");

    let mut send_task = tokio::spawn(async move {
        let mut sent: u64 = 0;
        while let Some(event) = events.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(connection_id = %connection_id, error = %e, "[WS] SERIALIZE_ERROR");
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!(connection_id = %connection_id, error = %e, sent, "[WS] SEND_ERROR");
                break;
            }
            sent += 1;
        }
        sent
    });

    let mut received: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    received += 1;
                    router.handle_frame(&session, text.as_str()).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.code.to_string())
                        .unwrap_or_else(|| "none".to_string());
                    info!(connection_id = %connection_id, reason = %reason, "[WS] CLOSE_RECEIVED");
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(connection_id = %connection_id, size = data.len(), "[WS] BINARY_IGNORED");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(connection_id = %connection_id, error = %e, "[WS] RECV_ERROR");
                    break;
                }
                None => break,
            }
        }
    }

    session.close(&registry).await;
    send_task.abort();

    let duration = connection_start.elapsed();
    info!(
        connection_id = %connection_id,
        duration_ms = duration.as_millis(),
        messages_received = received,
        "[WS] DISCONNECTED duration={:.2}s",
        duration.as_secs_f64()
    );
}
