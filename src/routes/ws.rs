//! Admin realtime feed over WebSocket.
//!
//! DESIGN
//! ======
//! The socket is one-way: the server forwards every [`AdminEvent`] published
//! on the [`Notifier`](crate::services::notify::Notifier) as a JSON text
//! message. Client text is ignored; a close or read error ends the loop.
//!
//! Browsers cannot attach cookies to a WebSocket handshake from every
//! origin, so the upgrade authenticates with a single-use ticket minted by
//! `POST /api/auth/ws-ticket`. The ticket's owner must still be an admin at
//! upgrade time.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::notify::AdminEvent;
use crate::services::session::{self, Role};
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(ticket) = params.get("ticket") else {
        return (StatusCode::UNAUTHORIZED, "ticket required").into_response();
    };

    let user_id = match session::consume_ws_ticket(&state.pool, ticket).await {
        Ok(Some(uid)) => uid,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "invalid or expired ticket").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ws ticket validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "ticket validation error").into_response();
        }
    };

    match session::load_role(&state.pool, user_id).await {
        Ok(Some(Role::Admin)) => {}
        Ok(_) => return (StatusCode::FORBIDDEN, "admin only").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ws role lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "ticket validation error").into_response();
        }
    }

    ws.on_upgrade(move |socket| run_ws(socket, state, user_id))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: Uuid) {
    let mut events = state.notifier.subscribe();
    info!(%user_id, "ws: admin connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%user_id, skipped, "ws: admin feed lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!(%user_id, "ws: admin disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &AdminEvent) -> Result<(), axum::Error> {
    let Ok(text) = serde_json::to_string(event) else {
        warn!(kind = ?event.kind, "ws: failed to encode admin event");
        return Ok(());
    };
    socket.send(Message::Text(text.into())).await
}
