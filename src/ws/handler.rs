use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

use crate::models::app_state::AppState;
use crate::ws::manager::Subscription;

/// Upgrade to a change-event stream for one profile. Events are the same
/// `{table, new}` payloads the REST API commits.
pub async fn profile_events_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(profile_id): Path<i64>,
) -> Response {
    let subscription = state.events.subscribe(profile_id);
    ws.on_upgrade(move |socket| handle_socket(socket, subscription))
}

/// Pump committed change events to the client until either side closes.
/// The subscription is dropped on every exit path, which unregisters it.
async fn handle_socket(socket: WebSocket, mut subscription: Subscription) {
    let profile_id = subscription.profile_id();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = subscription.next_event() => {
                let Some(event) = event else { break };
                let Ok(json) = serde_json::to_string(&event) else {
                    tracing::error!("Failed to serialize event for profile {}", profile_id);
                    continue;
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            message = receiver.next() => {
                match message {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Clients only listen on this channel
                    _ => {}
                }
            }
        }
    }

    tracing::info!("Event stream for profile {} closed", profile_id);
}
