//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::{ClientEvent, MessageDeletedPayload},
    ui::state::AppState,
    usecase::{
        AnnouncePresenceUseCase, ChatSubscriptionUseCase, ConnectParticipantUseCase,
        DisconnectParticipantUseCase, RelayEventUseCase, UseCaseError,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive pushed events
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection = ConnectParticipantUseCase::new(state.hub.clone())
        .execute(tx)
        .await;
    tracing::info!("Connection '{}' opened", connection);

    let state_clone = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => dispatch(&state_clone, connection, event).await,
                    Err(e) => {
                        tracing::warn!("Dropping malformed frame from '{}': {}", connection, e);
                    }
                },
                Message::Binary(bytes) => {
                    tracing::warn!(
                        "Dropping binary frame ({} bytes) from '{}'",
                        bytes.len(),
                        connection
                    );
                }
                Message::Ping(_) | Message::Pong(_) => {
                    tracing::debug!("Received ping/pong from '{}'", connection);
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection);
                    break;
                }
            }
        }
    });

    // Spawn a task to forward pushed events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Some(departure) = DisconnectParticipantUseCase::new(state.hub.clone())
        .execute(connection)
        .await
    {
        tracing::info!(
            "Connection '{}' closed (user: {:?}, rooms left: {})",
            connection,
            departure.user_id.map(|id| id.value()),
            departure.rooms_left
        );
    }
}

/// Apply one inbound event. Failures are logged and never sent back.
async fn dispatch(state: &AppState, connection: ConnectionId, event: ClientEvent) {
    let name = event.name();
    let result = match event {
        ClientEvent::UserOnline(user_id) => {
            AnnouncePresenceUseCase::new(state.users.clone(), state.hub.clone())
                .execute(connection, user_id)
                .await
                .map(|_| ())
        }
        ClientEvent::JoinChat(chat_id) => {
            ChatSubscriptionUseCase::new(state.chats.clone(), state.hub.clone())
                .join(connection, chat_id)
                .await
                .map(|_| ())
        }
        ClientEvent::LeaveChat(chat_id) => {
            ChatSubscriptionUseCase::new(state.chats.clone(), state.hub.clone())
                .leave(connection, chat_id)
                .await;
            Ok(())
        }
        ClientEvent::SendMessage(message) => relay(state)
            .relay_created(connection, message.chat_id, message.id)
            .await
            .map(|_| ()),
        ClientEvent::DeleteMessage(MessageDeletedPayload {
            chat_id,
            message_id,
        }) => relay(state)
            .relay_deleted(connection, chat_id, message_id)
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => tracing::debug!("Handled {} from '{}'", name, connection),
        Err(UseCaseError::Internal(detail)) => {
            tracing::error!("Failed to handle {} from '{}': {}", name, connection, detail);
        }
        Err(e) => tracing::warn!("Dropped {} from '{}': {}", name, connection, e),
    }
}

fn relay(state: &AppState) -> RelayEventUseCase {
    RelayEventUseCase::new(
        state.chats.clone(),
        state.messages.clone(),
        state.hub.clone(),
    )
}
