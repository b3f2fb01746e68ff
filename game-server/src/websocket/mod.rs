use futures_util::{SinkExt, StreamExt};
use serde_json;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::game_service::GameService;
use game_core::{GameEvent, GameEventHandler};
use game_types::{ClientMessage, ServerMessage};

pub mod connection;
pub mod handlers;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    game_service: Arc<GameService>,
) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();

    // Create connection and get receiver for outgoing messages
    let message_receiver = connection_manager.create_connection(connection_id);

    let message_handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        game_service.clone(),
    );

    // Handle incoming messages
    let incoming_handler = {
        let message_handler = message_handler.clone();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if let Err(e) = handle_message(msg, &message_handler).await {
                            error!("Error handling message for {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    // Handle outgoing messages
    let outgoing_handler = {
        async move {
            let mut receiver = message_receiver;

            while let Some(message) = receiver.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize message: {:?}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sender.send(Message::text(json)).await {
                    warn!("Failed to send message to {}: {:?}", connection_id, e);
                    break;
                }
            }
        }
    };

    // Run both handlers concurrently
    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    // Cleanup connection
    info!("Connection {} disconnected", connection_id);
    connection_manager.remove_connection(connection_id);
}

async fn handle_message(
    msg: Message,
    message_handler: &MessageHandler,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Only handle text messages
    if !msg.is_text() {
        return Ok(());
    }

    let text = msg.to_str().map_err(|_| "Invalid text message")?;

    let client_message: ClientMessage =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON message: {}", e))?;

    message_handler
        .handle_message(client_message)
        .await
        .map_err(|e| format!("Message handling error: {}", e))?;

    Ok(())
}

/// Turns service events into push notifications for every socket
/// following the affected lobby.
pub struct WsEventHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl WsEventHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }
}

impl GameEventHandler for WsEventHandler {
    fn handle_event(&self, event: GameEvent) {
        let lobby_id = event.lobby_id();
        let message = match event {
            GameEvent::GameStateChanged { .. } => ServerMessage::GameStateChanged { lobby_id },
            GameEvent::LobbyChanged { .. } => ServerMessage::LobbyChanged { lobby_id },
        };

        self.connection_manager.broadcast_to_lobby(lobby_id, message);
    }
}
