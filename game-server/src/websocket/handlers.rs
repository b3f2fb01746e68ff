use std::sync::Arc;
use tracing::info;

use crate::game_service::GameService;
use crate::websocket::connection::{ConnectionId, ConnectionManager};
use game_types::{ClientMessage, GameError, LobbyId, PlayerId, ServerMessage};

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    game_service: Arc<GameService>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        game_service: Arc<GameService>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            game_service,
        }
    }

    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager.update_activity(self.connection_id);

        match message {
            ClientMessage::Subscribe {
                lobby_id,
                player_id,
            } => self.handle_subscribe(lobby_id, player_id).await,
            ClientMessage::Heartbeat => Ok(()),
        }
    }

    /// Attach this socket to a lobby's update feed. The lobby must exist;
    /// the player id is recorded as-is and only used for log correlation.
    async fn handle_subscribe(
        &self,
        lobby_id: LobbyId,
        player_id: PlayerId,
    ) -> Result<(), String> {
        match self.game_service.lobby_exists(lobby_id).await {
            Ok(true) => {
                self.connection_manager
                    .subscribe(self.connection_id, lobby_id, player_id)?;
                info!(
                    "Connection {} subscribed to lobby {} as player {}",
                    self.connection_id, lobby_id, player_id
                );
                self.send_message(ServerMessage::Subscribed { lobby_id })
            }
            Ok(false) => self.send_message(ServerMessage::Error {
                error: GameError::LobbyNotFound {
                    lobby_id: lobby_id.to_string(),
                },
            }),
            Err(error) => self.send_message(ServerMessage::Error { error }),
        }
    }

    fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
    }
}
