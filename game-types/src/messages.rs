use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameError, LobbyId, PlayerId};

/// Everything a client may send over the WebSocket. The socket only carries
/// change nudges; game data travels over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    Subscribe {
        lobby_id: LobbyId,
        player_id: PlayerId,
    },
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    Subscribed { lobby_id: LobbyId },
    /// Refetch the game view; something about the round changed.
    GameStateChanged { lobby_id: LobbyId },
    /// Refetch the lobby view; membership or settings changed.
    LobbyChanged { lobby_id: LobbyId },
    Error { error: GameError },
}
