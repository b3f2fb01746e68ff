use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{LobbyId, PlayerId};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Lobby {
    pub id: LobbyId,
    pub join_code: String,
    pub host_player_id: Option<PlayerId>,
    pub status: LobbyStatus,
    pub target_score: Option<i32>,
    pub created_at: String, // ISO 8601 string
    pub updated_at: String, // ISO 8601 string
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Waiting,  // Players can still join
    Playing,  // Game in progress
    Finished, // Someone reached the target score
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub lobby_id: LobbyId,
    pub name: String,
    pub seat: Option<i32>, // None until a game starts
    pub created_at: String, // ISO 8601 string
}

impl Lobby {
    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host_player_id == Some(player_id)
    }
}

impl LobbyStatus {
    /// Storage form; also what goes over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LobbyStatus::Waiting => "waiting",
            LobbyStatus::Playing => "playing",
            LobbyStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(LobbyStatus::Waiting),
            "playing" => Some(LobbyStatus::Playing),
            "finished" => Some(LobbyStatus::Finished),
            _ => None,
        }
    }
}
