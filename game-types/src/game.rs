use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameStateId, LobbyId, PlayerId, ShowId};

/// The per-lobby game aggregate. Exactly one row exists while a lobby is
/// playing; seats index into the lobby's seated players.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameState {
    pub id: GameStateId,
    pub lobby_id: LobbyId,
    pub round_number: i32,
    pub current_guesser_seat: i32,
    pub current_dj_seat: i32,
    pub current_attempt_seat: i32,
    pub show_id: Option<ShowId>,
    pub round_state: RoundState,
    pub revision: i32,
    pub updated_at: String, // ISO 8601 string
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    DjReady,  // DJ is cueing up the theme
    Guessing, // Theme is playing, guesser on the clock
    Revealed, // Round over, premiere year public
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GuessType {
    Before,
    Between,
    After,
}

impl RoundState {
    /// Storage form; also what goes over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::DjReady => "dj_ready",
            RoundState::Guessing => "guessing",
            RoundState::Revealed => "revealed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dj_ready" => Some(RoundState::DjReady),
            "guessing" => Some(RoundState::Guessing),
            "revealed" => Some(RoundState::Revealed),
            _ => None,
        }
    }
}

impl GuessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessType::Before => "before",
            GuessType::Between => "between",
            GuessType::After => "after",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "before" => Some(GuessType::Before),
            "between" => Some(GuessType::Between),
            "after" => Some(GuessType::After),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimelineEntry {
    pub id: uuid::Uuid,
    pub player_id: PlayerId,
    pub year: i32,
    pub created_at: String, // ISO 8601 string
}

/// Append-only audit row; one per evaluated guess.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Attempt {
    pub id: uuid::Uuid,
    pub lobby_id: LobbyId,
    pub round_number: i32,
    pub player_id: PlayerId,
    pub attempt_order: i32,
    pub guess_type: GuessType,
    pub x_year: i32,
    pub y_year: Option<i32>,
    pub is_correct: bool,
    pub created_at: String, // ISO 8601 string
}

/// What a submitted guess did to the round.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttemptOutcome {
    pub correct: bool,
    pub round_state: RoundState,
    pub game_finished: bool,
    /// Set once the round is revealed; hidden while guessing continues.
    pub premiere_year: Option<i32>,
}
