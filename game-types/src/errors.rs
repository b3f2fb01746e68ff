use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::RoundState;

/// Every way a game operation can be refused. Serialized as-is into HTTP
/// error bodies and WebSocket error frames.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    // Authorization
    #[error("only the host can do that")]
    NotHost,
    #[error("it is seat {current_seat}'s turn to guess")]
    NotYourTurn { current_seat: i32 },
    #[error("only the current DJ can do that")]
    NotDj,

    // Preconditions
    #[error("set a target score before starting")]
    TargetScoreNotSet,
    #[error("need at least 2 players, found {found}")]
    NotEnoughPlayers { found: usize },
    #[error("the show catalog is empty")]
    NoShowsAvailable,
    #[error("need {needed} distinct premiere years to seed timelines, found {found}")]
    NotEnoughSeedYears { needed: usize, found: usize },
    #[error("the game has not started")]
    GameNotStarted,
    #[error("the game is not in progress")]
    GameNotInProgress,
    #[error("the game has already started")]
    GameAlreadyStarted,
    #[error("no show is selected for this round")]
    NoShowSelected,
    #[error("target score must be at least 1, got {target_score}")]
    InvalidTargetScore { target_score: i32 },
    #[error("could not find a free join code")]
    JoinCodeExhausted,

    // Guess validation
    #[error("invalid between guess: the later bound must exceed {start}")]
    InvalidBetweenBounds { start: i32, end: Option<i32> },
    #[error("an 'after' guess needs its year bound")]
    MissingAfterBound,
    #[error("round is {actual:?}, expected {expected:?}")]
    WrongRoundState {
        expected: RoundState,
        actual: RoundState,
    },

    // Not found
    #[error("lobby {lobby_id} not found")]
    LobbyNotFound { lobby_id: String },
    #[error("player {player_id} not found")]
    PlayerNotFound { player_id: String },
    #[error("player {player_id} has no seat in this game")]
    PlayerNotSeated { player_id: String },
    #[error("show {show_id} not found")]
    ShowNotFound { show_id: String },

    // Concurrency
    #[error("the game state changed underneath this request, refetch and retry")]
    StateConflict,

    // Infrastructure
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl GameError {
    /// Wrap any storage-layer failure without leaking its type upward.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        GameError::Storage {
            message: err.to_string(),
        }
    }
}
