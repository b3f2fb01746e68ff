use game_types::{GameError, RoundState};

/// The things that move a round forward. States only ever advance
/// (`dj_ready` → `guessing` → `revealed`); a new round resets to `dj_ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    DjReady,
    CorrectGuess,
    RotationExhausted,
    NextRound,
}

impl RoundEvent {
    /// The state a round must be in for this event to apply.
    pub fn requires(self) -> RoundState {
        match self {
            RoundEvent::DjReady => RoundState::DjReady,
            RoundEvent::CorrectGuess | RoundEvent::RotationExhausted => RoundState::Guessing,
            RoundEvent::NextRound => RoundState::Revealed,
        }
    }

    /// The state the round lands in once the event applies.
    pub fn produces(self) -> RoundState {
        match self {
            RoundEvent::DjReady => RoundState::Guessing,
            RoundEvent::CorrectGuess | RoundEvent::RotationExhausted => RoundState::Revealed,
            RoundEvent::NextRound => RoundState::DjReady,
        }
    }
}

pub fn require_round_state(actual: RoundState, expected: RoundState) -> Result<(), GameError> {
    if actual == expected {
        Ok(())
    } else {
        Err(GameError::WrongRoundState { expected, actual })
    }
}

pub fn advance_round_state(current: RoundState, event: RoundEvent) -> Result<RoundState, GameError> {
    require_round_state(current, event.requires())?;
    Ok(event.produces())
}
