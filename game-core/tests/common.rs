use game_core::{
    advance_round_state, require_round_state, Guess, RotationOutcome, RoundEvent, TurnEngine,
};
use game_types::{GameError, GuessType, RoundState};

/// One guessing table driven purely through the core rules, with no storage
/// or transport involved. Holds exactly the fields the server persists.
pub struct Table {
    pub player_count: i32,
    pub round_number: i32,
    pub dj_seat: i32,
    pub guesser_seat: i32,
    pub attempt_seat: i32,
    pub state: RoundState,
}

impl Table {
    /// A freshly started game: round one roles, DJ cueing up the theme.
    pub fn open(player_count: i32) -> Self {
        let roles = TurnEngine::opening_roles(player_count);
        Table {
            player_count,
            round_number: 1,
            dj_seat: roles.dj_seat,
            guesser_seat: roles.guesser_seat,
            attempt_seat: roles.guesser_seat,
            state: RoundState::DjReady,
        }
    }

    pub fn dj_ready(&mut self) -> Result<(), GameError> {
        self.state = advance_round_state(self.state, RoundEvent::DjReady)?;
        Ok(())
    }

    /// Evaluate one guess against the answer and move the table the way a
    /// round moves. Returns whether the guess placed the year.
    pub fn guess(
        &mut self,
        guess_type: GuessType,
        x_year: i32,
        y_year: Option<i32>,
        premiere_year: i32,
    ) -> Result<bool, GameError> {
        require_round_state(self.state, RoundState::Guessing)?;
        let guess = Guess::parse(guess_type, x_year, y_year)?;

        if guess.is_correct(premiere_year) {
            self.state = advance_round_state(self.state, RoundEvent::CorrectGuess)?;
            return Ok(true);
        }

        match TurnEngine::rotate_after_miss(self.attempt_seat, self.dj_seat, self.player_count) {
            RotationOutcome::NextGuesser { seat } => {
                self.attempt_seat = seat;
            }
            RotationOutcome::DjDefended => {
                self.state = advance_round_state(self.state, RoundEvent::RotationExhausted)?;
            }
        }
        Ok(false)
    }

    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.state = advance_round_state(self.state, RoundEvent::NextRound)?;
        let roles = TurnEngine::next_round_roles(self.attempt_seat, self.player_count);
        self.round_number += 1;
        self.dj_seat = roles.dj_seat;
        self.guesser_seat = roles.guesser_seat;
        self.attempt_seat = roles.guesser_seat;
        Ok(())
    }
}

/// A `before` guess one year short of the answer: always a miss.
pub fn narrow_miss(table: &mut Table, answer: i32) -> bool {
    table
        .guess(GuessType::Before, answer - 1, None, answer)
        .expect("a well-formed miss should evaluate cleanly")
}

/// A `between` guess hugging the answer on both sides: always correct.
pub fn exact_hit(table: &mut Table, answer: i32) -> bool {
    table
        .guess(GuessType::Between, answer - 1, Some(answer + 1), answer)
        .expect("a well-formed hit should evaluate cleanly")
}

/// Drives a full round in which nobody places the year. Returns how many
/// misses it took to exhaust the rotation.
pub fn play_defended_round(table: &mut Table, answer: i32) -> usize {
    table.dj_ready().expect("the DJ should be able to open the round");
    let mut misses = 0;
    while table.state == RoundState::Guessing {
        assert!(!narrow_miss(table, answer));
        misses += 1;
    }
    misses
}

/// Asserts the table's three role seats at once.
pub fn assert_roles(table: &Table, dj_seat: i32, guesser_seat: i32, attempt_seat: i32) {
    assert_eq!(table.dj_seat, dj_seat, "DJ seat");
    assert_eq!(table.guesser_seat, guesser_seat, "guesser seat");
    assert_eq!(table.attempt_seat, attempt_seat, "attempt seat");
}
