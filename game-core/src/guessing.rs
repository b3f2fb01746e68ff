use game_types::{GameError, GuessType};

/// A validated placement guess: where does the show's premiere year fall
/// relative to the guesser's own timeline?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Before { year: i32 },
    Between { start: i32, end: i32 },
    After { year: i32 },
}

impl Guess {
    /// Validate the wire shape before anything touches the answer.
    /// `between` needs an ordered pair; `after` carries its bound in
    /// `y_year` and ignores `x_year`.
    pub fn parse(guess_type: GuessType, x_year: i32, y_year: Option<i32>) -> Result<Self, GameError> {
        match guess_type {
            GuessType::Before => Ok(Guess::Before { year: x_year }),
            GuessType::Between => match y_year {
                Some(end) if x_year < end => Ok(Guess::Between { start: x_year, end }),
                end => Err(GameError::InvalidBetweenBounds { start: x_year, end }),
            },
            GuessType::After => match y_year {
                Some(year) => Ok(Guess::After { year }),
                None => Err(GameError::MissingAfterBound),
            },
        }
    }

    /// Ties go to the guesser: every boundary comparison is inclusive.
    pub fn is_correct(&self, premiere_year: i32) -> bool {
        match *self {
            Guess::Before { year } => premiere_year <= year,
            Guess::Between { start, end } => start <= premiere_year && premiere_year <= end,
            Guess::After { year } => premiere_year >= year,
        }
    }
}
