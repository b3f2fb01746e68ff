/// Roles for one round. The attempt seat starts at the guesser and walks
/// clockwise through misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRoles {
    pub dj_seat: i32,
    pub guesser_seat: i32,
}

/// Where the turn goes after an incorrect guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The clockwise neighbor takes over the same round.
    NextGuesser { seat: i32 },
    /// The rotation reached the DJ's seat; nobody placed the year.
    DjDefended,
}

pub struct TurnEngine;

impl TurnEngine {
    pub fn clockwise_successor(seat: i32, player_count: i32) -> i32 {
        (seat + 1) % player_count
    }

    /// Roles for round 1: seat 0 opens, their clockwise neighbor is the DJ.
    pub fn opening_roles(player_count: i32) -> RoundRoles {
        let guesser_seat = 0;
        RoundRoles {
            dj_seat: Self::clockwise_successor(guesser_seat, player_count),
            guesser_seat,
        }
    }

    /// Advance the attempt seat after a miss. The round ends the moment the
    /// successor would be the DJ; the DJ never guesses their own clue.
    pub fn rotate_after_miss(attempt_seat: i32, dj_seat: i32, player_count: i32) -> RotationOutcome {
        let next = Self::clockwise_successor(attempt_seat, player_count);
        if next == dj_seat {
            RotationOutcome::DjDefended
        } else {
            RotationOutcome::NextGuesser { seat: next }
        }
    }

    /// Roles for the round after a reveal. The DJ baton goes to whoever made
    /// the round's final attempt (not necessarily who opened it), and the
    /// new DJ's clockwise neighbor opens the next round.
    pub fn next_round_roles(last_attempt_seat: i32, player_count: i32) -> RoundRoles {
        RoundRoles {
            dj_seat: last_attempt_seat,
            guesser_seat: Self::clockwise_successor(last_attempt_seat, player_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clockwise_successor_wraps() {
        assert_eq!(TurnEngine::clockwise_successor(0, 4), 1);
        assert_eq!(TurnEngine::clockwise_successor(3, 4), 0);
        assert_eq!(TurnEngine::clockwise_successor(1, 2), 0);
    }

    #[test]
    fn test_opening_roles() {
        for n in 2..=6 {
            let roles = TurnEngine::opening_roles(n);
            assert_eq!(roles.guesser_seat, 0);
            assert_eq!(roles.dj_seat, 1);
        }
    }

    #[test]
    fn test_first_miss_can_land_on_the_dj() {
        // 4 players, DJ=1, opener=0: seat 0's successor is the DJ, so one
        // miss ends the round with no timeline change.
        assert_eq!(
            TurnEngine::rotate_after_miss(0, 1, 4),
            RotationOutcome::DjDefended
        );
    }

    #[test]
    fn test_rotation_visits_every_guesser_before_the_dj_defends() {
        // 4 players, DJ=2, opener=3: misses walk 3 -> 0 -> 1, then the
        // successor of 1 is the DJ.
        assert_eq!(
            TurnEngine::rotate_after_miss(3, 2, 4),
            RotationOutcome::NextGuesser { seat: 0 }
        );
        assert_eq!(
            TurnEngine::rotate_after_miss(0, 2, 4),
            RotationOutcome::NextGuesser { seat: 1 }
        );
        assert_eq!(
            TurnEngine::rotate_after_miss(1, 2, 4),
            RotationOutcome::DjDefended
        );
    }

    #[test]
    fn test_two_player_round_is_one_shot() {
        // Heads-up the single guesser gets exactly one attempt.
        assert_eq!(
            TurnEngine::rotate_after_miss(0, 1, 2),
            RotationOutcome::DjDefended
        );
    }

    #[test]
    fn test_next_round_roles_follow_the_last_guesser() {
        // Whoever actually made the final attempt becomes the DJ, even when
        // the round opened at a different seat.
        let roles = TurnEngine::next_round_roles(2, 4);
        assert_eq!(roles.dj_seat, 2);
        assert_eq!(roles.guesser_seat, 3);

        let wrapped = TurnEngine::next_round_roles(3, 4);
        assert_eq!(wrapped.dj_seat, 3);
        assert_eq!(wrapped.guesser_seat, 0);
    }
}
