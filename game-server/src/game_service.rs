use std::sync::Arc;

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};
use uuid::Uuid;

use game_core::{
    GameEvent, GameEventBus, GameEventHandler, Guess, RotationOutcome, RoundEvent, SeedingPolicy,
    TurnEngine, advance_round_state, assign_seats, draw_seed_years, require_round_state,
};
use game_persistence::repositories::{
    AttemptRepository, GameStateChanges, GameStateRepository, GuardedUpdate, LobbyRepository,
    NewAttempt, PlayerRepository, RoundShowRepository, ShowRepository, TimelineRepository,
};
use game_types::{
    AttemptOutcome, GameError, GameState, GameView, GuessType, Lobby, LobbyStatus, LobbyView,
    Player, PlayerSummary, PlayerTimeline, RoundState, ShowView,
};

const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const JOIN_CODE_LENGTH: usize = 6;
const JOIN_CODE_ATTEMPTS: usize = 10;

/// Generate a 6-character join code from A–Z and 0–9 using the OS RNG.
/// Uniqueness is the caller's problem; this only draws.
fn generate_join_code() -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..JOIN_CODE_ALPHABET.len());

    let mut code = String::with_capacity(JOIN_CODE_LENGTH);
    for _ in 0..JOIN_CODE_LENGTH {
        code.push(JOIN_CODE_ALPHABET[dist.sample(&mut rng)] as char);
    }
    code
}

/// Every rule of the game lives behind these methods. Repositories do the
/// storage, `game_core` does the arithmetic; this layer sequences them and
/// publishes a change event per successful mutation.
pub struct GameService {
    lobbies: LobbyRepository,
    players: PlayerRepository,
    shows: ShowRepository,
    game_states: GameStateRepository,
    timelines: TimelineRepository,
    attempts: AttemptRepository,
    round_shows: RoundShowRepository,
    events: GameEventBus,
    seeding_policy: SeedingPolicy,
}

impl GameService {
    pub fn new(db: DatabaseConnection, seeding_policy: SeedingPolicy) -> Self {
        Self {
            lobbies: LobbyRepository::new(db.clone()),
            players: PlayerRepository::new(db.clone()),
            shows: ShowRepository::new(db.clone()),
            game_states: GameStateRepository::new(db.clone()),
            timelines: TimelineRepository::new(db.clone()),
            attempts: AttemptRepository::new(db.clone()),
            round_shows: RoundShowRepository::new(db),
            events: GameEventBus::new(),
            seeding_policy,
        }
    }

    /// Handlers must be registered before the service is shared; the bus is
    /// append-only after that.
    pub fn add_event_handler(&mut self, handler: Arc<dyn GameEventHandler>) {
        self.events.add_handler(handler);
    }

    // ---- Lobby lifecycle ----

    pub async fn create_lobby(&self, host_name: &str) -> Result<(LobbyView, Player), GameError> {
        let lobby = self.create_lobby_with_fresh_code().await?;

        let host = match self.players.create(lobby.id, host_name).await {
            Ok(host) => host,
            Err(err) => {
                // Surface the original failure, not the rollback's
                if let Err(cleanup) = self.lobbies.delete(lobby.id).await {
                    error!(lobby_id = %lobby.id, error = %cleanup, "Failed to roll back half-created lobby");
                }
                return Err(GameError::storage(err));
            }
        };

        self.lobbies
            .set_host(lobby.id, host.id)
            .await
            .map_err(GameError::storage)?;

        info!(lobby_id = %lobby.id, join_code = %lobby.join_code, "Lobby created");
        self.events.publish(GameEvent::LobbyChanged { lobby_id: lobby.id });

        let view = self.lobby_view_by_id(lobby.id).await?;
        Ok((view, host))
    }

    async fn create_lobby_with_fresh_code(&self) -> Result<Lobby, GameError> {
        for attempt in 0..JOIN_CODE_ATTEMPTS {
            let code = generate_join_code();

            let taken = self
                .lobbies
                .find_by_join_code(&code)
                .await
                .map_err(GameError::storage)?;
            if taken.is_some() {
                warn!(attempt, "Join code collision, drawing again");
                continue;
            }

            return self.lobbies.create(&code).await.map_err(GameError::storage);
        }

        Err(GameError::JoinCodeExhausted)
    }

    pub async fn join_lobby(
        &self,
        join_code: &str,
        name: &str,
    ) -> Result<(LobbyView, Player), GameError> {
        let code = join_code.trim().to_uppercase();
        let lobby = self
            .lobbies
            .find_by_join_code(&code)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::LobbyNotFound { lobby_id: code })?;

        if lobby.status != LobbyStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        let player = self
            .players
            .create(lobby.id, name)
            .await
            .map_err(GameError::storage)?;

        info!(lobby_id = %lobby.id, player_id = %player.id, "Player joined lobby");
        self.events.publish(GameEvent::LobbyChanged { lobby_id: lobby.id });

        let view = self.lobby_view_by_id(lobby.id).await?;
        Ok((view, player))
    }

    pub async fn set_target_score(
        &self,
        lobby_id: Uuid,
        requesting_player_id: Uuid,
        target_score: i32,
    ) -> Result<LobbyView, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        Self::require_host(&lobby, requesting_player_id)?;

        if lobby.status != LobbyStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if target_score < 1 {
            return Err(GameError::InvalidTargetScore { target_score });
        }

        self.lobbies
            .set_target_score(lobby_id, target_score)
            .await
            .map_err(GameError::storage)?;

        info!(lobby_id = %lobby_id, target_score, "Target score set");
        self.events.publish(GameEvent::LobbyChanged { lobby_id });

        self.lobby_view_by_id(lobby_id).await
    }

    // ---- Game progression ----

    /// Deal a fresh game. Also the restart path: starting over from a
    /// finished (or still-waiting) lobby wipes the previous game's rows, but
    /// only once every precondition has passed, so a refused restart leaves
    /// the old game readable.
    pub async fn start_game(
        &self,
        lobby_id: Uuid,
        requesting_player_id: Uuid,
    ) -> Result<GameView, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        Self::require_host(&lobby, requesting_player_id)?;

        if lobby.status == LobbyStatus::Playing {
            return Err(GameError::GameAlreadyStarted);
        }
        if lobby.target_score.is_none() {
            return Err(GameError::TargetScoreNotSet);
        }

        let players = self
            .players
            .list_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers {
                found: players.len(),
            });
        }
        let player_ids: Vec<Uuid> = players.iter().map(|p| p.id).collect();

        let distinct_years = self
            .shows
            .distinct_premiere_years()
            .await
            .map_err(GameError::storage)?;

        // Draws are pure, so they can fail before anything is purged
        let (seat_assignments, seed_assignments) = {
            let mut rng = rand::thread_rng();
            let seats = assign_seats(&player_ids, &mut rng);
            let seeds =
                draw_seed_years(&distinct_years, &player_ids, self.seeding_policy, &mut rng)?;
            (seats, seeds)
        };

        let show = self
            .shows
            .random_show(&[])
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::NoShowsAvailable)?;

        self.timelines
            .delete_for_players(&player_ids)
            .await
            .map_err(GameError::storage)?;
        self.attempts
            .delete_for_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        self.round_shows
            .delete_for_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        self.game_states
            .delete_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;

        self.players
            .set_seats(&seat_assignments)
            .await
            .map_err(GameError::storage)?;
        self.timelines
            .seed(&seed_assignments)
            .await
            .map_err(GameError::storage)?;

        let roles = TurnEngine::opening_roles(players.len() as i32);
        let state = self
            .game_states
            .create_initial(lobby_id, roles.guesser_seat, roles.dj_seat, show.id)
            .await
            .map_err(GameError::storage)?;
        self.round_shows
            .record(lobby_id, state.round_number, show.id)
            .await
            .map_err(GameError::storage)?;

        self.lobbies
            .set_status(lobby_id, LobbyStatus::Playing)
            .await
            .map_err(GameError::storage)?;

        info!(
            lobby_id = %lobby_id,
            players = players.len(),
            dj_seat = roles.dj_seat,
            "Game started"
        );
        self.events.publish(GameEvent::LobbyChanged { lobby_id });
        self.events.publish(GameEvent::GameStateChanged { lobby_id });

        self.game_view(lobby_id, requesting_player_id).await
    }

    /// The DJ confirming the theme is playing; opens the round for guesses.
    pub async fn mark_dj_ready(
        &self,
        lobby_id: Uuid,
        player_id: Uuid,
    ) -> Result<GameState, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        if lobby.status != LobbyStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }

        let state = self.require_game_state(lobby_id).await?;
        let player = self.require_member(lobby_id, player_id).await?;
        if Self::require_seat(&player)? != state.current_dj_seat {
            return Err(GameError::NotDj);
        }

        let next = advance_round_state(state.round_state, RoundEvent::DjReady)?;
        let updated = self
            .apply_state_changes(
                lobby_id,
                state.revision,
                GameStateChanges {
                    round_state: Some(next),
                    ..Default::default()
                },
            )
            .await?;

        info!(lobby_id = %lobby_id, round = updated.round_number, "DJ started the round");
        self.events.publish(GameEvent::GameStateChanged { lobby_id });
        Ok(updated)
    }

    /// One guess from the player whose turn it is. Authorization and shape
    /// problems reject the call before anything is written; an evaluated
    /// guess always leaves exactly one attempt row behind.
    pub async fn submit_attempt(
        &self,
        lobby_id: Uuid,
        player_id: Uuid,
        guess_type: GuessType,
        x_year: i32,
        y_year: Option<i32>,
    ) -> Result<AttemptOutcome, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        if lobby.status != LobbyStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }
        let target_score = lobby.target_score.ok_or(GameError::TargetScoreNotSet)?;

        let state = self.require_game_state(lobby_id).await?;
        require_round_state(state.round_state, RoundState::Guessing)?;

        let player = self.require_member(lobby_id, player_id).await?;
        let seat = Self::require_seat(&player)?;
        if seat != state.current_attempt_seat {
            return Err(GameError::NotYourTurn {
                current_seat: state.current_attempt_seat,
            });
        }

        let show_id = state.show_id.ok_or(GameError::NoShowSelected)?;
        let show = self
            .shows
            .find_by_id(show_id)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::ShowNotFound {
                show_id: show_id.to_string(),
            })?;

        let guess = Guess::parse(guess_type, x_year, y_year)?;
        let correct = guess.is_correct(show.premiere_year);

        let seated = self
            .players
            .list_seated_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        let player_count = seated.len() as i32;

        let changes = if correct {
            GameStateChanges {
                round_state: Some(advance_round_state(
                    state.round_state,
                    RoundEvent::CorrectGuess,
                )?),
                ..Default::default()
            }
        } else {
            match TurnEngine::rotate_after_miss(seat, state.current_dj_seat, player_count) {
                RotationOutcome::NextGuesser { seat: next_seat } => GameStateChanges {
                    current_attempt_seat: Some(next_seat),
                    ..Default::default()
                },
                RotationOutcome::DjDefended => GameStateChanges {
                    round_state: Some(advance_round_state(
                        state.round_state,
                        RoundEvent::RotationExhausted,
                    )?),
                    ..Default::default()
                },
            }
        };

        let attempt_order = self
            .attempts
            .count_for_round(lobby_id, state.round_number)
            .await
            .map_err(GameError::storage)? as i32;

        // The revision guard claims the turn; a losing concurrent submitter
        // bounces here and leaves no attempt row.
        let updated = self
            .apply_state_changes(lobby_id, state.revision, changes)
            .await?;

        self.attempts
            .append(NewAttempt {
                lobby_id,
                round_number: state.round_number,
                player_id,
                attempt_order,
                guess_type,
                x_year,
                y_year,
                is_correct: correct,
            })
            .await
            .map_err(GameError::storage)?;

        let mut game_finished = false;
        if correct {
            self.timelines
                .append(player_id, show.premiere_year)
                .await
                .map_err(GameError::storage)?;
            let score = self
                .timelines
                .count_for_player(player_id)
                .await
                .map_err(GameError::storage)? as i32;

            info!(
                lobby_id = %lobby_id,
                player_id = %player_id,
                year = show.premiere_year,
                score,
                "Correct guess, year placed"
            );

            if score >= target_score {
                self.lobbies
                    .set_status(lobby_id, LobbyStatus::Finished)
                    .await
                    .map_err(GameError::storage)?;
                game_finished = true;
                info!(lobby_id = %lobby_id, player_id = %player_id, score, "Game finished");
                self.events.publish(GameEvent::LobbyChanged { lobby_id });
            }
        } else if updated.round_state == RoundState::Revealed {
            info!(lobby_id = %lobby_id, round = state.round_number, "DJ defended the round");
        } else {
            info!(
                lobby_id = %lobby_id,
                next_seat = updated.current_attempt_seat,
                "Miss, turn passes clockwise"
            );
        }

        self.events.publish(GameEvent::GameStateChanged { lobby_id });

        let premiere_year = match updated.round_state {
            RoundState::Revealed => Some(show.premiere_year),
            _ => None,
        };

        Ok(AttemptOutcome {
            correct,
            round_state: updated.round_state,
            game_finished,
            premiere_year,
        })
    }

    /// Host moves everyone along after a reveal. The DJ baton goes to
    /// whoever made the round's final attempt.
    pub async fn advance_round(
        &self,
        lobby_id: Uuid,
        requesting_player_id: Uuid,
    ) -> Result<GameState, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        Self::require_host(&lobby, requesting_player_id)?;
        if lobby.status != LobbyStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }

        let state = self.require_game_state(lobby_id).await?;
        let next_state = advance_round_state(state.round_state, RoundEvent::NextRound)?;

        let seated = self
            .players
            .list_seated_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        let roles = TurnEngine::next_round_roles(state.current_attempt_seat, seated.len() as i32);

        let played = self
            .round_shows
            .show_ids_for_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;
        let show = self
            .shows
            .random_show(&played)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::NoShowsAvailable)?;

        let next_round = state.round_number + 1;
        let updated = self
            .apply_state_changes(
                lobby_id,
                state.revision,
                GameStateChanges {
                    round_state: Some(next_state),
                    current_guesser_seat: Some(roles.guesser_seat),
                    current_dj_seat: Some(roles.dj_seat),
                    current_attempt_seat: Some(roles.guesser_seat),
                    round_number: Some(next_round),
                    show_id: Some(show.id),
                },
            )
            .await?;

        self.round_shows
            .record(lobby_id, next_round, show.id)
            .await
            .map_err(GameError::storage)?;

        info!(
            lobby_id = %lobby_id,
            round = next_round,
            dj_seat = roles.dj_seat,
            guesser_seat = roles.guesser_seat,
            "Round advanced"
        );
        self.events.publish(GameEvent::GameStateChanged { lobby_id });
        Ok(updated)
    }

    // ---- Views ----

    pub async fn lobby_view(&self, join_code: &str) -> Result<LobbyView, GameError> {
        let code = join_code.trim().to_uppercase();
        let lobby = self
            .lobbies
            .find_by_join_code(&code)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::LobbyNotFound { lobby_id: code })?;

        self.lobby_view_by_id(lobby.id).await
    }

    pub async fn lobby_exists(&self, lobby_id: Uuid) -> Result<bool, GameError> {
        Ok(self
            .lobbies
            .find_by_id(lobby_id)
            .await
            .map_err(GameError::storage)?
            .is_some())
    }

    async fn lobby_view_by_id(&self, lobby_id: Uuid) -> Result<LobbyView, GameError> {
        let lobby = self.require_lobby(lobby_id).await?;
        let players = self
            .players
            .list_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;

        let mut summaries = Vec::with_capacity(players.len());
        for player in players {
            let score = self
                .timelines
                .count_for_player(player.id)
                .await
                .map_err(GameError::storage)? as i32;
            summaries.push(PlayerSummary {
                id: player.id,
                name: player.name,
                seat: player.seat,
                score,
            });
        }

        Ok(LobbyView {
            lobby,
            players: summaries,
        })
    }

    /// Everything one player may know about the running game. The show card
    /// goes through `ShowView` so the premiere year never leaks early.
    pub async fn game_view(
        &self,
        lobby_id: Uuid,
        viewer_player_id: Uuid,
    ) -> Result<GameView, GameError> {
        let state = self.require_game_state(lobby_id).await?;
        let viewer = self.require_member(lobby_id, viewer_player_id).await?;
        let viewer_is_dj = viewer.seat == Some(state.current_dj_seat);

        let show = match state.show_id {
            Some(show_id) => {
                let show = self
                    .shows
                    .find_by_id(show_id)
                    .await
                    .map_err(GameError::storage)?
                    .ok_or(GameError::ShowNotFound {
                        show_id: show_id.to_string(),
                    })?;
                ShowView::for_round(&show, state.round_state, viewer_is_dj)
            }
            None => None,
        };

        let seated = self
            .players
            .list_seated_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?;

        let mut summaries = Vec::with_capacity(seated.len());
        let mut timelines = Vec::with_capacity(seated.len());
        for player in seated {
            let years = self
                .timelines
                .years_for_player(player.id)
                .await
                .map_err(GameError::storage)?;
            summaries.push(PlayerSummary {
                id: player.id,
                name: player.name,
                seat: player.seat,
                score: years.len() as i32,
            });
            timelines.push(PlayerTimeline {
                player_id: player.id,
                years,
            });
        }

        let attempts = self
            .attempts
            .list_for_round(lobby_id, state.round_number)
            .await
            .map_err(GameError::storage)?;

        Ok(GameView {
            game: state,
            show,
            players: summaries,
            timelines,
            attempts,
        })
    }

    // ---- Shared guards ----

    async fn require_lobby(&self, lobby_id: Uuid) -> Result<Lobby, GameError> {
        self.lobbies
            .find_by_id(lobby_id)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::LobbyNotFound {
                lobby_id: lobby_id.to_string(),
            })
    }

    async fn require_game_state(&self, lobby_id: Uuid) -> Result<GameState, GameError> {
        self.game_states
            .find_by_lobby(lobby_id)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::GameNotStarted)
    }

    /// The player must exist and belong to this lobby; outsiders read the
    /// same error as unknown ids.
    async fn require_member(&self, lobby_id: Uuid, player_id: Uuid) -> Result<Player, GameError> {
        let player = self
            .players
            .find_by_id(player_id)
            .await
            .map_err(GameError::storage)?
            .ok_or(GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;

        if player.lobby_id != lobby_id {
            return Err(GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            });
        }
        Ok(player)
    }

    fn require_seat(player: &Player) -> Result<i32, GameError> {
        player.seat.ok_or(GameError::PlayerNotSeated {
            player_id: player.id.to_string(),
        })
    }

    fn require_host(lobby: &Lobby, player_id: Uuid) -> Result<(), GameError> {
        if lobby.is_host(player_id) {
            Ok(())
        } else {
            Err(GameError::NotHost)
        }
    }

    async fn apply_state_changes(
        &self,
        lobby_id: Uuid,
        expected_revision: i32,
        changes: GameStateChanges,
    ) -> Result<GameState, GameError> {
        match self
            .game_states
            .update_guarded(lobby_id, expected_revision, changes)
            .await
            .map_err(GameError::storage)?
        {
            GuardedUpdate::Updated(state) => Ok(state),
            GuardedUpdate::Conflict => {
                warn!(lobby_id = %lobby_id, "Game state moved underneath the request");
                Err(GameError::StateConflict)
            }
            GuardedUpdate::Missing => Err(GameError::GameNotStarted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_codes_use_the_advertised_alphabet() {
        for _ in 0..50 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LENGTH);
            assert!(
                code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn test_join_codes_differ() {
        let first = generate_join_code();
        let second = generate_join_code();
        assert_ne!(first, second);
    }
}
