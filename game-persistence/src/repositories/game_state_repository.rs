use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{game_states, prelude::*};
use game_types::{GameState, RoundState};

/// Columns a guarded update may rewrite. `None` leaves the column alone;
/// `show_id` is only ever replaced, never cleared.
#[derive(Debug, Clone, Default)]
pub struct GameStateChanges {
    pub round_state: Option<RoundState>,
    pub current_guesser_seat: Option<i32>,
    pub current_dj_seat: Option<i32>,
    pub current_attempt_seat: Option<i32>,
    pub round_number: Option<i32>,
    pub show_id: Option<Uuid>,
}

/// Outcome of a revision-guarded update.
#[derive(Debug)]
pub enum GuardedUpdate {
    Updated(GameState),
    /// The row exists but its revision moved past the expected one.
    Conflict,
    /// No game state row for this lobby.
    Missing,
}

pub struct GameStateRepository {
    db: DatabaseConnection,
}

impl GameStateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game_state(model: game_states::Model) -> Result<GameState> {
        let round_state = RoundState::parse(&model.round_state)
            .ok_or_else(|| anyhow::anyhow!("unknown round state '{}'", model.round_state))?;

        Ok(GameState {
            id: model.id,
            lobby_id: model.lobby_id,
            round_number: model.round_number,
            current_guesser_seat: model.current_guesser_seat,
            current_dj_seat: model.current_dj_seat,
            current_attempt_seat: model.current_attempt_seat,
            show_id: model.show_id,
            round_state,
            revision: model.revision,
            updated_at: model.updated_at.to_rfc3339(),
        })
    }

    /// First round of a fresh game: the opening guesser is also the first
    /// to attempt, and the DJ still has to confirm the theme is playing.
    pub async fn create_initial(
        &self,
        lobby_id: Uuid,
        guesser_seat: i32,
        dj_seat: i32,
        show_id: Uuid,
    ) -> Result<GameState> {
        let now = chrono::Utc::now();

        let model = game_states::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            lobby_id: sea_orm::ActiveValue::Set(lobby_id),
            round_number: sea_orm::ActiveValue::Set(1),
            current_guesser_seat: sea_orm::ActiveValue::Set(guesser_seat),
            current_dj_seat: sea_orm::ActiveValue::Set(dj_seat),
            current_attempt_seat: sea_orm::ActiveValue::Set(guesser_seat),
            show_id: sea_orm::ActiveValue::Set(Some(show_id)),
            round_state: sea_orm::ActiveValue::Set(RoundState::DjReady.as_str().to_string()),
            revision: sea_orm::ActiveValue::Set(1),
            updated_at: sea_orm::ActiveValue::Set(now.into()),
        };

        let saved = GameStates::insert(model).exec(&self.db).await?;
        let created = GameStates::find_by_id(saved.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created game state"))?;

        Self::model_to_game_state(created)
    }

    pub async fn find_by_lobby(&self, lobby_id: Uuid) -> Result<Option<GameState>> {
        let model = GameStates::find()
            .filter(game_states::Column::LobbyId.eq(lobby_id))
            .one(&self.db)
            .await?;

        model.map(Self::model_to_game_state).transpose()
    }

    /// Part of the start-game purge when a finished game is restarted.
    pub async fn delete_by_lobby(&self, lobby_id: Uuid) -> Result<()> {
        GameStates::delete_many()
            .filter(game_states::Column::LobbyId.eq(lobby_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Apply `changes` only if the row still carries `expected_revision`,
    /// bumping the revision in the same statement. A zero-row update means
    /// either a concurrent writer got there first or the row is gone; the
    /// refetch tells the two apart.
    pub async fn update_guarded(
        &self,
        lobby_id: Uuid,
        expected_revision: i32,
        changes: GameStateChanges,
    ) -> Result<GuardedUpdate> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let mut update = GameStates::update_many()
            .col_expr(
                game_states::Column::Revision,
                Expr::col(game_states::Column::Revision).add(1),
            )
            .col_expr(game_states::Column::UpdatedAt, Expr::val(now).into());

        if let Some(round_state) = changes.round_state {
            update = update.col_expr(
                game_states::Column::RoundState,
                Expr::val(round_state.as_str()).into(),
            );
        }
        if let Some(seat) = changes.current_guesser_seat {
            update = update.col_expr(
                game_states::Column::CurrentGuesserSeat,
                Expr::val(seat).into(),
            );
        }
        if let Some(seat) = changes.current_dj_seat {
            update = update.col_expr(game_states::Column::CurrentDjSeat, Expr::val(seat).into());
        }
        if let Some(seat) = changes.current_attempt_seat {
            update = update.col_expr(
                game_states::Column::CurrentAttemptSeat,
                Expr::val(seat).into(),
            );
        }
        if let Some(round_number) = changes.round_number {
            update = update.col_expr(
                game_states::Column::RoundNumber,
                Expr::val(round_number).into(),
            );
        }
        if let Some(show_id) = changes.show_id {
            update = update.col_expr(game_states::Column::ShowId, Expr::val(show_id).into());
        }

        let result = update
            .filter(game_states::Column::LobbyId.eq(lobby_id))
            .filter(game_states::Column::Revision.eq(expected_revision))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(match self.find_by_lobby(lobby_id).await? {
                Some(_) => GuardedUpdate::Conflict,
                None => GuardedUpdate::Missing,
            });
        }

        let updated = self
            .find_by_lobby(lobby_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Game state for lobby {} vanished", lobby_id))?;

        Ok(GuardedUpdate::Updated(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> GameStateRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        GameStateRepository::new(db)
    }

    #[tokio::test]
    async fn test_create_initial_state() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        let show_id = Uuid::new_v4();

        let state = repo.create_initial(lobby_id, 0, 1, show_id).await.unwrap();
        assert_eq!(state.lobby_id, lobby_id);
        assert_eq!(state.round_number, 1);
        assert_eq!(state.current_guesser_seat, 0);
        assert_eq!(state.current_dj_seat, 1);
        assert_eq!(state.current_attempt_seat, 0);
        assert_eq!(state.show_id, Some(show_id));
        assert_eq!(state.round_state, RoundState::DjReady);
        assert_eq!(state.revision, 1);

        let found = repo.find_by_lobby(lobby_id).await.unwrap().unwrap();
        assert_eq!(found.id, state.id);
    }

    #[tokio::test]
    async fn test_one_state_per_lobby() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();

        repo.create_initial(lobby_id, 0, 1, Uuid::new_v4())
            .await
            .unwrap();
        assert!(repo
            .create_initial(lobby_id, 2, 3, Uuid::new_v4())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_guarded_update_applies_changes_and_bumps_revision() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        let state = repo
            .create_initial(lobby_id, 0, 1, Uuid::new_v4())
            .await
            .unwrap();

        let changes = GameStateChanges {
            round_state: Some(RoundState::Guessing),
            current_attempt_seat: Some(2),
            ..Default::default()
        };
        let outcome = repo
            .update_guarded(lobby_id, state.revision, changes)
            .await
            .unwrap();

        match outcome {
            GuardedUpdate::Updated(updated) => {
                assert_eq!(updated.round_state, RoundState::Guessing);
                assert_eq!(updated.current_attempt_seat, 2);
                assert_eq!(updated.revision, state.revision + 1);
                // Untouched columns survive
                assert_eq!(updated.current_guesser_seat, 0);
                assert_eq!(updated.current_dj_seat, 1);
                assert_eq!(updated.round_number, 1);
            }
            other => panic!("expected Updated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_guarded_update_detects_stale_revision() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        let state = repo
            .create_initial(lobby_id, 0, 1, Uuid::new_v4())
            .await
            .unwrap();

        // First writer wins
        let first = repo
            .update_guarded(
                lobby_id,
                state.revision,
                GameStateChanges {
                    round_state: Some(RoundState::Guessing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(first, GuardedUpdate::Updated(_)));

        // Second writer still holds the old revision
        let second = repo
            .update_guarded(
                lobby_id,
                state.revision,
                GameStateChanges {
                    round_state: Some(RoundState::Revealed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(second, GuardedUpdate::Conflict));

        let current = repo.find_by_lobby(lobby_id).await.unwrap().unwrap();
        assert_eq!(current.round_state, RoundState::Guessing);
    }

    #[tokio::test]
    async fn test_guarded_update_on_missing_state() {
        let repo = setup_test_db().await;
        let outcome = repo
            .update_guarded(Uuid::new_v4(), 1, GameStateChanges::default())
            .await
            .unwrap();
        assert!(matches!(outcome, GuardedUpdate::Missing));
    }

    #[tokio::test]
    async fn test_delete_by_lobby() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        repo.create_initial(lobby_id, 0, 1, Uuid::new_v4())
            .await
            .unwrap();

        repo.delete_by_lobby(lobby_id).await.unwrap();
        assert!(repo.find_by_lobby(lobby_id).await.unwrap().is_none());

        // Deleting again is harmless
        repo.delete_by_lobby(lobby_id).await.unwrap();
    }
}
