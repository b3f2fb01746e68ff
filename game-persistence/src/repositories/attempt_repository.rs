use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{attempts, prelude::*};
use game_types::{Attempt, GuessType};

/// An evaluated guess about to be recorded. Out-of-turn submissions never
/// reach this point.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub lobby_id: Uuid,
    pub round_number: i32,
    pub player_id: Uuid,
    pub attempt_order: i32,
    pub guess_type: GuessType,
    pub x_year: i32,
    pub y_year: Option<i32>,
    pub is_correct: bool,
}

pub struct AttemptRepository {
    db: DatabaseConnection,
}

impl AttemptRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_attempt(model: attempts::Model) -> Result<Attempt> {
        let guess_type = GuessType::parse(&model.guess_type)
            .ok_or_else(|| anyhow::anyhow!("unknown guess type '{}'", model.guess_type))?;

        Ok(Attempt {
            id: model.id,
            lobby_id: model.lobby_id,
            round_number: model.round_number,
            player_id: model.player_id,
            attempt_order: model.attempt_order,
            guess_type,
            x_year: model.x_year,
            y_year: model.y_year,
            is_correct: model.is_correct,
            created_at: model.created_at.to_rfc3339(),
        })
    }

    pub async fn append(&self, new_attempt: NewAttempt) -> Result<Attempt> {
        let model = attempts::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            lobby_id: sea_orm::ActiveValue::Set(new_attempt.lobby_id),
            round_number: sea_orm::ActiveValue::Set(new_attempt.round_number),
            player_id: sea_orm::ActiveValue::Set(new_attempt.player_id),
            attempt_order: sea_orm::ActiveValue::Set(new_attempt.attempt_order),
            guess_type: sea_orm::ActiveValue::Set(new_attempt.guess_type.as_str().to_string()),
            x_year: sea_orm::ActiveValue::Set(new_attempt.x_year),
            y_year: sea_orm::ActiveValue::Set(new_attempt.y_year),
            is_correct: sea_orm::ActiveValue::Set(new_attempt.is_correct),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        let saved = Attempts::insert(model).exec(&self.db).await?;
        let created = Attempts::find_by_id(saved.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created attempt"))?;

        Self::model_to_attempt(created)
    }

    /// How many attempts this round already holds; the next row's
    /// `attempt_order`.
    pub async fn count_for_round(&self, lobby_id: Uuid, round_number: i32) -> Result<u64> {
        let count = Attempts::find()
            .filter(attempts::Column::LobbyId.eq(lobby_id))
            .filter(attempts::Column::RoundNumber.eq(round_number))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn list_for_round(&self, lobby_id: Uuid, round_number: i32) -> Result<Vec<Attempt>> {
        let models = Attempts::find()
            .filter(attempts::Column::LobbyId.eq(lobby_id))
            .filter(attempts::Column::RoundNumber.eq(round_number))
            .order_by_asc(attempts::Column::AttemptOrder)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::model_to_attempt).collect()
    }

    /// Part of the start-game purge when a finished game is restarted.
    pub async fn delete_for_lobby(&self, lobby_id: Uuid) -> Result<()> {
        Attempts::delete_many()
            .filter(attempts::Column::LobbyId.eq(lobby_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> AttemptRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        AttemptRepository::new(db)
    }

    fn miss(lobby_id: Uuid, round_number: i32, attempt_order: i32) -> NewAttempt {
        NewAttempt {
            lobby_id,
            round_number,
            player_id: Uuid::new_v4(),
            attempt_order,
            guess_type: GuessType::Before,
            x_year: 1995,
            y_year: None,
            is_correct: false,
        }
    }

    #[tokio::test]
    async fn test_append_and_list_in_order() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();

        repo.append(miss(lobby_id, 1, 0)).await.unwrap();
        let hit = repo
            .append(NewAttempt {
                lobby_id,
                round_number: 1,
                player_id: Uuid::new_v4(),
                attempt_order: 1,
                guess_type: GuessType::Between,
                x_year: 1990,
                y_year: Some(2000),
                is_correct: true,
            })
            .await
            .unwrap();

        assert_eq!(hit.attempt_order, 1);
        assert_eq!(hit.guess_type, GuessType::Between);
        assert_eq!(hit.y_year, Some(2000));
        assert!(hit.is_correct);

        let listed = repo.list_for_round(lobby_id, 1).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].attempt_order, 0);
        assert!(!listed[0].is_correct);
        assert_eq!(listed[1].attempt_order, 1);
    }

    #[tokio::test]
    async fn test_count_scopes_by_round() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();

        repo.append(miss(lobby_id, 1, 0)).await.unwrap();
        repo.append(miss(lobby_id, 1, 1)).await.unwrap();
        repo.append(miss(lobby_id, 2, 0)).await.unwrap();

        assert_eq!(repo.count_for_round(lobby_id, 1).await.unwrap(), 2);
        assert_eq!(repo.count_for_round(lobby_id, 2).await.unwrap(), 1);
        assert_eq!(repo.count_for_round(lobby_id, 3).await.unwrap(), 0);
        assert_eq!(repo.count_for_round(Uuid::new_v4(), 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_for_lobby() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        let other_lobby = Uuid::new_v4();

        repo.append(miss(lobby_id, 1, 0)).await.unwrap();
        repo.append(miss(other_lobby, 1, 0)).await.unwrap();

        repo.delete_for_lobby(lobby_id).await.unwrap();
        assert_eq!(repo.count_for_round(lobby_id, 1).await.unwrap(), 0);
        assert_eq!(repo.count_for_round(other_lobby, 1).await.unwrap(), 1);
    }
}
