use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{prelude::*, round_shows};

/// One row per round recording which show played; the trail that keeps
/// later picks from repeating a show within the same game.
pub struct RoundShowRepository {
    db: DatabaseConnection,
}

impl RoundShowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record(&self, lobby_id: Uuid, round_number: i32, show_id: Uuid) -> Result<()> {
        let model = round_shows::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            lobby_id: sea_orm::ActiveValue::Set(lobby_id),
            round_number: sea_orm::ActiveValue::Set(round_number),
            show_id: sea_orm::ActiveValue::Set(show_id),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        RoundShows::insert(model).exec(&self.db).await?;
        Ok(())
    }

    pub async fn show_ids_for_lobby(&self, lobby_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = RoundShows::find()
            .filter(round_shows::Column::LobbyId.eq(lobby_id))
            .select_only()
            .column(round_shows::Column::ShowId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    /// Part of the start-game purge when a finished game is restarted.
    pub async fn delete_for_lobby(&self, lobby_id: Uuid) -> Result<()> {
        RoundShows::delete_many()
            .filter(round_shows::Column::LobbyId.eq(lobby_id))
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

    async fn setup_test_db() -> RoundShowRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        RoundShowRepository::new(db)
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        repo.record(lobby_id, 1, first).await.unwrap();
        repo.record(lobby_id, 2, second).await.unwrap();
        repo.record(Uuid::new_v4(), 1, Uuid::new_v4()).await.unwrap();

        let mut ids = repo.show_ids_for_lobby(lobby_id).await.unwrap();
        ids.sort();
        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_one_show_per_round() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();

        repo.record(lobby_id, 1, Uuid::new_v4()).await.unwrap();
        assert!(repo.record(lobby_id, 1, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_for_lobby() {
        let repo = setup_test_db().await;
        let lobby_id = Uuid::new_v4();

        repo.record(lobby_id, 1, Uuid::new_v4()).await.unwrap();
        repo.delete_for_lobby(lobby_id).await.unwrap();
        assert!(repo.show_ids_for_lobby(lobby_id).await.unwrap().is_empty());
    }
}
