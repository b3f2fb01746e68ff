use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{players, prelude::*};
use game_types::Player;

pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model) -> Player {
        Player {
            id: model.id,
            lobby_id: model.lobby_id,
            name: model.name,
            seat: model.seat,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    pub async fn create(&self, lobby_id: Uuid, name: &str) -> Result<Player> {
        let model = players::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            lobby_id: sea_orm::ActiveValue::Set(lobby_id),
            name: sea_orm::ActiveValue::Set(name.to_string()),
            seat: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        let saved = Players::insert(model).exec(&self.db).await?;
        let created = Players::find_by_id(saved.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created player"))?;

        Ok(Self::model_to_player(created))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>> {
        let model = Players::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Self::model_to_player))
    }

    /// Everyone in the lobby, in join order.
    pub async fn list_by_lobby(&self, lobby_id: Uuid) -> Result<Vec<Player>> {
        let models = Players::find()
            .filter(players::Column::LobbyId.eq(lobby_id))
            .order_by_asc(players::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    /// Seated players in seat order; the shape turn rotation walks.
    pub async fn list_seated_by_lobby(&self, lobby_id: Uuid) -> Result<Vec<Player>> {
        let models = Players::find()
            .filter(players::Column::LobbyId.eq(lobby_id))
            .filter(players::Column::Seat.is_not_null())
            .order_by_asc(players::Column::Seat)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_player).collect())
    }

    pub async fn set_seats(&self, assignments: &[(Uuid, i32)]) -> Result<()> {
        for &(player_id, seat) in assignments {
            let model = Players::find_by_id(player_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Player {} not found", player_id))?;

            let mut active = model.into_active_model();
            active.seat = sea_orm::ActiveValue::Set(Some(seat));
            Players::update(active).exec(&self.db).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use crate::repositories::LobbyRepository;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> (LobbyRepository, PlayerRepository) {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (LobbyRepository::new(db.clone()), PlayerRepository::new(db))
    }

    #[tokio::test]
    async fn test_create_and_list_players() {
        let (lobbies, players) = setup_test_db().await;
        let lobby = lobbies.create("LOBBY1").await.unwrap();

        let ana = players.create(lobby.id, "Ana").await.unwrap();
        let bo = players.create(lobby.id, "Bo").await.unwrap();
        assert_eq!(ana.lobby_id, lobby.id);
        assert!(ana.seat.is_none());

        let listed = players.list_by_lobby(lobby.id).await.unwrap();
        assert_eq!(listed.len(), 2);

        let found = players.find_by_id(bo.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Bo");
    }

    #[tokio::test]
    async fn test_seat_assignment_and_seated_order() {
        let (lobbies, players) = setup_test_db().await;
        let lobby = lobbies.create("LOBBY2").await.unwrap();

        let ana = players.create(lobby.id, "Ana").await.unwrap();
        let bo = players.create(lobby.id, "Bo").await.unwrap();
        let cy = players.create(lobby.id, "Cy").await.unwrap();

        // Not in join order on purpose
        players
            .set_seats(&[(ana.id, 2), (bo.id, 0), (cy.id, 1)])
            .await
            .unwrap();

        let seated = players.list_seated_by_lobby(lobby.id).await.unwrap();
        let names: Vec<&str> = seated.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Cy", "Ana"]);
        assert_eq!(seated[0].seat, Some(0));
        assert_eq!(seated[2].seat, Some(2));
    }

    #[tokio::test]
    async fn test_players_in_other_lobbies_are_not_listed() {
        let (lobbies, players) = setup_test_db().await;
        let first = lobbies.create("LOBBY3").await.unwrap();
        let second = lobbies.create("LOBBY4").await.unwrap();

        players.create(first.id, "Ana").await.unwrap();
        players.create(second.id, "Bo").await.unwrap();

        let listed = players.list_by_lobby(first.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ana");
    }
}
