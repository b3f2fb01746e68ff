use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter};
use uuid::Uuid;

use crate::entities::{lobbies, prelude::*};
use game_types::{Lobby, LobbyStatus};

pub struct LobbyRepository {
    db: DatabaseConnection,
}

impl LobbyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_lobby(model: lobbies::Model) -> Result<Lobby> {
        let status = LobbyStatus::parse(&model.status)
            .ok_or_else(|| anyhow::anyhow!("unknown lobby status '{}'", model.status))?;

        Ok(Lobby {
            id: model.id,
            join_code: model.join_code,
            host_player_id: model.host_player_id,
            status,
            target_score: model.target_score,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        })
    }

    /// Insert a fresh lobby in `waiting` with no host yet; the host player
    /// row is created separately and linked via `set_host`.
    pub async fn create(&self, join_code: &str) -> Result<Lobby> {
        let now = chrono::Utc::now();

        let model = lobbies::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            join_code: sea_orm::ActiveValue::Set(join_code.to_string()),
            host_player_id: sea_orm::ActiveValue::Set(None),
            status: sea_orm::ActiveValue::Set(LobbyStatus::Waiting.as_str().to_string()),
            target_score: sea_orm::ActiveValue::Set(None),
            created_at: sea_orm::ActiveValue::Set(now.into()),
            updated_at: sea_orm::ActiveValue::Set(now.into()),
        };

        let saved = Lobbies::insert(model).exec(&self.db).await?;
        let created = Lobbies::find_by_id(saved.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created lobby"))?;

        Self::model_to_lobby(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lobby>> {
        let model = Lobbies::find_by_id(id).one(&self.db).await?;
        model.map(Self::model_to_lobby).transpose()
    }

    pub async fn find_by_join_code(&self, join_code: &str) -> Result<Option<Lobby>> {
        let model = Lobbies::find()
            .filter(lobbies::Column::JoinCode.eq(join_code))
            .one(&self.db)
            .await?;

        model.map(Self::model_to_lobby).transpose()
    }

    pub async fn set_host(&self, lobby_id: Uuid, host_player_id: Uuid) -> Result<()> {
        let model = self.require_model(lobby_id).await?;
        let mut active = model.into_active_model();
        active.host_player_id = sea_orm::ActiveValue::Set(Some(host_player_id));
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().into());
        Lobbies::update(active).exec(&self.db).await?;
        Ok(())
    }

    pub async fn set_target_score(&self, lobby_id: Uuid, target_score: i32) -> Result<()> {
        let model = self.require_model(lobby_id).await?;
        let mut active = model.into_active_model();
        active.target_score = sea_orm::ActiveValue::Set(Some(target_score));
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().into());
        Lobbies::update(active).exec(&self.db).await?;
        Ok(())
    }

    pub async fn set_status(&self, lobby_id: Uuid, status: LobbyStatus) -> Result<()> {
        let model = self.require_model(lobby_id).await?;
        let mut active = model.into_active_model();
        active.status = sea_orm::ActiveValue::Set(status.as_str().to_string());
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().into());
        Lobbies::update(active).exec(&self.db).await?;
        Ok(())
    }

    /// Rollback path for lobby creation when the host insert fails.
    pub async fn delete(&self, lobby_id: Uuid) -> Result<()> {
        Lobbies::delete_by_id(lobby_id).exec(&self.db).await?;
        Ok(())
    }

    async fn require_model(&self, lobby_id: Uuid) -> Result<lobbies::Model> {
        Lobbies::find_by_id(lobby_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Lobby {} not found", lobby_id))
    }
}
