use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entities::{prelude::*, timelines};
use game_types::TimelineEntry;

/// A player's score is simply how many rows they have here; seed years
/// count like any other.
pub struct TimelineRepository {
    db: DatabaseConnection,
}

impl TimelineRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_entry(model: timelines::Model) -> TimelineEntry {
        TimelineEntry {
            id: model.id,
            player_id: model.player_id,
            year: model.year,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    /// Bulk-insert the opening years every player starts the game with.
    pub async fn seed(&self, assignments: &[(Uuid, [i32; 2])]) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now();
        let models = assignments.iter().flat_map(|(player_id, years)| {
            years.iter().map(move |year| timelines::ActiveModel {
                id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
                player_id: sea_orm::ActiveValue::Set(*player_id),
                year: sea_orm::ActiveValue::Set(*year),
                created_at: sea_orm::ActiveValue::Set(now.into()),
            })
        });

        Timelines::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    /// A correct guess lands the show's premiere year on the guesser's
    /// timeline.
    pub async fn append(&self, player_id: Uuid, year: i32) -> Result<TimelineEntry> {
        let model = timelines::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            player_id: sea_orm::ActiveValue::Set(player_id),
            year: sea_orm::ActiveValue::Set(year),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now().into()),
        };

        let saved = Timelines::insert(model).exec(&self.db).await?;
        let created = Timelines::find_by_id(saved.last_insert_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created timeline entry"))?;

        Ok(Self::model_to_entry(created))
    }

    pub async fn count_for_player(&self, player_id: Uuid) -> Result<u64> {
        let count = Timelines::find()
            .filter(timelines::Column::PlayerId.eq(player_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Ascending, the order guess bounds are read against.
    pub async fn years_for_player(&self, player_id: Uuid) -> Result<Vec<i32>> {
        let years: Vec<i32> = Timelines::find()
            .filter(timelines::Column::PlayerId.eq(player_id))
            .order_by_asc(timelines::Column::Year)
            .select_only()
            .column(timelines::Column::Year)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(years)
    }

    /// Part of the start-game purge when a finished game is restarted.
    pub async fn delete_for_players(&self, player_ids: &[Uuid]) -> Result<()> {
        if player_ids.is_empty() {
            return Ok(());
        }

        Timelines::delete_many()
            .filter(timelines::Column::PlayerId.is_in(player_ids.iter().copied()))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
