use anyhow::Result;
use rand::seq::SliceRandom;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QuerySelect};
use uuid::Uuid;

use crate::entities::{prelude::*, shows};
use game_types::Show;

/// Catalog row about to be inserted; ids are assigned here.
#[derive(Debug, Clone)]
pub struct NewShow {
    pub name: String,
    pub network: String,
    pub artist: String,
    pub premiere_year: i32,
    pub video_url: Option<String>,
}

pub struct ShowRepository {
    db: DatabaseConnection,
}

impl ShowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_show(model: shows::Model) -> Show {
        Show {
            id: model.id,
            name: model.name,
            network: model.network,
            artist: model.artist,
            premiere_year: model.premiere_year,
            video_url: model.video_url,
        }
    }

    pub async fn insert_many(&self, new_shows: Vec<NewShow>) -> Result<()> {
        if new_shows.is_empty() {
            return Ok(());
        }

        let models = new_shows.into_iter().map(|s| shows::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::new_v4()),
            name: sea_orm::ActiveValue::Set(s.name),
            network: sea_orm::ActiveValue::Set(s.network),
            artist: sea_orm::ActiveValue::Set(s.artist),
            premiere_year: sea_orm::ActiveValue::Set(s.premiere_year),
            video_url: sea_orm::ActiveValue::Set(s.video_url),
        });

        Shows::insert_many(models).exec(&self.db).await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Shows::find().count(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Show>> {
        let model = Shows::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Self::model_to_show))
    }

    /// The year pool timeline seeding draws from.
    pub async fn distinct_premiere_years(&self) -> Result<Vec<i32>> {
        let years: Vec<i32> = Shows::find()
            .select_only()
            .column(shows::Column::PremiereYear)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(years)
    }

    /// Pick uniformly among shows not yet played this game; once the whole
    /// catalog has been used the full pool comes back into play.
    pub async fn random_show(&self, exclude: &[Uuid]) -> Result<Option<Show>> {
        let all = Shows::find().all(&self.db).await?;
        if all.is_empty() {
            return Ok(None);
        }

        let fresh: Vec<&shows::Model> = all.iter().filter(|m| !exclude.contains(&m.id)).collect();

        let picked = {
            let mut rng = rand::thread_rng();
            if fresh.is_empty() {
                all.choose(&mut rng).cloned()
            } else {
                fresh.choose(&mut rng).map(|m| (*m).clone())
            }
        };

        Ok(picked.map(Self::model_to_show))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    fn catalog() -> Vec<NewShow> {
        [
            ("Twin Peaks", 1990),
            ("The X-Files", 1993),
            ("Friends", 1994),
            ("Lost", 2004),
        ]
        .into_iter()
        .map(|(name, year)| NewShow {
            name: name.to_string(),
            network: "Test".to_string(),
            artist: "Various".to_string(),
            premiere_year: year,
            video_url: None,
        })
        .collect()
    }

    async fn setup_test_db() -> ShowRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        ShowRepository::new(db)
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let repo = setup_test_db().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.insert_many(catalog()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 4);

        // Inserting nothing is a no-op
        repo.insert_many(Vec::new()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_distinct_premiere_years() {
        let repo = setup_test_db().await;
        let mut shows = catalog();
        shows.push(NewShow {
            name: "Northern Exposure".to_string(),
            network: "CBS".to_string(),
            artist: "David Schwartz".to_string(),
            premiere_year: 1990, // duplicate year
            video_url: None,
        });
        repo.insert_many(shows).await.unwrap();

        let mut years = repo.distinct_premiere_years().await.unwrap();
        years.sort_unstable();
        assert_eq!(years, vec![1990, 1993, 1994, 2004]);
    }

    #[tokio::test]
    async fn test_random_show_on_empty_catalog() {
        let repo = setup_test_db().await;
        assert!(repo.random_show(&[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_random_show_respects_exclusions() {
        let repo = setup_test_db().await;
        repo.insert_many(catalog()).await.unwrap();

        let all_ids: Vec<Uuid> = {
            let mut ids = Vec::new();
            for _ in 0..32 {
                ids.push(repo.random_show(&[]).await.unwrap().unwrap().id);
            }
            ids
        };
        let mut distinct = all_ids.clone();
        distinct.sort_unstable();
        distinct.dedup();

        // Exclude all but one; only that one can come back
        let keep = distinct[0];
        let exclude: Vec<Uuid> = distinct.iter().copied().filter(|id| *id != keep).collect();
        if exclude.len() == 3 {
            let picked = repo.random_show(&exclude).await.unwrap().unwrap();
            assert_eq!(picked.id, keep);
        }

        // Excluding everything falls back to the full pool
        let picked = repo.random_show(&distinct).await.unwrap();
        assert!(picked.is_some());
    }
}
