pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_lobbies_table;
mod m20250101_000002_create_players_table;
mod m20250101_000003_create_shows_table;
mod m20250101_000004_create_game_states_table;
mod m20250101_000005_create_timelines_table;
mod m20250101_000006_create_attempts_table;
mod m20250101_000007_create_round_shows_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_lobbies_table::Migration),
            Box::new(m20250101_000002_create_players_table::Migration),
            Box::new(m20250101_000003_create_shows_table::Migration),
            Box::new(m20250101_000004_create_game_states_table::Migration),
            Box::new(m20250101_000005_create_timelines_table::Migration),
            Box::new(m20250101_000006_create_attempts_table::Migration),
            Box::new(m20250101_000007_create_round_shows_table::Migration),
        ]
    }
}
