pub mod errors;
pub mod game;
pub mod lobby;
pub mod messages;
pub mod show;
pub mod views;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use lobby::*;
pub use messages::*;
pub use show::*;
pub use views::*;

pub type LobbyId = uuid::Uuid;
pub type PlayerId = uuid::Uuid;
pub type ShowId = uuid::Uuid;
pub type GameStateId = uuid::Uuid;
