pub use super::attempts::Entity as Attempts;
pub use super::game_states::Entity as GameStates;
pub use super::lobbies::Entity as Lobbies;
pub use super::players::Entity as Players;
pub use super::round_shows::Entity as RoundShows;
pub use super::shows::Entity as Shows;
pub use super::timelines::Entity as Timelines;
