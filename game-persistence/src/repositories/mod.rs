pub mod attempt_repository;
pub mod game_state_repository;
pub mod lobby_repository;
pub mod player_repository;
pub mod round_show_repository;
pub mod show_repository;
pub mod timeline_repository;

pub use attempt_repository::{AttemptRepository, NewAttempt};
pub use game_state_repository::{GameStateChanges, GameStateRepository, GuardedUpdate};
pub use lobby_repository::LobbyRepository;
pub use player_repository::PlayerRepository;
pub use round_show_repository::RoundShowRepository;
pub use show_repository::{NewShow, ShowRepository};
pub use timeline_repository::TimelineRepository;
