pub mod prelude;

pub mod attempts;
pub mod game_states;
pub mod lobbies;
pub mod players;
pub mod round_shows;
pub mod shows;
pub mod timelines;
