pub mod events;
pub mod guessing;
pub mod rounds;
pub mod seating;
pub mod turns;

// Re-export main components
pub use events::*;
pub use guessing::*;
pub use rounds::*;
pub use seating::*;
pub use turns::*;
