use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{Attempt, GameState, Lobby, PlayerId, RoundState, Show, ShowId};

/// Safe version of Show that doesn't expose the premiere year
/// Used for HTTP responses where we need to protect the round's answer
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShowView {
    pub id: ShowId,
    pub name: String,
    pub network: String,
    pub artist: String,
    /// Only present for the DJ or once the round is revealed.
    pub premiere_year: Option<i32>,
    pub video_url: Option<String>,
}

impl ShowView {
    fn full(show: &Show) -> Self {
        ShowView {
            id: show.id,
            name: show.name.clone(),
            network: show.network.clone(),
            artist: show.artist.clone(),
            premiere_year: Some(show.premiere_year),
            video_url: show.video_url.clone(),
        }
    }

    fn concealed(show: &Show) -> Self {
        ShowView {
            premiere_year: None,
            ..Self::full(show)
        }
    }

    /// What a given viewer may see of the current show. The DJ always sees
    /// the whole card; guessers see nothing until the theme starts playing,
    /// then the card minus the year until the reveal.
    pub fn for_round(show: &Show, round_state: RoundState, viewer_is_dj: bool) -> Option<Self> {
        match (round_state, viewer_is_dj) {
            (_, true) => Some(Self::full(show)),
            (RoundState::DjReady, false) => None,
            (RoundState::Guessing, false) => Some(Self::concealed(show)),
            (RoundState::Revealed, false) => Some(Self::full(show)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub seat: Option<i32>,
    /// Timeline length; zero until the game starts.
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerTimeline {
    pub player_id: PlayerId,
    /// Ascending premiere years.
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LobbyView {
    pub lobby: Lobby,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameView {
    pub game: GameState,
    pub show: Option<ShowView>,
    pub players: Vec<PlayerSummary>,
    pub timelines: Vec<PlayerTimeline>,
    /// This round's attempts, in order.
    pub attempts: Vec<Attempt>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn show() -> Show {
        Show {
            id: Uuid::new_v4(),
            name: "Twin Peaks".to_string(),
            network: "ABC".to_string(),
            artist: "Angelo Badalamenti".to_string(),
            premiere_year: 1990,
            video_url: None,
        }
    }

    #[test]
    fn test_dj_always_sees_the_year() {
        let s = show();
        for state in [RoundState::DjReady, RoundState::Guessing, RoundState::Revealed] {
            let view = ShowView::for_round(&s, state, true).unwrap();
            assert_eq!(view.premiere_year, Some(1990));
        }
    }

    #[test]
    fn test_guessers_see_nothing_before_the_theme_plays() {
        assert!(ShowView::for_round(&show(), RoundState::DjReady, false).is_none());
    }

    #[test]
    fn test_guessers_see_card_without_year_while_guessing() {
        let view = ShowView::for_round(&show(), RoundState::Guessing, false).unwrap();
        assert_eq!(view.name, "Twin Peaks");
        assert_eq!(view.premiere_year, None);
    }

    #[test]
    fn test_everyone_sees_the_year_after_reveal() {
        let view = ShowView::for_round(&show(), RoundState::Revealed, false).unwrap();
        assert_eq!(view.premiere_year, Some(1990));
    }
}
