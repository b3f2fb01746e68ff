use std::str::FromStr;

use game_types::{GameError, PlayerId};
use rand::Rng;
use rand::seq::SliceRandom;

/// Every timeline opens with this many catalog years already placed.
pub const SEED_YEARS_PER_PLAYER: usize = 2;

/// How starting timelines are dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedingPolicy {
    /// Everyone opens with the same two years.
    Shared,
    /// Each player opens with a private pair; needs 2×N distinct catalog years.
    #[default]
    PerPlayerDistinct,
}

impl FromStr for SeedingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(SeedingPolicy::Shared),
            "per_player_distinct" => Ok(SeedingPolicy::PerPlayerDistinct),
            other => Err(format!(
                "unknown seeding policy '{other}', expected 'shared' or 'per_player_distinct'"
            )),
        }
    }
}

/// Deal seats 0..N uniformly at random.
pub fn assign_seats(player_ids: &[PlayerId], rng: &mut impl Rng) -> Vec<(PlayerId, i32)> {
    let mut seats: Vec<i32> = (0..player_ids.len() as i32).collect();
    seats.shuffle(rng);
    player_ids.iter().copied().zip(seats).collect()
}

/// Draw each player's two starting years from the catalog's distinct
/// premiere years, per the configured policy.
pub fn draw_seed_years(
    distinct_years: &[i32],
    player_ids: &[PlayerId],
    policy: SeedingPolicy,
    rng: &mut impl Rng,
) -> Result<Vec<(PlayerId, [i32; 2])>, GameError> {
    let needed = match policy {
        SeedingPolicy::Shared => SEED_YEARS_PER_PLAYER,
        SeedingPolicy::PerPlayerDistinct => SEED_YEARS_PER_PLAYER * player_ids.len(),
    };
    if distinct_years.len() < needed {
        return Err(GameError::NotEnoughSeedYears {
            needed,
            found: distinct_years.len(),
        });
    }

    let mut pool = distinct_years.to_vec();
    pool.shuffle(rng);

    let seeded = match policy {
        SeedingPolicy::Shared => {
            let pair = [pool[0], pool[1]];
            player_ids.iter().map(|&id| (id, pair)).collect()
        }
        SeedingPolicy::PerPlayerDistinct => player_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let base = i * SEED_YEARS_PER_PLAYER;
                (id, [pool[base], pool[base + 1]])
            })
            .collect(),
    };
    Ok(seeded)
}
