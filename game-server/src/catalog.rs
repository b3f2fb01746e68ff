use serde::Deserialize;
use tracing::info;

use game_persistence::repositories::{NewShow, ShowRepository};

/// Ships inside the binary so a fresh deployment has something to play with.
const BUNDLED_CATALOG: &str = include_str!("catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    network: String,
    artist: String,
    premiere_year: i32,
    video_url: Option<String>,
}

pub fn bundled_shows() -> Result<Vec<NewShow>, String> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(BUNDLED_CATALOG)
        .map_err(|e| format!("Bundled catalog is not valid JSON: {}", e))?;

    Ok(entries
        .into_iter()
        .map(|entry| NewShow {
            name: entry.name,
            network: entry.network,
            artist: entry.artist,
            premiere_year: entry.premiere_year,
            video_url: entry.video_url,
        })
        .collect())
}

/// Seed the shows table from the bundled catalog, but only when it is empty
/// so operator-managed catalogs survive restarts untouched.
pub async fn seed_if_empty(repository: &ShowRepository) -> Result<usize, String> {
    let existing = repository
        .count()
        .await
        .map_err(|e| format!("Failed to count shows: {}", e))?;

    if existing > 0 {
        info!("Show catalog already has {} entries, skipping seed", existing);
        return Ok(0);
    }

    let shows = bundled_shows()?;
    let seeded = shows.len();
    repository
        .insert_many(shows)
        .await
        .map_err(|e| format!("Failed to seed show catalog: {}", e))?;

    info!("Seeded show catalog with {} bundled shows", seeded);
    Ok(seeded)
}
