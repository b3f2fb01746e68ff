use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ShowId;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    pub network: String,
    pub artist: String,
    pub premiere_year: i32,
    pub video_url: Option<String>,
}
