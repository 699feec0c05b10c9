use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of media a catalog unit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media entity from the external catalog. The catalog is the sole
/// authority for which seasons exist and how many episodes each holds;
/// instances only report what they have of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub seasons: Vec<SeasonSummary>,
}

impl Unit {
    /// Look up a season summary by number.
    pub fn season(&self, season_number: u32) -> Option<&SeasonSummary> {
        self.seasons.iter().find(|s| s.season_number == season_number)
    }

    /// Catalog episode count for a season, zero when the catalog does not
    /// know the season (or its count).
    pub fn episode_total(&self, season_number: u32) -> u32 {
        self.season(season_number).map(|s| s.episode_count).unwrap_or(0)
    }
}

/// Per-season entry of a catalog unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: Option<String>,
    pub episode_count: u32,
}

/// A single catalog episode, fetched lazily per season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub episode_number: u32,
    pub title: String,
    pub air_date: Option<NaiveDate>,
}
