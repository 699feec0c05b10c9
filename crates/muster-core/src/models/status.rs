use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One instance's authoritative view of a unit, already normalized from
/// the kind-specific wire shape. Absent units use [`StatusRecord::absent`];
/// the engine never distinguishes "not present" from "fetch failed".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRecord {
    pub exists: bool,
    /// Series-level monitoring flag. `None` for instance kinds that do not
    /// track monitoring.
    pub monitored: Option<bool>,
    pub root_path: Option<String>,
    pub seasons: Vec<SeasonStatus>,
}

impl StatusRecord {
    /// The record for a unit an instance does not hold. All derived state
    /// reads as unavailable and unmonitored.
    pub fn absent() -> Self {
        StatusRecord::default()
    }

    /// Look up a season's status by number.
    pub fn season(&self, season_number: u32) -> Option<&SeasonStatus> {
        self.seasons.iter().find(|s| s.season_number == season_number)
    }
}

/// Per-season slice of a status record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonStatus {
    pub season_number: u32,
    pub monitored: Option<bool>,
    pub episodes: Vec<EpisodeStatus>,
}

/// Raw per-episode fields as reported by an instance. The availability
/// indicators stay separate here; `reconcile` applies the inclusive-or
/// rule that collapses them into one verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeStatus {
    pub episode_number: u32,
    pub available: bool,
    pub monitored: Option<bool>,
    pub quality: Option<String>,
    pub file: Option<String>,
}

/// Reconciled availability of one episode. The quality label is display
/// decoration and never feeds back into the availability verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub quality: Option<String>,
}

/// season number → episode number → availability. Holds an entry only for
/// episodes that are actually available.
pub type EpisodeStatusMap = BTreeMap<u32, BTreeMap<u32, Availability>>;

/// season number → episode number → monitored flag. Populated only for
/// instance kinds that track per-episode monitoring.
pub type EpisodeMonitoredMap = BTreeMap<u32, BTreeMap<u32, bool>>;
