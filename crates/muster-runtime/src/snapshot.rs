//! Immutable read model of a detail view. The view engine replaces the
//! whole snapshot on every state change; the presentation layer only ever
//! reads one of these and never the engine's internals.

use serde::{Deserialize, Serialize};

use muster_core::models::{
    Availability, EpisodeMonitoredMap, EpisodeStatusMap, Instance, StatusRecord, Unit,
};
use muster_core::reconcile::{self, SeasonBadge};

use crate::mutate::OptimisticMonitor;

/// Everything the presentation layer needs to render a unit's detail page
/// for the selected instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub unit: Unit,
    /// Instance the reconciled fields below describe. `None` when no
    /// instance is configured at all.
    pub instance: Option<Instance>,
    /// A status fetch for `instance` is in flight.
    pub loading: bool,
    /// The selected instance holds the unit.
    pub exists: bool,
    pub root_path: Option<String>,
    /// Series-level monitoring as displayed, which during a pending series
    /// toggle is the speculative value rather than the reconciled one.
    pub series_monitored: bool,
    pub availability: EpisodeStatusMap,
    pub monitored: EpisodeMonitoredMap,
}

impl Snapshot {
    pub(crate) fn new(
        unit: Unit,
        instance: Option<Instance>,
        loading: bool,
        record: Option<&StatusRecord>,
        availability: EpisodeStatusMap,
        monitored: EpisodeMonitoredMap,
        optimistic: Option<OptimisticMonitor>,
    ) -> Self {
        let reconciled = record.map(reconcile::series_monitored).unwrap_or(false);
        Snapshot {
            exists: record.map(|r| r.exists).unwrap_or(false),
            root_path: record.and_then(|r| r.root_path.clone()),
            series_monitored: optimistic.map(|o| o.displayed()).unwrap_or(reconciled),
            unit,
            instance,
            loading,
            availability,
            monitored,
        }
    }

    /// Availability badge for a season.
    pub fn season_badge(&self, season_number: u32) -> SeasonBadge {
        let (available, total) = self.season_progress(season_number);
        reconcile::season_badge(total, available)
    }

    /// `(available, total)` episode counts for a season. The total comes
    /// from the catalog, the available count from the reconciled map.
    pub fn season_progress(&self, season_number: u32) -> (u32, u32) {
        let total = self.unit.episode_total(season_number);
        let available = self
            .availability
            .get(&season_number)
            .map(|episodes| episodes.len() as u32)
            .unwrap_or(0);
        (available, total)
    }

    /// Catalog episodes the instance is still missing for a season.
    pub fn season_missing(&self, season_number: u32) -> u32 {
        let (available, total) = self.season_progress(season_number);
        reconcile::missing_count(total, available)
    }

    /// Whether the request control for a season should be enabled.
    pub fn request_season_enabled(&self, season_number: u32) -> bool {
        self.season_badge(season_number).request_enabled()
    }

    /// Reconciled availability of one episode; `None` means unavailable.
    pub fn episode_status(&self, season_number: u32, episode_number: u32) -> Option<&Availability> {
        self.availability.get(&season_number).and_then(|episodes| episodes.get(&episode_number))
    }

    /// Per-episode monitoring flag. Reads as false for everything the
    /// selected instance does not track, so external instances are always
    /// unmonitored here.
    pub fn episode_monitored(&self, season_number: u32, episode_number: u32) -> bool {
        self.monitored
            .get(&season_number)
            .and_then(|episodes| episodes.get(&episode_number))
            .copied()
            .unwrap_or(false)
    }
}
