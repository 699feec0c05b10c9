//! Normalization of per-instance status records into canonical maps.
//!
//! Instance kinds disagree about how availability is expressed: some set an
//! explicit flag per episode, others only attach a quality label or a file
//! reference. Everything downstream (badges, progress counts, request
//! gating) reads the maps built here and never the raw record, so the
//! disagreement stays contained in this module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    Availability, EpisodeMonitoredMap, EpisodeStatus, EpisodeStatusMap, InstanceKind, SeasonStatus,
    StatusRecord,
};

// ── Availability ─────────────────────────────────────────────────

/// Collapse an episode's indicators into one verdict: available if the
/// explicit flag is set, a non-blank quality label is attached, or a file
/// reference is present. Returns `None` for unavailable episodes so the
/// map stays sparse.
fn episode_availability(episode: &EpisodeStatus) -> Option<Availability> {
    let has_quality = episode.quality.as_deref().is_some_and(|q| !q.is_empty());
    let available = episode.available || has_quality || episode.file.is_some();
    available.then(|| Availability {
        quality: episode.quality.clone().filter(|q| !q.is_empty()),
    })
}

fn season_entries(season: &SeasonStatus) -> BTreeMap<u32, Availability> {
    season
        .episodes
        .iter()
        .filter_map(|ep| episode_availability(ep).map(|a| (ep.episode_number, a)))
        .collect()
}

/// Availability map for one season of a record. Empty when the unit does
/// not exist on the instance or the instance does not report the season.
pub fn season_availability(record: &StatusRecord, season_number: u32) -> BTreeMap<u32, Availability> {
    if !record.exists {
        return BTreeMap::new();
    }
    record.season(season_number).map(season_entries).unwrap_or_default()
}

/// Availability maps for every season the record reports.
pub fn availability_map(record: &StatusRecord) -> EpisodeStatusMap {
    if !record.exists {
        return EpisodeStatusMap::new();
    }
    record
        .seasons
        .iter()
        .map(|season| (season.season_number, season_entries(season)))
        .collect()
}

// ── Monitoring ───────────────────────────────────────────────────

/// Per-episode monitored flags. Only native instances track monitoring, so
/// every other kind reconciles to an empty map and reads as unmonitored.
pub fn monitored_map(record: &StatusRecord, kind: InstanceKind) -> EpisodeMonitoredMap {
    if kind != InstanceKind::Native || !record.exists {
        return EpisodeMonitoredMap::new();
    }
    record
        .seasons
        .iter()
        .map(|season| {
            let episodes = season
                .episodes
                .iter()
                .map(|ep| (ep.episode_number, ep.monitored.unwrap_or(false)))
                .collect();
            (season.season_number, episodes)
        })
        .collect()
}

/// Series-level monitoring flag; a unit absent from the instance is never
/// monitored.
pub fn series_monitored(record: &StatusRecord) -> bool {
    record.exists && record.monitored.unwrap_or(false)
}

// ── Season badges ────────────────────────────────────────────────

/// Availability classification of a season, driven by the catalog's
/// episode count and the reconciled availability count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonBadge {
    /// The catalog has no episode count; nothing can be concluded.
    Unknown,
    /// No episode of the season is available.
    Empty,
    /// Some episodes are available, some are missing.
    Partial,
    /// Every catalog episode is available.
    Complete,
}

impl SeasonBadge {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonBadge::Unknown => "unknown",
            SeasonBadge::Empty => "empty",
            SeasonBadge::Partial => "partial",
            SeasonBadge::Complete => "complete",
        }
    }

    /// Whether a request control for this season should be enabled. An
    /// unknown season has nothing concrete to request, a complete one
    /// nothing left.
    pub fn request_enabled(&self) -> bool {
        matches!(self, SeasonBadge::Empty | SeasonBadge::Partial)
    }
}

impl std::fmt::Display for SeasonBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a season. Instances occasionally hold more episodes than the
/// catalog lists (specials folded in, count drift after a refresh), so
/// complete is `available >= total` rather than strict equality.
pub fn season_badge(total: u32, available: u32) -> SeasonBadge {
    if total == 0 {
        SeasonBadge::Unknown
    } else if available == 0 {
        SeasonBadge::Empty
    } else if available >= total {
        SeasonBadge::Complete
    } else {
        SeasonBadge::Partial
    }
}

/// Episodes the instance is still missing, clamped at zero under the same
/// catalog drift that makes `season_badge` use a floor.
pub fn missing_count(total: u32, available: u32) -> u32 {
    total.saturating_sub(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: u32, available: bool) -> EpisodeStatus {
        EpisodeStatus {
            episode_number: number,
            available,
            ..EpisodeStatus::default()
        }
    }

    fn record_with_season(season_number: u32, episodes: Vec<EpisodeStatus>) -> StatusRecord {
        StatusRecord {
            exists: true,
            monitored: Some(true),
            root_path: None,
            seasons: vec![SeasonStatus {
                season_number,
                monitored: Some(true),
                episodes,
            }],
        }
    }

    #[test]
    fn test_absent_record_reconciles_empty() {
        let record = StatusRecord::absent();
        assert!(availability_map(&record).is_empty());
        assert!(monitored_map(&record, InstanceKind::Native).is_empty());
        assert!(!series_monitored(&record));
    }

    #[test]
    fn test_exists_false_overrides_reported_seasons() {
        // A malformed payload can carry seasons alongside exists=false;
        // nothing from it may leak through.
        let mut record = record_with_season(1, vec![episode(1, true)]);
        record.exists = false;
        assert!(availability_map(&record).is_empty());
        assert!(season_availability(&record, 1).is_empty());
        assert!(monitored_map(&record, InstanceKind::Native).is_empty());
        assert!(!series_monitored(&record));
    }

    #[test]
    fn test_unreported_season_reconciles_empty() {
        let record = record_with_season(1, vec![episode(1, true)]);
        assert!(season_availability(&record, 2).is_empty());
    }

    #[test]
    fn test_explicit_flag_counts_as_available() {
        let record = record_with_season(1, vec![episode(1, true), episode(2, false)]);
        let map = season_availability(&record, 1);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_quality_label_counts_as_available() {
        let mut ep = episode(3, false);
        ep.quality = Some("1080p".to_string());
        let record = record_with_season(1, vec![ep]);
        let map = season_availability(&record, 1);
        assert_eq!(map.get(&3).and_then(|a| a.quality.as_deref()), Some("1080p"));
    }

    #[test]
    fn test_file_reference_counts_as_available() {
        let mut ep = episode(4, false);
        ep.file = Some("/library/show/s01e04.mkv".to_string());
        let record = record_with_season(1, vec![ep]);
        let map = season_availability(&record, 1);
        assert!(map.contains_key(&4));
        assert_eq!(map.get(&4).and_then(|a| a.quality.as_deref()), None);
    }

    #[test]
    fn test_blank_quality_is_not_available() {
        let mut ep = episode(5, false);
        ep.quality = Some(String::new());
        let record = record_with_season(1, vec![ep]);
        assert!(season_availability(&record, 1).is_empty());
    }

    #[test]
    fn test_blank_quality_stripped_from_decoration() {
        let mut ep = episode(6, true);
        ep.quality = Some(String::new());
        let record = record_with_season(1, vec![ep]);
        let map = season_availability(&record, 1);
        assert_eq!(map.get(&6), Some(&Availability { quality: None }));
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let mut ep = episode(1, true);
        ep.quality = Some("720p".to_string());
        let record = record_with_season(2, vec![ep, episode(2, false)]);
        assert_eq!(availability_map(&record), availability_map(&record));
        assert_eq!(
            monitored_map(&record, InstanceKind::Native),
            monitored_map(&record, InstanceKind::Native)
        );
    }

    #[test]
    fn test_monitored_map_is_native_only() {
        let mut ep = episode(1, true);
        ep.monitored = Some(true);
        let record = record_with_season(1, vec![ep]);

        let native = monitored_map(&record, InstanceKind::Native);
        assert_eq!(native.get(&1).and_then(|m| m.get(&1)), Some(&true));
        assert!(monitored_map(&record, InstanceKind::External).is_empty());
    }

    #[test]
    fn test_monitored_defaults_to_false_when_unreported() {
        let record = record_with_season(1, vec![episode(1, true)]);
        let map = monitored_map(&record, InstanceKind::Native);
        assert_eq!(map.get(&1).and_then(|m| m.get(&1)), Some(&false));
    }

    #[test]
    fn test_series_monitored_requires_exists() {
        let mut record = record_with_season(1, vec![]);
        assert!(series_monitored(&record));
        record.exists = false;
        assert!(!series_monitored(&record));
        record.exists = true;
        record.monitored = None;
        assert!(!series_monitored(&record));
    }

    #[test]
    fn test_badge_classification() {
        assert_eq!(season_badge(0, 0), SeasonBadge::Unknown);
        assert_eq!(season_badge(0, 3), SeasonBadge::Unknown);
        assert_eq!(season_badge(10, 0), SeasonBadge::Empty);
        assert_eq!(season_badge(10, 4), SeasonBadge::Partial);
        assert_eq!(season_badge(10, 10), SeasonBadge::Complete);
    }

    #[test]
    fn test_badge_complete_tolerates_count_drift() {
        assert_eq!(season_badge(10, 12), SeasonBadge::Complete);
    }

    #[test]
    fn test_missing_count_saturates() {
        assert_eq!(missing_count(10, 4), 6);
        assert_eq!(missing_count(10, 12), 0);
    }

    #[test]
    fn test_request_enabled_per_badge() {
        assert!(!SeasonBadge::Unknown.request_enabled());
        assert!(SeasonBadge::Empty.request_enabled());
        assert!(SeasonBadge::Partial.request_enabled());
        assert!(!SeasonBadge::Complete.request_enabled());
    }
}
