//! Mutation bookkeeping for the detail view: toggle granularity, the
//! optimistic series-toggle state machine, and the outcome types handed to
//! the presentation layer.

use serde::{Deserialize, Serialize};

/// Granularity of a monitor toggle. The finest qualifier supplied wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorLevel {
    Series,
    Season(u32),
    Episode(u32, u32),
}

impl MonitorLevel {
    /// Resolve from optional qualifiers: episode beats season beats series.
    /// An episode number without its season is unroutable.
    pub fn resolve(season: Option<u32>, episode: Option<u32>) -> Result<Self, String> {
        match (season, episode) {
            (Some(s), Some(e)) => Ok(MonitorLevel::Episode(s, e)),
            (Some(s), None) => Ok(MonitorLevel::Season(s)),
            (None, None) => Ok(MonitorLevel::Series),
            (None, Some(_)) => Err("an episode toggle requires its season number".to_string()),
        }
    }

    pub fn season_number(&self) -> Option<u32> {
        match self {
            MonitorLevel::Series => None,
            MonitorLevel::Season(season) | MonitorLevel::Episode(season, _) => Some(*season),
        }
    }

    pub fn episode_number(&self) -> Option<u32> {
        match self {
            MonitorLevel::Episode(_, episode) => Some(*episode),
            _ => None,
        }
    }
}

/// Phase of a speculative series-monitor flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    /// Flip shown, mutation still in flight.
    Pending,
    /// Mutation accepted; the flip stands until the authoritative re-fetch
    /// replaces it.
    Committed,
    /// Mutation failed; the pre-toggle value is shown again.
    RolledBack,
}

/// A speculative series-monitor flip. Only the series-level toggle is
/// rendered optimistically; season and episode toggles wait for the
/// authoritative re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticMonitor {
    pub previous: bool,
    pub target: bool,
    pub phase: TogglePhase,
}

impl OptimisticMonitor {
    pub fn pending(previous: bool, target: bool) -> Self {
        OptimisticMonitor {
            previous,
            target,
            phase: TogglePhase::Pending,
        }
    }

    pub fn commit(self) -> Self {
        OptimisticMonitor {
            phase: TogglePhase::Committed,
            ..self
        }
    }

    pub fn roll_back(self) -> Self {
        OptimisticMonitor {
            phase: TogglePhase::RolledBack,
            ..self
        }
    }

    /// The value shown while this flip is alive.
    pub fn displayed(&self) -> bool {
        match self.phase {
            TogglePhase::Pending | TogglePhase::Committed => self.target,
            TogglePhase::RolledBack => self.previous,
        }
    }
}

/// Result of a monitor toggle as shown to the user. The engine resolves
/// every failure into `applied: false` plus a message instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub applied: bool,
    /// Monitoring value now in effect, when applied.
    pub monitored: Option<bool>,
    pub message: Option<String>,
}

impl ToggleOutcome {
    pub fn applied(monitored: bool) -> Self {
        ToggleOutcome {
            applied: true,
            monitored: Some(monitored),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ToggleOutcome {
            applied: false,
            monitored: None,
            message: Some(message.into()),
        }
    }

    pub fn unavailable() -> Self {
        ToggleOutcome::failed("no instance selected")
    }
}

/// Result of a content request as shown to the user. A backend refusal is
/// not an error; its message is passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl RequestOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        RequestOutcome {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn unavailable() -> Self {
        RequestOutcome::failed("no instance selected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_precedence() {
        assert_eq!(MonitorLevel::resolve(None, None), Ok(MonitorLevel::Series));
        assert_eq!(MonitorLevel::resolve(Some(2), None), Ok(MonitorLevel::Season(2)));
        assert_eq!(
            MonitorLevel::resolve(Some(2), Some(5)),
            Ok(MonitorLevel::Episode(2, 5))
        );
        assert!(MonitorLevel::resolve(None, Some(5)).is_err());
    }

    #[test]
    fn test_level_qualifiers() {
        let level = MonitorLevel::Episode(3, 7);
        assert_eq!(level.season_number(), Some(3));
        assert_eq!(level.episode_number(), Some(7));
        assert_eq!(MonitorLevel::Season(3).episode_number(), None);
        assert_eq!(MonitorLevel::Series.season_number(), None);
    }

    #[test]
    fn test_displayed_value_per_phase() {
        let flip = OptimisticMonitor::pending(false, true);
        assert!(flip.displayed());
        assert!(flip.commit().displayed());
        assert!(!flip.roll_back().displayed());
    }
}
