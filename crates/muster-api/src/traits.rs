//! Trait definition for backend access.
//!
//! The view engine drives everything (catalog lookups, instance discovery,
//! status fetches, mutations) through this one interface, so the engine
//! stays transport-agnostic and tests can substitute a scripted backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use muster_core::models::{Episode, Instance, InstanceKind, StatusRecord, Unit};

/// A unified interface to the dashboard backend.
pub trait MediaBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the catalog record for a unit.
    fn fetch_unit(&self, unit_id: u64) -> impl Future<Output = Result<Unit, Self::Error>> + Send;

    /// Fetch the catalog episode list for one season of a unit.
    fn fetch_season_episodes(
        &self,
        unit_id: u64,
        season_number: u32,
    ) -> impl Future<Output = Result<Vec<Episode>, Self::Error>> + Send;

    /// List the configured instances of one kind.
    fn list_instances(
        &self,
        kind: InstanceKind,
    ) -> impl Future<Output = Result<Vec<Instance>, Self::Error>> + Send;

    /// Fetch one instance's view of a unit, normalized from the
    /// kind-specific wire shape into a [`StatusRecord`].
    fn fetch_status(
        &self,
        unit_id: u64,
        instance: &Instance,
    ) -> impl Future<Output = Result<StatusRecord, Self::Error>> + Send;

    /// Apply a monitor change on an instance. Rejections are errors; the
    /// caller decides how to surface them.
    fn set_monitor(
        &self,
        unit_id: u64,
        instance: &Instance,
        change: MonitorChange,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Submit a content request. Requests for the two instance kinds take
    /// different routes, but that is the implementation's concern; the
    /// caller contract is identical for both.
    fn submit_request(
        &self,
        instance: &Instance,
        request: &UnitRequest,
    ) -> impl Future<Output = Result<RequestReceipt, Self::Error>> + Send;
}

/// A monitor mutation at series, season, or episode granularity. Doubles
/// as the wire body of the monitor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorChange {
    pub monitored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

/// A content request to be routed to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRequest {
    pub unit_id: u64,
    pub unit_title: String,
    pub scope: RequestScope,
}

/// Granularity of a content request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestScope {
    /// The whole unit (the only scope that makes sense for movies).
    Unit,
    /// One season.
    Season(u32),
    /// One episode, addressed as (season, episode).
    Episode(u32, u32),
}

impl RequestScope {
    pub fn granularity(&self) -> &'static str {
        match self {
            RequestScope::Unit => "unit",
            RequestScope::Season(_) => "season",
            RequestScope::Episode(..) => "episode",
        }
    }

    pub fn season_number(&self) -> Option<u32> {
        match self {
            RequestScope::Unit => None,
            RequestScope::Season(season) | RequestScope::Episode(season, _) => Some(*season),
        }
    }

    pub fn episode_number(&self) -> Option<u32> {
        match self {
            RequestScope::Episode(_, episode) => Some(*episode),
            _ => None,
        }
    }
}

/// Backend verdict on a submitted request. `message` carries the backend's
/// own wording and is surfaced to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReceipt {
    pub success: bool,
    pub message: Option<String>,
}
