//! The per-unit detail view engine.
//!
//! A [`DetailView`] owns everything a detail page needs for one catalog
//! unit: the instance selection, the reconciled status of the selected
//! instance, and the mutation plumbing. State mutates only behind one
//! lock, every change publishes a fresh [`Snapshot`], and in-flight fetch
//! responses are matched against the selection that issued them so a
//! stale answer can never clobber a newer one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use muster_api::traits::{MediaBackend, MonitorChange, RequestScope, UnitRequest};
use muster_core::config::AppConfig;
use muster_core::models::{
    Availability, Episode, EpisodeMonitoredMap, EpisodeStatusMap, Instance, InstanceKind,
    StatusRecord, Unit,
};
use muster_core::reconcile::{self, SeasonBadge};

use crate::mutate::{MonitorLevel, OptimisticMonitor, RequestOutcome, ToggleOutcome};
use crate::snapshot::Snapshot;

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Mutable state of one detail view. Record, availability map, and
/// monitored map always describe the same fetch and are only ever replaced
/// together; `epoch` increments whenever the state is invalidated so that
/// responses issued before the invalidation can be recognized and dropped.
struct ViewState {
    instances: Vec<Instance>,
    selection: Option<Instance>,
    record: Option<StatusRecord>,
    availability: EpisodeStatusMap,
    monitored: EpisodeMonitoredMap,
    optimistic: Option<OptimisticMonitor>,
    episodes: BTreeMap<u32, Vec<Episode>>,
    loading: bool,
    epoch: u64,
    snapshot: Arc<Snapshot>,
}

impl ViewState {
    fn new(unit: &Unit, instances: Vec<Instance>, selection: Option<Instance>) -> Self {
        let snapshot = Arc::new(Snapshot::new(
            unit.clone(),
            selection.clone(),
            false,
            None,
            EpisodeStatusMap::new(),
            EpisodeMonitoredMap::new(),
            None,
        ));
        ViewState {
            instances,
            selection,
            record: None,
            availability: EpisodeStatusMap::new(),
            monitored: EpisodeMonitoredMap::new(),
            optimistic: None,
            episodes: BTreeMap::new(),
            loading: false,
            epoch: 0,
            snapshot,
        }
    }
}

/// Rebuild the snapshot from the current state and hand it to subscribers.
/// Nobody listening is fine.
fn publish(unit: &Unit, state: &mut ViewState, changes: &broadcast::Sender<Arc<Snapshot>>) {
    let snapshot = Arc::new(Snapshot::new(
        unit.clone(),
        state.selection.clone(),
        state.loading,
        state.record.as_ref(),
        state.availability.clone(),
        state.monitored.clone(),
        state.optimistic,
    ));
    state.snapshot = snapshot.clone();
    let _ = changes.send(snapshot);
}

/// Fetch the selected instance's status and fold it into the state.
///
/// A failed or malformed fetch degrades to [`StatusRecord::absent`], so
/// downstream consumers see a unit that is simply not there instead of an
/// error. The response is applied only if the epoch and selection still
/// match the fetch that was issued.
async fn fetch_once<B: MediaBackend>(
    backend: &B,
    unit: &Unit,
    state: &RwLock<ViewState>,
    changes: &broadcast::Sender<Arc<Snapshot>>,
) {
    let (instance, epoch) = {
        let mut guard = state.write().await;
        let Some(instance) = guard.selection.clone() else {
            guard.record = Some(StatusRecord::absent());
            guard.availability = EpisodeStatusMap::new();
            guard.monitored = EpisodeMonitoredMap::new();
            guard.loading = false;
            publish(unit, &mut guard, changes);
            return;
        };
        guard.loading = true;
        publish(unit, &mut guard, changes);
        (instance, guard.epoch)
    };

    let record = match backend.fetch_status(unit.id, &instance).await {
        Ok(record) => record,
        Err(e) => {
            warn!(instance = %instance.name, error = %e, "status fetch failed, treating unit as absent");
            StatusRecord::absent()
        }
    };

    let mut guard = state.write().await;
    if guard.epoch != epoch || guard.selection.as_ref().map(|i| i.key()) != Some(instance.key()) {
        debug!(instance = %instance.name, "discarding stale status response");
        return;
    }
    guard.availability = reconcile::availability_map(&record);
    guard.monitored = reconcile::monitored_map(&record, instance.kind);
    guard.record = Some(record);
    guard.optimistic = None;
    guard.loading = false;
    publish(unit, &mut guard, changes);
}

/// Reconciliation engine for one unit's detail page.
pub struct DetailView<B> {
    backend: Arc<B>,
    unit: Arc<Unit>,
    state: Arc<RwLock<ViewState>>,
    changes: broadcast::Sender<Arc<Snapshot>>,
    refetch_offsets: Vec<Duration>,
}

impl<B: MediaBackend + 'static> DetailView<B> {
    /// Open a detail view: fetch the catalog unit, discover the configured
    /// instances of both kinds, pick the initial selection, and reconcile
    /// its status. A failing registry listing degrades to no instances of
    /// that kind; a missing catalog unit is an error.
    pub async fn open(backend: Arc<B>, unit_id: u64, config: &AppConfig) -> Result<Self, ViewError> {
        let unit = backend
            .fetch_unit(unit_id)
            .await
            .map_err(|e| ViewError::Backend(e.to_string()))?;

        let listings = futures::future::join_all(
            InstanceKind::ALL.iter().map(|kind| backend.list_instances(*kind)),
        )
        .await;

        let mut instances = Vec::new();
        for (kind, listed) in InstanceKind::ALL.iter().zip(listings) {
            match listed {
                Ok(batch) => instances.extend(batch),
                Err(e) => {
                    warn!(unit = unit_id, kind = %kind, error = %e, "instance registry listing failed")
                }
            }
        }

        let view = Self::from_parts(backend, unit, instances, config.refetch.offsets());
        view.refresh().await;
        Ok(view)
    }

    /// Build a view from already-fetched parts without touching the
    /// backend. The first native instance is selected, the first instance
    /// of any kind when there is no native one.
    pub fn from_parts(
        backend: Arc<B>,
        unit: Unit,
        instances: Vec<Instance>,
        refetch_offsets: Vec<Duration>,
    ) -> Self {
        let selection = instances
            .iter()
            .find(|i| i.kind == InstanceKind::Native)
            .or_else(|| instances.first())
            .cloned();
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        let state = ViewState::new(&unit, instances, selection);
        DetailView {
            backend,
            unit: Arc::new(unit),
            state: Arc::new(RwLock::new(state)),
            changes,
            refetch_offsets,
        }
    }

    /// The catalog unit this view describes.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Instances discovered when the view was opened.
    pub async fn instances(&self) -> Vec<Instance> {
        self.state.read().await.instances.clone()
    }

    /// The instance the view currently describes.
    pub async fn selected_instance(&self) -> Option<Instance> {
        self.state.read().await.selection.clone()
    }

    /// Subscribe to snapshot replacements. Every state change publishes the
    /// complete new snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.changes.subscribe()
    }

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.state.read().await.snapshot.clone()
    }

    /// Series-level monitoring as displayed right now.
    pub async fn series_monitored(&self) -> bool {
        self.state.read().await.snapshot.series_monitored
    }

    /// Availability badge for a season.
    pub async fn season_badge(&self, season_number: u32) -> SeasonBadge {
        self.state.read().await.snapshot.season_badge(season_number)
    }

    /// Reconciled availability of one episode; `None` means unavailable.
    pub async fn episode_status(
        &self,
        season_number: u32,
        episode_number: u32,
    ) -> Option<Availability> {
        self.state
            .read()
            .await
            .snapshot
            .episode_status(season_number, episode_number)
            .cloned()
    }

    /// Per-episode monitoring flag, false for anything untracked.
    pub async fn episode_monitored(&self, season_number: u32, episode_number: u32) -> bool {
        self.state.read().await.snapshot.episode_monitored(season_number, episode_number)
    }

    /// Catalog episode list for a season, fetched on first use and cached
    /// for the lifetime of the view. Instance switches do not invalidate
    /// this; the catalog does not depend on the selection.
    pub async fn season_episodes(&self, season_number: u32) -> Result<Vec<Episode>, ViewError> {
        if let Some(cached) = self.state.read().await.episodes.get(&season_number) {
            return Ok(cached.clone());
        }
        let episodes = self
            .backend
            .fetch_season_episodes(self.unit.id, season_number)
            .await
            .map_err(|e| ViewError::Backend(e.to_string()))?;
        let mut state = self.state.write().await;
        let cached = state.episodes.entry(season_number).or_insert(episodes);
        Ok(cached.clone())
    }

    /// Switch the view to another instance. Record, availability, and
    /// monitoring are invalidated together in one step before the new
    /// instance's status is fetched, so no read can ever see season data
    /// from one instance next to episode data from another.
    pub async fn select_instance(&self, instance: Instance) {
        {
            let mut state = self.state.write().await;
            state.epoch += 1;
            state.selection = Some(instance);
            state.record = None;
            state.availability = EpisodeStatusMap::new();
            state.monitored = EpisodeMonitoredMap::new();
            state.optimistic = None;
            state.loading = true;
            publish(&self.unit, &mut state, &self.changes);
        }
        self.refresh().await;
    }

    /// Re-fetch the selected instance's status and reconcile it.
    pub async fn refresh(&self) {
        fetch_once(self.backend.as_ref(), &self.unit, &self.state, &self.changes).await;
    }

    /// Toggle monitoring at the given granularity, resolving the finest
    /// qualifier supplied. The series-level toggle is rendered
    /// optimistically: the flip is published before the mutation resolves,
    /// committed by an authoritative re-fetch on success, and rolled back
    /// with no re-fetch on failure. Season and episode toggles skip the
    /// speculative phase.
    pub async fn toggle_monitor(
        &self,
        season_number: Option<u32>,
        episode_number: Option<u32>,
    ) -> ToggleOutcome {
        let level = match MonitorLevel::resolve(season_number, episode_number) {
            Ok(level) => level,
            Err(message) => return ToggleOutcome::failed(message),
        };
        if let Some(n) = level.season_number() {
            if self.unit.season(n).is_none() {
                return ToggleOutcome::failed(format!("season {n} is not in the catalog"));
            }
        }
        let Some(instance) = self.selected_instance().await else {
            return ToggleOutcome::unavailable();
        };

        // The toggle inverts whatever is currently displayed, so a record
        // has to be in the cache before the target can be computed.
        if self.state.read().await.record.is_none() {
            self.refresh().await;
        }

        let (change, epoch) = {
            let mut state = self.state.write().await;
            let reconciled = match level {
                MonitorLevel::Series => {
                    state.record.as_ref().map(reconcile::series_monitored).unwrap_or(false)
                }
                MonitorLevel::Season(n) => state
                    .record
                    .as_ref()
                    .and_then(|r| r.season(n))
                    .and_then(|s| s.monitored)
                    .unwrap_or(false),
                MonitorLevel::Episode(n, e) => {
                    state.monitored.get(&n).and_then(|m| m.get(&e)).copied().unwrap_or(false)
                }
            };
            let current = match level {
                MonitorLevel::Series => {
                    state.optimistic.map(|o| o.displayed()).unwrap_or(reconciled)
                }
                _ => reconciled,
            };
            let target = !current;
            if level == MonitorLevel::Series {
                state.optimistic = Some(OptimisticMonitor::pending(current, target));
                publish(&self.unit, &mut state, &self.changes);
            }
            let change = MonitorChange {
                monitored: target,
                season_number: level.season_number(),
                episode_number: level.episode_number(),
            };
            (change, state.epoch)
        };

        match self.backend.set_monitor(self.unit.id, &instance, change).await {
            Ok(()) => {
                {
                    let mut state = self.state.write().await;
                    if state.epoch == epoch {
                        state.optimistic = state.optimistic.map(OptimisticMonitor::commit);
                    }
                }
                self.refresh().await;
                info!(
                    unit = self.unit.id,
                    level = ?level,
                    monitored = change.monitored,
                    "monitor change applied"
                );
                ToggleOutcome::applied(change.monitored)
            }
            Err(e) => {
                if level == MonitorLevel::Series {
                    let mut state = self.state.write().await;
                    if state.epoch == epoch {
                        state.optimistic = state.optimistic.map(OptimisticMonitor::roll_back);
                        publish(&self.unit, &mut state, &self.changes);
                    }
                }
                warn!(unit = self.unit.id, error = %e, "monitor change failed");
                ToggleOutcome::failed(e.to_string())
            }
        }
    }

    /// Request content for the unit, a season, or an episode. A backend
    /// refusal comes back as `success: false` with the backend's message
    /// verbatim and changes nothing locally. An accepted request triggers
    /// the configured re-fetch schedule, because backends queue requests
    /// and apply them on their own time.
    pub async fn request_unit(&self, scope: RequestScope) -> RequestOutcome {
        if let Some(n) = scope.season_number() {
            if self.unit.season(n).is_none() {
                return RequestOutcome::failed(format!("season {n} is not in the catalog"));
            }
        }
        let Some(instance) = self.selected_instance().await else {
            return RequestOutcome::unavailable();
        };

        let request = UnitRequest {
            unit_id: self.unit.id,
            unit_title: self.unit.title.clone(),
            scope,
        };
        match self.backend.submit_request(&instance, &request).await {
            Ok(receipt) => {
                if receipt.success {
                    info!(
                        unit = self.unit.id,
                        granularity = scope.granularity(),
                        "content request accepted"
                    );
                    self.run_refetch_schedule().await;
                } else {
                    info!(unit = self.unit.id, "content request refused");
                }
                RequestOutcome {
                    success: receipt.success,
                    message: receipt.message,
                }
            }
            Err(e) => {
                warn!(unit = self.unit.id, error = %e, "content request failed");
                RequestOutcome::failed(e.to_string())
            }
        }
    }

    /// Zero offsets re-fetch inline; the rest are spawned. A spawned
    /// re-fetch holds only a weak handle, so a view dropped in the
    /// meantime stays dropped, and the epoch check drops the result if the
    /// selection moved on.
    async fn run_refetch_schedule(&self) {
        for offset in self.refetch_offsets.iter().copied() {
            if offset.is_zero() {
                self.refresh().await;
                continue;
            }
            let backend = Arc::clone(&self.backend);
            let unit = Arc::clone(&self.unit);
            let state = Arc::downgrade(&self.state);
            let changes = self.changes.clone();
            tokio::spawn(async move {
                tokio::time::sleep(offset).await;
                let Some(state) = state.upgrade() else { return };
                fetch_once(backend.as_ref(), &unit, &state, &changes).await;
            });
        }
    }
}
