mod catalog;
mod instance;
mod status;

pub use catalog::{Episode, MediaType, SeasonSummary, Unit};
pub use instance::{Instance, InstanceKind};
pub use status::{
    Availability, EpisodeMonitoredMap, EpisodeStatus, EpisodeStatusMap, SeasonStatus, StatusRecord,
};
