pub mod mutate;
pub mod snapshot;
pub mod view;

pub use mutate::{MonitorLevel, RequestOutcome, ToggleOutcome};
pub use snapshot::Snapshot;
pub use view::{DetailView, ViewError};
