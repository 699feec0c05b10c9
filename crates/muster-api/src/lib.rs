pub mod hub;
pub mod traits;

pub use hub::{HubClient, HubError};
pub use traits::MediaBackend;
