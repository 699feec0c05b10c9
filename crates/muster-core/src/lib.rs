pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;

pub use config::AppConfig;
pub use error::MusterError;
