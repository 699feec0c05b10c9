//! Run with: cargo run -p muster-runtime --example status -- <unit-id>
//!
//! Opens a detail view for one catalog unit, prints the reconciled status
//! of the preferred instance, then exits.

use std::sync::Arc;

use muster_api::HubClient;
use muster_core::config::AppConfig;
use muster_runtime::DetailView;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("muster=debug")
        .init();

    let unit_id = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);

    let config = AppConfig::load()?;
    let backend = Arc::new(HubClient::from_config(&config.hub)?);
    let view = DetailView::open(backend, unit_id, &config).await?;

    let snapshot = view.snapshot().await;
    println!("{} ({})", snapshot.unit.title, snapshot.unit.media_type);
    match &snapshot.instance {
        Some(instance) => println!("Instance: {} ({})", instance.name, instance.kind),
        None => {
            println!("No instances configured.");
            return Ok(());
        }
    }

    if !snapshot.exists {
        println!("Not present on this instance.");
        return Ok(());
    }

    println!("Monitored: {}", if snapshot.series_monitored { "yes" } else { "no" });
    if let Some(path) = &snapshot.root_path {
        println!("Path: {path}");
    }
    for season in &snapshot.unit.seasons {
        let n = season.season_number;
        let (available, total) = snapshot.season_progress(n);
        println!("  S{n:02}: {} {available}/{total}", snapshot.season_badge(n));
    }

    Ok(())
}
