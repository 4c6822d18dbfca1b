//! augmenta-monitor - log every Augmenta lifecycle event
//!
//! Usage: augmenta-monitor [config.json]

use std::process::ExitCode;

use augmenta_core::AugmentaResult;
use augmenta_runtime::{init_logging_from_config, AugmentaReceiver, ReceiverConfig};
use tracing::{error, info};

async fn run() -> AugmentaResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ReceiverConfig::from_file(path)?,
        None => ReceiverConfig::default(),
    };
    init_logging_from_config(&config)?;

    info!("Starting augmenta-monitor v{}", env!("CARGO_PKG_VERSION"));

    let receiver = AugmentaReceiver::create(&config).await?;
    receiver.subscribe(|event| match serde_json::to_string(event) {
        Ok(json) => info!(kind = ?event.kind(), "{}", json),
        Err(e) => error!("Failed to serialize event: {}", e),
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }

    let stats = receiver.stats();
    info!(
        ingested = stats.messages_ingested,
        dropped = stats.messages_dropped,
        events = stats.events_emitted,
        scene_snapshots = stats.scene_snapshots,
        video_output_snapshots = stats.video_output_snapshots,
        objects = ?receiver.session().object_ids(),
        "Shutting down"
    );
    receiver.disconnect();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("augmenta-monitor: {}", e);
            ExitCode::FAILURE
        }
    }
}
