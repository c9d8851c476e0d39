use anyhow::Context;
use nordic_blinky::domain::models::SessionOutcome;
use nordic_blinky::domain::settings::SettingsService;
use nordic_blinky::infrastructure::bluetooth::{BleScanner, BlinkySession};
use nordic_blinky::infrastructure::{console, logging, shutdown};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_service = SettingsService::new()?;
    let settings = settings_service.get().clone();
    let _log_guard = logging::init_logger(&settings.log_settings)?;
    info!("Starting Nordic Blinky (settings: {:?})", settings_service.path());
    if let Some(reason) = settings_service.load_error() {
        warn!(
            "Ignoring unreadable settings {:?}, using defaults: {}",
            settings_service.path(),
            reason
        );
    }

    settings.validate().context("invalid settings")?;

    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(console::run_reporter(event_receiver));

    let (trigger, signal) = shutdown::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Interrupt received, stopping (press Ctrl-C again to exit immediately)");
        trigger.trigger();

        // A radio call that never returns must not keep the process alive
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second interrupt received, exiting");
            std::process::exit(130);
        }
    });

    let radio = BleScanner::new(settings.adapter_index).await?;
    let target_name = settings.target_name.clone();
    let session = BlinkySession::new(radio, settings, event_sender);
    let result = session.run(signal).await;

    // Closing the channel lets the reporter drain and exit
    drop(session);
    if let Err(e) = reporter.await {
        error!("Console reporter failed: {}", e);
    }

    match result? {
        SessionOutcome::DeviceNotFound => {
            println!(
                "No device with name '{}' found. Closing program.",
                target_name
            );
        }
        outcome => info!("Session finished: {:?}", outcome),
    }
    Ok(())
}
