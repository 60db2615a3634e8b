use std::{error::Error, io};

use tokio::signal::unix::{signal, SignalKind};

use crate::{config::RelayConfig, host, relay::Relay};

/// Run the relay until a termination signal is received
pub async fn handle_run(config: RelayConfig, skip_host_check: bool) -> Result<(), Box<dyn Error>> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting HID relay v{}", VERSION);

    if skip_host_check {
        log::warn!("Skipping USB host support check");
    } else {
        let support = host::probe("/");
        if !support.has_capability {
            return Err("USB host mode is not supported".into());
        }
        if !support.is_enabled {
            return Err("USB host mode is not enabled".into());
        }
        log::info!("USB host mode is supported and enabled");
    }

    let mut relay = Relay::new(config);

    // Setup CTRL+C and SIGTERM handler
    let handle = relay.shutdown_handle();
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            log::error!("Unable to listen for termination signals: {e}");
            return;
        }
        log::info!("Received termination signal");
        handle.shutdown();
    });

    if let Err(e) = relay.run().await {
        log::error!("Relay stopped with error: {e}");
        return Err(e.into());
    }

    log::info!("Relay stopped successfully");

    Ok(())
}

/// Wait for either SIGINT or SIGTERM
async fn wait_for_signal() -> io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => (),
    }

    Ok(())
}
