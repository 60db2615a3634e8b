use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ChannelConfig,
    input::converter::{Converter, DeviceKind},
    procfs::device::DeviceLocator,
    relay::{stream::EventStream, RelayError},
    retry::BackoffTimer,
};

/// Relays a single kind of device for the lifetime of the relay.
///
/// The channel keeps finding the input device, opening both devices and
/// running an [EventStream] until the token is cancelled. Failures are only
/// fatal if the channel was configured with a retry limit.
pub(crate) struct Channel {
    kind: DeviceKind,
    config: ChannelConfig,
    locator: DeviceLocator,
    timer: BackoffTimer,
    /// Consecutive failed attempts
    failures: u32,
    debug: bool,
}

impl Channel {
    pub fn new(kind: DeviceKind, config: ChannelConfig, locator: DeviceLocator, debug: bool) -> Self {
        let timer = BackoffTimer::new(config.backoff.clone());
        Self {
            kind,
            config,
            locator,
            timer,
            failures: 0,
            debug,
        }
    }

    /// Run the channel until cancelled. Fatal errors are sent to the given
    /// error channel before returning.
    pub async fn run(mut self, cancel: CancellationToken, errors: mpsc::Sender<RelayError>) {
        log::debug!("Started {} relay channel", self.kind);
        if let Err(e) = self.relay(&cancel).await {
            log::error!("{} relay failed: {e}", self.kind);
            if let Err(e) = errors.send(e).await {
                log::debug!("Unable to report relay error: {e}");
            }
        }
        log::debug!("Stopped {} relay channel", self.kind);
    }

    async fn relay(&mut self, cancel: &CancellationToken) -> Result<(), RelayError> {
        while !cancel.is_cancelled() {
            // Find the input device
            let input = match self.config.resolve_input(&self.locator) {
                Ok(path) => path,
                Err(e) => {
                    self.retry(cancel, &e.to_string()).await?;
                    continue;
                }
            };
            log::debug!("Found {} at: {input}", self.kind);

            // Open the input and output devices
            let converter = Converter::new(self.kind);
            let stream = match EventStream::open(&input, &self.config.output, converter) {
                Ok(stream) => stream.with_debug(self.debug),
                Err(e) => {
                    self.retry(cancel, &e.to_string()).await?;
                    continue;
                }
            };
            log::info!("Relaying {} from {input} to {}", self.kind, self.config.output);
            self.timer.reset();
            self.failures = 0;

            // Relay events until shutdown or until the device goes away
            match stream.run(cancel).await {
                Ok(()) => break,
                Err(e) => {
                    log::warn!("{} relay error: {e}, reconnecting...", self.kind);
                    self.retry(cancel, &e.to_string()).await?;
                }
            }
        }

        Ok(())
    }

    /// Wait before the next attempt. Returns an error if the retry limit was
    /// reached.
    async fn retry(&mut self, cancel: &CancellationToken, reason: &str) -> Result<(), RelayError> {
        self.failures = self.failures.saturating_add(1);
        if let Some(max_retries) = self.config.max_retries {
            if self.failures > max_retries {
                return Err(RelayError::RetriesExhausted {
                    kind: self.kind,
                    attempts: self.failures,
                    reason: reason.to_string(),
                });
            }
        }

        let delay = self.timer.next_delay();
        log::info!(
            "{} not available: {reason}, retrying in {}ms...",
            self.kind,
            delay.as_millis()
        );
        sleep_or_cancel(cancel, delay).await;

        Ok(())
    }
}

/// Sleep for the given duration, returning early if the token is cancelled
async fn sleep_or_cancel(cancel: &CancellationToken, delay: Duration) {
    tokio::select! {
        _ = cancel.cancelled() => (),
        _ = tokio::time::sleep(delay) => (),
    }
}
