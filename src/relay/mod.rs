mod channel;
pub mod stream;

use std::time::Duration;

use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RelayConfig,
    drivers::hidg::driver,
    input::converter::DeviceKind,
    procfs::device::DeviceLocator,
};

use self::channel::Channel;

/// Every relayed kind of device, one channel each
const CHANNELS: [DeviceKind; 2] = [DeviceKind::Mouse, DeviceKind::Keyboard];
/// How long to wait for channels to finish after shutdown
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_millis(100);

/// Errors that stop the relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{kind} relay gave up after {attempts} attempts: {reason}")]
    RetriesExhausted {
        kind: DeviceKind,
        attempts: u32,
        reason: String,
    },
}

/// Handle used to request the shutdown of a running [Relay]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Request the relay to shut down
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

/// Relays the mouse and keyboard to their HID gadget devices.
///
/// The [Relay] runs one task per device. Both tasks share a single
/// cancellation token and report fatal errors through a shared channel
/// with room for one error per task.
pub struct Relay {
    config: RelayConfig,
    locator: DeviceLocator,
    /// Cancelled to stop all channels
    cancel: CancellationToken,
    /// Cancelled when a shutdown was requested from outside
    requested: CancellationToken,
    errors_tx: mpsc::Sender<RelayError>,
    errors_rx: mpsc::Receiver<RelayError>,
    tasks: Vec<JoinHandle<()>>,
}

impl Relay {
    /// Create a new relay with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        let (errors_tx, errors_rx) = mpsc::channel(CHANNELS.len());
        let locator = DeviceLocator::new(config.devices_path.clone());
        Self {
            config,
            locator,
            cancel: CancellationToken::new(),
            requested: CancellationToken::new(),
            errors_tx,
            errors_rx,
            tasks: Vec::with_capacity(CHANNELS.len()),
        }
    }

    /// Returns a handle that can be used to stop the relay from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            token: self.requested.clone(),
        }
    }

    /// Start relaying and wait until a shutdown is requested or a channel
    /// fails. The relay is shut down before this returns.
    pub async fn run(&mut self) -> Result<(), RelayError> {
        log::info!("HID relay starting...");
        self.start();

        let result = tokio::select! {
            _ = self.requested.cancelled() => Ok(()),
            Some(error) = self.errors_rx.recv() => Err(error),
        };

        self.shutdown().await;
        result
    }

    /// Spawn a task for every channel
    fn start(&mut self) {
        for kind in CHANNELS {
            let channel = Channel::new(
                kind,
                self.config.channel(kind).clone(),
                self.locator.clone(),
                self.config.debug,
            );
            let cancel = self.cancel.clone();
            let errors = self.errors_tx.clone();
            self.tasks.push(tokio::spawn(channel.run(cancel, errors)));
        }
    }

    /// Stop all channels and make sure the host sees every key and button as
    /// released.
    pub async fn shutdown(&mut self) {
        log::info!("Shutting down...");
        self.cancel.cancel();

        // Channels write release frames themselves, but their devices may
        // already be gone. Write them again through fresh descriptors.
        log::debug!("Sending release events...");
        for kind in CHANNELS {
            let output = &self.config.channel(kind).output;
            if let Err(e) = driver::flush_release(output, kind.report_size()).await {
                log::debug!("Unable to release {kind} on {output}: {e}");
            }
        }

        // Give channels a moment to finish their own release
        let tasks = std::mem::take(&mut self.tasks);
        let joined = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, async {
            for task in tasks {
                if let Err(e) = task.await {
                    log::warn!("Relay channel task failed: {e}");
                }
            }
        })
        .await;
        if joined.is_err() {
            log::debug!("Relay channels did not stop within {SHUTDOWN_GRACE_PERIOD:?}");
        }
        log::info!("Relay stopped");
    }
}
