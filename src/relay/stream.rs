use std::{io, path::Path};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::{
    drivers::{
        device_file::DeviceFile,
        hidg::driver::{self, WriteError},
    },
    input::{
        converter::{Converter, ReportConverter},
        event::InputEvent,
    },
};

/// Reasons an [EventStream] stopped relaying before a shutdown was requested.
/// All of these mean the devices need to be opened again.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to open input device {path}: {source}")]
    OpenInput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open output device {path}: {source}")]
    OpenOutput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read event: {0}")]
    Read(#[source] io::Error),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Relays events from one input device to one HID gadget device.
///
/// A stream lives for a single connection: any read or write error ends it
/// and the owner is expected to find the device again and open a new stream
/// with a fresh converter.
pub struct EventStream<R, W> {
    name: String,
    source: R,
    sink: W,
    converter: Converter,
    debug: bool,
}

impl EventStream<DeviceFile, DeviceFile> {
    /// Open the input device read-only and the gadget device write-only
    pub fn open(input_path: &str, output_path: &str, converter: Converter) -> Result<Self, StreamError> {
        log::debug!("Opening input device {input_path}");
        let source = DeviceFile::open_read(input_path).map_err(|source| StreamError::OpenInput {
            path: input_path.to_string(),
            source,
        })?;

        log::debug!("Opening output device {output_path}");
        let sink = driver::open(output_path).map_err(|source| StreamError::OpenOutput {
            path: output_path.to_string(),
            source,
        })?;

        let name = Path::new(input_path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| input_path.to_string());

        Ok(Self::new(name, source, sink, converter))
    }
}

impl<R, W> EventStream<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a stream from an already opened source and sink
    pub fn new(name: impl Into<String>, source: R, sink: W, converter: Converter) -> Self {
        Self {
            name: name.into(),
            source,
            sink,
            converter,
            debug: false,
        }
    }

    /// Log every relayed event
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Relay events until the token is cancelled or the connection fails.
    ///
    /// On cancellation all-zero release reports are written to the sink and
    /// `Ok(())` is returned. Errors mean the devices must be reopened.
    pub async fn run(mut self, cancel: &CancellationToken) -> Result<(), StreamError> {
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.release().await;
                    return Ok(());
                }
                result = InputEvent::read_from(&mut self.source) => result,
            };
            let event = result.map_err(StreamError::Read)?;
            self.relay(&event).await?;
        }
    }

    /// Convert the given event and write the resulting report, if any
    async fn relay(&mut self, event: &InputEvent) -> Result<(), StreamError> {
        if !self.converter.validate(event) {
            log::trace!(
                "Ignoring event for {} on {}: {event}",
                self.converter.name(),
                self.name
            );
            return Ok(());
        }

        if self.debug {
            log::debug!("Read event from {}: {event}", self.name);
        }

        let report = match self.converter.convert(event) {
            Ok(Some(report)) => report,
            Ok(None) => return Ok(()),
            Err(e) => {
                log::debug!("Error converting event from {}: {e}", self.name);
                return Ok(());
            }
        };

        driver::write_report(&mut self.sink, &report).await?;
        if self.debug {
            log::debug!("Relayed {} report from {}: {report:02x?}", self.converter.name(), self.name);
        }

        Ok(())
    }

    /// Write release frames so no key or button stays held on the host
    async fn release(&mut self) {
        log::info!("Relay shutdown for {}", self.name);
        let size = self.converter.report_size();
        if let Err(e) = driver::write_release_frames(&mut self.sink, size).await {
            log::debug!("Failed to write release frames for {}: {e}", self.name);
        }
    }
}
