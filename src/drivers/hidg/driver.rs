use std::{io, path::Path, time::Duration};

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::drivers::device_file::DeviceFile;

/// Number of all-zero frames written to release every key and button
pub const RELEASE_FRAME_COUNT: usize = 3;
/// Delay between release frames
pub const RELEASE_FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Possible errors writing a report to a gadget device
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
    #[error("short write of {written} out of {expected} bytes")]
    Short { written: usize, expected: usize },
}

/// Open the HID gadget device at the given path for writing
pub fn open(path: impl AsRef<Path>) -> io::Result<DeviceFile> {
    DeviceFile::open_write(path)
}

/// Write a single report to the gadget device. Reports must be written
/// whole by one call; anything less is treated as a failure and the rest is
/// never sent.
pub async fn write_report<W>(sink: &mut W, report: &[u8]) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let written = sink.write(report).await?;
    if written != report.len() {
        return Err(WriteError::Short {
            written,
            expected: report.len(),
        });
    }

    sink.flush().await?;

    Ok(())
}

/// Write [RELEASE_FRAME_COUNT] all-zero reports of the given size so the host
/// sees every key and button as released.
pub async fn write_release_frames<W>(sink: &mut W, report_size: usize) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    let frame = vec![0u8; report_size];
    for i in 0..RELEASE_FRAME_COUNT {
        write_report(sink, &frame).await?;
        if i + 1 < RELEASE_FRAME_COUNT {
            tokio::time::sleep(RELEASE_FRAME_INTERVAL).await;
        }
    }

    Ok(())
}

/// Open the gadget device at the given path and write release frames to it
pub async fn flush_release(path: impl AsRef<Path>, report_size: usize) -> Result<(), WriteError> {
    let mut device = open(path)?;
    write_release_frames(&mut device, report_size).await
}
