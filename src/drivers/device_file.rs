use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    os::unix::fs::OpenOptionsExt,
    path::Path,
    pin::Pin,
    task::{ready, Context, Poll},
};

use nix::{errno::Errno, fcntl::OFlag};
use tokio::io::{unix::AsyncFd, AsyncRead, AsyncWrite, Interest, ReadBuf};

/// A character device (or FIFO) opened for non-blocking access.
///
/// Reads and writes go straight to the descriptor with a single syscall each,
/// waiting for readiness on the tokio reactor. Dropping a pending read or
/// write leaves nothing running in the background. Files that cannot be
/// polled (like regular files) never block and are accessed directly.
#[derive(Debug)]
pub struct DeviceFile {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Polled(AsyncFd<File>),
    Direct(File),
}

impl DeviceFile {
    /// Open the given device for reading. Must be called from within a tokio
    /// runtime.
    pub fn open_read(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)?;
        Self::new(file, Interest::READABLE)
    }

    /// Open the given device for writing. Must be called from within a tokio
    /// runtime.
    pub fn open_write(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)?;
        Self::new(file, Interest::WRITABLE)
    }

    fn new(file: File, interest: Interest) -> io::Result<Self> {
        match AsyncFd::try_with_interest(file, interest) {
            Ok(fd) => Ok(Self {
                inner: Inner::Polled(fd),
            }),
            Err(e) => {
                let (file, error) = e.into_parts();
                // epoll refuses files that are always ready
                if error.raw_os_error() != Some(Errno::EPERM as i32) {
                    return Err(error);
                }
                log::trace!("Device cannot be polled, using direct access");
                Ok(Self {
                    inner: Inner::Direct(file),
                })
            }
        }
    }

    /// Returns true if the device is driven by the reactor
    pub fn is_polled(&self) -> bool {
        matches!(self.inner, Inner::Polled(_))
    }
}

impl AsyncRead for DeviceFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &self.get_mut().inner {
            Inner::Direct(file) => {
                let mut reader: &File = file;
                let len = reader.read(buf.initialize_unfilled())?;
                buf.advance(len);
                Poll::Ready(Ok(()))
            }
            Inner::Polled(fd) => loop {
                let mut guard = ready!(fd.poll_read_ready(cx))?;
                let unfilled = buf.initialize_unfilled();
                match guard.try_io(|inner| {
                    let mut reader: &File = inner.get_ref();
                    reader.read(unfilled)
                }) {
                    Ok(Ok(len)) => {
                        buf.advance(len);
                        return Poll::Ready(Ok(()));
                    }
                    Ok(Err(e)) => return Poll::Ready(Err(e)),
                    Err(_would_block) => continue,
                }
            },
        }
    }
}

impl AsyncWrite for DeviceFile {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &self.get_mut().inner {
            Inner::Direct(file) => {
                let mut writer: &File = file;
                Poll::Ready(writer.write(buf))
            }
            Inner::Polled(fd) => loop {
                let mut guard = ready!(fd.poll_write_ready(cx))?;
                match guard.try_io(|inner| {
                    let mut writer: &File = inner.get_ref();
                    writer.write(buf)
                }) {
                    Ok(result) => return Poll::Ready(result),
                    Err(_would_block) => continue,
                }
            },
        }
    }

    // Nothing is buffered
    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
