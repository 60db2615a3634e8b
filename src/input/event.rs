use std::{fmt, io};

use evdev::EventType;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Width in bytes of each timestamp word. The kernel uses `struct timeval`,
/// whose fields follow the native word size.
#[cfg(target_pointer_width = "64")]
const TIME_WORD_SIZE: usize = 8;
#[cfg(not(target_pointer_width = "64"))]
const TIME_WORD_SIZE: usize = 4;

/// A single record read from an evdev character device (`struct input_event`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvent {
    pub time_sec: u64,
    pub time_usec: u64,
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    /// Size of a record as written by the running kernel
    pub const SIZE: usize = 2 * TIME_WORD_SIZE + 8;

    /// Create a new event without a timestamp
    pub fn new(event_type: EventType, code: u16, value: i32) -> Self {
        Self {
            event_type: event_type.0,
            code,
            value,
            ..Default::default()
        }
    }

    /// Returns the event type (e.g. [EventType::KEY])
    pub fn event_type(&self) -> EventType {
        EventType(self.event_type)
    }

    /// Decode a little-endian record
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        let (time_sec, time_usec) = if TIME_WORD_SIZE == 8 {
            (read_u64(&buf[0..8]), read_u64(&buf[8..16]))
        } else {
            (read_u32(&buf[0..4]) as u64, read_u32(&buf[4..8]) as u64)
        };
        let rest = &buf[2 * TIME_WORD_SIZE..];

        Self {
            time_sec,
            time_usec,
            event_type: u16::from_le_bytes([rest[0], rest[1]]),
            code: u16::from_le_bytes([rest[2], rest[3]]),
            value: i32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]),
        }
    }

    /// Encode the event as a little-endian record
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        if TIME_WORD_SIZE == 8 {
            buf[0..8].copy_from_slice(&self.time_sec.to_le_bytes());
            buf[8..16].copy_from_slice(&self.time_usec.to_le_bytes());
        } else {
            buf[0..4].copy_from_slice(&(self.time_sec as u32).to_le_bytes());
            buf[4..8].copy_from_slice(&(self.time_usec as u32).to_le_bytes());
        }
        let rest = &mut buf[2 * TIME_WORD_SIZE..];
        rest[0..2].copy_from_slice(&self.event_type.to_le_bytes());
        rest[2..4].copy_from_slice(&self.code.to_le_bytes());
        rest[4..8].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    /// Read exactly one record from the given reader. A partial record
    /// results in an [io::ErrorKind::UnexpectedEof] error.
    pub async fn read_from<R>(reader: &mut R) -> io::Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf).await?;
        Ok(Self::from_bytes(&buf))
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type={}, Code={}, Value={}",
            self.event_type, self.code, self.value
        )
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    u64::from_le_bytes(word)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}
