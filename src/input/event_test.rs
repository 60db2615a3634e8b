use std::error::Error;

use evdev::{EventType, KeyCode};

use crate::input::event::InputEvent;

#[test]
fn test_record_size() {
    #[cfg(target_pointer_width = "64")]
    assert_eq!(InputEvent::SIZE, 24);
    #[cfg(not(target_pointer_width = "64"))]
    assert_eq!(InputEvent::SIZE, 16);
}

#[test]
fn test_from_bytes() {
    let mut buf = [0u8; InputEvent::SIZE];
    let fields = InputEvent::SIZE - 8;
    buf[0] = 0x2a; // seconds
    buf[fields] = 0x01; // EV_KEY
    buf[fields + 2] = 0x1e; // KEY_A
    buf[fields + 4..].copy_from_slice(&(-1i32).to_le_bytes());

    let event = InputEvent::from_bytes(&buf);
    assert_eq!(event.time_sec, 42);
    assert_eq!(event.event_type(), EventType::KEY);
    assert_eq!(event.code, KeyCode::KEY_A.code());
    assert_eq!(event.value, -1);
}

#[tokio::test]
async fn test_read_stream_of_records() -> Result<(), Box<dyn Error>> {
    let first = InputEvent::new(EventType::KEY, KeyCode::KEY_A.code(), 1);
    let second = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
    let mut data = Vec::new();
    data.extend_from_slice(&first.to_bytes());
    data.extend_from_slice(&second.to_bytes());

    let mut reader = data.as_slice();
    assert_eq!(InputEvent::read_from(&mut reader).await?, first);
    assert_eq!(InputEvent::read_from(&mut reader).await?, second);

    let err = InputEvent::read_from(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);

    Ok(())
}

#[tokio::test]
async fn test_partial_record() {
    let data = [0u8; InputEvent::SIZE - 1];
    let mut reader = &data[..];
    let err = InputEvent::read_from(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}
