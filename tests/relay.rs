use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::mpsc;
use std::time::Duration;

use evdev::{EventType, KeyCode, RelativeAxisCode};
use hid_relay::config::RelayConfig;
use hid_relay::drivers::hidg::driver::RELEASE_FRAME_COUNT;
use hid_relay::input::converter::DeviceKind;
use hid_relay::input::event::InputEvent;
use hid_relay::relay::{Relay, RelayError};
use hid_relay::retry::BackoffConfig;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use tempfile::{NamedTempFile, TempDir};

/// Backoff that keeps tests fast
fn fast_backoff() -> BackoffConfig {
    BackoffConfig {
        base_delay_ms: 10,
        max_delay_ms: 20,
        reset_interval: None,
        jitter: 0.0,
    }
}

/// Build a config whose input devices never appear and whose gadget devices
/// are regular files.
fn test_config(dir: &TempDir) -> Result<RelayConfig, Box<dyn Error>> {
    let listing = dir.path().join("devices");
    fs::write(&listing, "")?;

    let mut config = RelayConfig {
        devices_path: listing.to_string_lossy().to_string(),
        ..Default::default()
    };
    for channel in [&mut config.mouse, &mut config.keyboard] {
        let output = NamedTempFile::new_in(dir.path())?;
        let (_, path) = output.keep()?;
        channel.output = path.to_string_lossy().to_string();
        channel.backoff = fast_backoff();
    }

    Ok(config)
}

#[tokio::test]
async fn test_shutdown_releases_outputs() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config(&dir)?;
    config.mouse.input = Some(dir.path().join("event99").to_string_lossy().to_string());

    let mut relay = Relay::new(config.clone());
    let handle = relay.shutdown_handle();
    let task = tokio::spawn(async move { relay.run().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.shutdown();
    task.await??;

    for kind in [DeviceKind::Mouse, DeviceKind::Keyboard] {
        let written = fs::read(&config.channel(kind).output)?;
        assert!(
            written.len() >= RELEASE_FRAME_COUNT * kind.report_size(),
            "{kind} output received {} bytes",
            written.len()
        );
        assert_eq!(written.len() % kind.report_size(), 0);
        assert!(written.iter().all(|byte| *byte == 0));
    }

    Ok(())
}

#[tokio::test]
async fn test_retries_exhausted() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config(&dir)?;
    config.mouse.max_retries = Some(1);

    let mut relay = Relay::new(config);
    let result = tokio::time::timeout(Duration::from_secs(5), relay.run()).await?;

    match result {
        Err(RelayError::RetriesExhausted { kind, attempts, .. }) => {
            assert_eq!(kind, DeviceKind::Mouse);
            assert_eq!(attempts, 2);
        }
        other => panic!("Expected retries to be exhausted, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_shutdown_with_idle_input() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config(&dir)?;

    // A FIFO held open on both ends never delivers a record or end of file,
    // like a connected mouse that is not being moved.
    let input = dir.path().join("event0");
    mkfifo(&input, Mode::S_IRUSR | Mode::S_IWUSR)?;
    let _holder = OpenOptions::new().read(true).write(true).open(&input)?;
    config.mouse.input = Some(input.to_string_lossy().to_string());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut relay = Relay::new(config);
        let handle = relay.shutdown_handle();
        let task = tokio::spawn(async move { relay.run().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.shutdown();
        task.await??;

        Ok::<(), Box<dyn Error>>(())
    })?;

    // Nothing may keep the runtime alive after the relay stopped
    let (done_tx, done_rx) = mpsc::channel();
    std::thread::spawn(move || {
        drop(runtime);
        let _ = done_tx.send(());
    });
    done_rx.recv_timeout(Duration::from_secs(5))?;

    Ok(())
}

#[tokio::test]
async fn test_reconnect_starts_fresh() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let mut config = test_config(&dir)?;

    // Every read of the input ends with end of file, so each connection
    // relays the recorded events and then fails.
    let input = dir.path().join("event0");
    let press = InputEvent::new(EventType::KEY, KeyCode::BTN_LEFT.code(), 1);
    fs::write(&input, press.to_bytes())?;
    config.mouse.input = Some(input.to_string_lossy().to_string());
    config.mouse.backoff = BackoffConfig {
        base_delay_ms: 200,
        max_delay_ms: 200,
        reset_interval: None,
        jitter: 0.0,
    };
    // Only gives up if failures are counted across successful connections
    config.mouse.max_retries = Some(1);
    let output = config.mouse.output.clone();

    let mut relay = Relay::new(config);
    let handle = relay.shutdown_handle();
    let task = tokio::spawn(async move { relay.run().await });

    // First connection: the left button is pressed
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fs::read(&output)?[..4], [0x01, 0, 0, 0]);

    // Reconnect to a device that only moves. The button held during the
    // first connection must not leak into the new reports.
    let motion = InputEvent::new(EventType::RELATIVE, RelativeAxisCode::REL_X.0, 10);
    fs::write(&input, motion.to_bytes())?;
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(fs::read(&output)?[..4], [0, 10, 0, 0]);

    // Several more connections fail, but each one succeeded in opening
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!task.is_finished(), "relay gave up after reconnecting");

    handle.shutdown();
    task.await??;

    Ok(())
}
