use std::{error::Error, io::Write};

use crate::{
    config::{ChannelConfig, LoadError, RelayConfig},
    constants::{DEFAULT_KEYBOARD_OUTPUT, DEFAULT_MOUSE_OUTPUT, PROC_INPUT_DEVICES},
    input::converter::DeviceKind,
    procfs::device::{DeviceLocator, LocateError},
    retry::BackoffConfig,
};

const CONFIG: &str = r#"
debug: true
mouse:
  label: trackball
  output: /dev/hidg2
  max_retries: 10
  backoff:
    base_delay_ms: 250
    max_delay_ms: 2000
keyboard:
  label: keyboard
  input: /dev/input/event3
  output: /dev/hidg3
"#;

#[test]
fn test_defaults() {
    let config = RelayConfig::default();
    assert!(!config.debug);
    assert_eq!(config.devices_path, PROC_INPUT_DEVICES);
    assert_eq!(config.mouse.label, "mouse");
    assert_eq!(config.mouse.output, DEFAULT_MOUSE_OUTPUT);
    assert_eq!(config.keyboard.label, "keyboard");
    assert_eq!(config.keyboard.output, DEFAULT_KEYBOARD_OUTPUT);
    assert_eq!(config.keyboard.backoff, BackoffConfig::keyboard());
    assert_eq!(config.channel(DeviceKind::Mouse).max_retries, None);
}

#[test]
fn test_from_yaml() -> Result<(), Box<dyn Error>> {
    let config = RelayConfig::from_yaml(CONFIG)?;
    assert!(config.debug);
    assert_eq!(config.devices_path, PROC_INPUT_DEVICES, "missing fields use defaults");

    let mouse = config.channel(DeviceKind::Mouse);
    assert_eq!(mouse.label, "trackball");
    assert_eq!(mouse.input, None);
    assert_eq!(mouse.output, "/dev/hidg2");
    assert_eq!(mouse.max_retries, Some(10));
    assert_eq!(mouse.backoff.base_delay_ms, 250);
    assert_eq!(mouse.backoff.max_delay_ms, 2000);
    assert_eq!(
        mouse.backoff.reset_interval,
        BackoffConfig::default().reset_interval
    );

    let keyboard = config.channel(DeviceKind::Keyboard);
    assert_eq!(keyboard.input.as_deref(), Some("/dev/input/event3"));
    assert_eq!(keyboard.output, "/dev/hidg3");

    Ok(())
}

#[test]
fn test_from_yaml_path() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(CONFIG.as_bytes())?;

    let config = RelayConfig::from_yaml_path(file.path())?;
    assert_eq!(config.mouse.label, "trackball");

    let result = RelayConfig::from_yaml_path("/nonexistent/hid-relay.yaml");
    assert!(matches!(result, Err(LoadError::IoError(_))));

    Ok(())
}

#[test]
fn test_invalid_yaml() {
    let result = RelayConfig::from_yaml("mouse: [not, a, channel]");
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));
}

#[test]
fn test_resolve_input() -> Result<(), Box<dyn Error>> {
    let mut listing = tempfile::NamedTempFile::new()?;
    listing.write_all(
        b"I: Bus=0005 Vendor=046d Product=b023 Version=0004\nN: Name=\"MX Keys Keyboard\"\nH: Handlers=sysrq kbd leds event7\n\n",
    )?;
    let locator = DeviceLocator::new(listing.path());

    let mut config = ChannelConfig::new(DeviceKind::Keyboard);
    assert_eq!(config.resolve_input(&locator)?, "/dev/input/event7");

    // A fixed input skips discovery
    config.input = Some("/dev/input/event9".to_string());
    assert_eq!(config.resolve_input(&locator)?, "/dev/input/event9");

    let config = ChannelConfig::new(DeviceKind::Mouse);
    assert!(matches!(
        config.resolve_input(&locator),
        Err(LocateError::NotFound(_))
    ));

    Ok(())
}
