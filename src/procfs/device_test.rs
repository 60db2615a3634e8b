use std::{error::Error, io::Write};

use crate::procfs::device::{parse, DeviceLocator, LocateError};

const DEVICES: &str = r#"I: Bus=0003 Vendor=046d Product=c534 Version=0111
N: Name="Logitech Gaming Mouse G502"
P: Phys=usb-0000:00:14.0-1/input0
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-1/1-1:1.0/0003:046D:C534.0001/input/input20
U: Uniq=
H: Handlers=mouse0 event4
B: PROP=0
B: EV=17
B: KEY=ffff0000 0 0 0 0
B: REL=903
B: MSC=10

I: Bus=0003 Vendor=04d9 Product=0024 Version=0110
N: Name="USB Keyboard"
P: Phys=usb-0000:00:14.0-2/input0
S: Sysfs=/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2:1.0/0003:04D9:0024.0002/input/input21
U: Uniq=
H: Handlers=sysrq kbd event5 leds
B: PROP=0
B: EV=120013"#;

fn locator_for(content: &str) -> Result<(tempfile::NamedTempFile, DeviceLocator), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let locator = DeviceLocator::new(file.path());
    Ok((file, locator))
}

#[test]
fn test_parse() {
    let devices = parse(DEVICES);
    assert_eq!(devices.len(), 2, "should parse the last stanza without a trailing newline");

    let mouse = &devices[0];
    assert_eq!(mouse.name, "Logitech Gaming Mouse G502");
    assert_eq!(mouse.id.vendor, "046d");
    assert_eq!(mouse.id.product, "c534");
    assert_eq!(mouse.phys_path, "usb-0000:00:14.0-1/input0");
    assert_eq!(mouse.handlers, vec!["mouse0", "event4"]);

    let keyboard = &devices[1];
    assert_eq!(keyboard.event_handler(), Some("event5"));
    assert_eq!(keyboard.devnode().as_deref(), Some("/dev/input/event5"));
}

#[test]
fn test_find_input_device() -> Result<(), Box<dyn Error>> {
    let (_file, locator) = locator_for(DEVICES)?;

    assert_eq!(locator.find_input_device("mouse")?, "/dev/input/event4");
    assert_eq!(locator.find_input_device("keyboard")?, "/dev/input/event5");
    assert_eq!(
        locator.find_input_device("KEYBOARD")?,
        "/dev/input/event5",
        "labels should match regardless of case"
    );

    let err = locator.find_input_device("nonexistent").unwrap_err();
    assert!(matches!(err, LocateError::NotFound(_)));
    assert!(err.to_string().contains("device not found"));

    Ok(())
}

#[test]
fn test_first_match_wins() -> Result<(), Box<dyn Error>> {
    let listing = "N: Name=\"Mouse A\"\nH: Handlers=mouse0 event7\n\nN: Name=\"Mouse B\"\nH: Handlers=mouse1 event8\n";
    let (_file, locator) = locator_for(listing)?;

    assert_eq!(locator.find_input_device("mouse")?, "/dev/input/event7");

    Ok(())
}

#[test]
fn test_unreadable_listing() {
    let locator = DeviceLocator::new("/nonexistent/proc/bus/input/devices");
    let err = locator.find_input_device("mouse").unwrap_err();
    match err {
        LocateError::Unreadable { label, .. } => assert_eq!(label, "mouse"),
        other => panic!("unexpected error: {other:?}"),
    }
}
