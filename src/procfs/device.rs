use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::constants::{INPUT_PATH, PROC_INPUT_DEVICES};

/// Possible errors when looking up an input device
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("{0} device not found")]
    NotFound(String),
    #[error("failed to read input devices while looking for {label}: {source}")]
    Unreadable {
        label: String,
        #[source]
        source: io::Error,
    },
}

/// Container for a device ID
/// E.g. I: Bus=0003 Vendor=045e Product=028e Version=0120
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ID {
    pub bus_type: String,
    pub vendor: String,
    pub product: String,
    pub version: String,
}

/// A single device entry in /proc/bus/input/devices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Device {
    pub id: ID,
    pub name: String,
    pub phys_path: String,
    pub sysfs_path: String,
    pub unique_id: String,
    pub handlers: Vec<String>,
}

impl Device {
    /// Returns the evdev handler of the device (e.g. "event4") if it has one
    pub fn event_handler(&self) -> Option<&str> {
        self.handlers
            .iter()
            .map(String::as_str)
            .find(|handler| handler.starts_with("event"))
    }

    /// Returns the path to the evdev node of the device (e.g. "/dev/input/event4")
    pub fn devnode(&self) -> Option<String> {
        self.event_handler()
            .map(|handler| format!("{INPUT_PATH}/{handler}"))
    }
}

/// Returns the value part of a "X: Key=value" line
fn line_value(line: &str) -> Option<&str> {
    line.get(3..)?.split_once('=').map(|(_, value)| value)
}

/// Parses the stanza formatted contents of /proc/bus/input/devices
pub fn parse(content: &str) -> Vec<Device> {
    let mut devices = Vec::new();
    let mut device: Option<Device> = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            if let Some(finished) = device.take() {
                devices.push(finished);
            }
            continue;
        }

        // Every stanza starts with an ID line, but tolerate listings that
        // were cut off before it.
        let current = device.get_or_insert_with(Device::default);
        match line.get(..3) {
            Some("I: ") => {
                for part in line[3..].split_whitespace() {
                    let Some((key, value)) = part.split_once('=') else {
                        continue;
                    };
                    let value = value.to_string();
                    match key {
                        "Bus" => current.id.bus_type = value,
                        "Vendor" => current.id.vendor = value,
                        "Product" => current.id.product = value,
                        "Version" => current.id.version = value,
                        _ => (),
                    }
                }
            }
            Some("N: ") => {
                if let Some(name) = line_value(line) {
                    current.name = name.replace('"', "");
                }
            }
            Some("P: ") => {
                if let Some(phys) = line_value(line) {
                    current.phys_path = phys.to_string();
                }
            }
            Some("S: ") => {
                if let Some(sysfs) = line_value(line) {
                    current.sysfs_path = sysfs.to_string();
                }
            }
            Some("U: ") => {
                if let Some(uniq) = line_value(line) {
                    current.unique_id = uniq.to_string();
                }
            }
            Some("H: ") => {
                if let Some(handlers) = line_value(line) {
                    current
                        .handlers
                        .extend(handlers.split_whitespace().map(String::from));
                }
            }
            // Bitmaps and anything else are not needed
            _ => (),
        }
    }

    // The last stanza is not always followed by an empty line
    if let Some(finished) = device.take() {
        devices.push(finished);
    }

    devices
}

/// Resolves logical device labels (e.g. "mouse") to evdev device paths by
/// looking at the kernel's input device listing.
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    path: PathBuf,
}

impl Default for DeviceLocator {
    fn default() -> Self {
        Self::new(PROC_INPUT_DEVICES)
    }
}

impl DeviceLocator {
    /// Create a locator reading the listing at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the listing this locator reads
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all input devices that are currently detected
    pub fn get_all(&self) -> io::Result<Vec<Device>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse(&content))
    }

    /// Returns the evdev path (e.g. "/dev/input/event4") of the first device
    /// whose name contains the given label, ignoring case.
    pub fn find_input_device(&self, label: &str) -> Result<String, LocateError> {
        let devices = self.get_all().map_err(|source| LocateError::Unreadable {
            label: label.to_string(),
            source,
        })?;

        let needle = label.to_lowercase();
        devices
            .iter()
            .filter(|device| device.name.to_lowercase().contains(&needle))
            .find_map(|device| {
                log::trace!("Device '{}' matches label '{label}'", device.name);
                device.devnode()
            })
            .ok_or_else(|| LocateError::NotFound(label.to_string()))
    }
}
