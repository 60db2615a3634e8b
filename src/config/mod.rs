#[cfg(test)]
pub mod config_test;
pub mod path;

use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{DEFAULT_KEYBOARD_OUTPUT, DEFAULT_MOUSE_OUTPUT, PROC_INPUT_DEVICES},
    input::converter::DeviceKind,
    procfs::device::{DeviceLocator, LocateError},
    retry::BackoffConfig,
};

/// Represents all possible errors loading a [RelayConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Configuration of the relay for all devices
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct RelayConfig {
    /// Log every relayed event
    pub debug: bool,
    /// Listing used to discover input devices by name
    pub devices_path: String,
    pub mouse: ChannelConfig,
    pub keyboard: ChannelConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            debug: false,
            devices_path: PROC_INPUT_DEVICES.to_string(),
            mouse: ChannelConfig::new(DeviceKind::Mouse),
            keyboard: ChannelConfig::new(DeviceKind::Keyboard),
        }
    }
}

impl RelayConfig {
    /// Load a [RelayConfig] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<RelayConfig, LoadError> {
        let config: RelayConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [RelayConfig] from the given YAML file
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<RelayConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: RelayConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Returns the configuration of the channel for the given kind of device
    pub fn channel(&self, kind: DeviceKind) -> &ChannelConfig {
        match kind {
            DeviceKind::Mouse => &self.mouse,
            DeviceKind::Keyboard => &self.keyboard,
        }
    }
}

/// Configuration for relaying a single input device to a gadget device
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ChannelConfig {
    /// Case-insensitive part of the device name used to discover the input
    /// device (e.g. "mouse")
    pub label: String,
    /// Fixed input device path. If set, discovery by label is skipped.
    #[serde(default)]
    pub input: Option<String>,
    /// HID gadget device to write reports to (e.g. "/dev/hidg0")
    pub output: String,
    /// Delay policy between failed connection attempts
    #[serde(default)]
    pub backoff: BackoffConfig,
    /// Number of consecutive failed attempts after which the relay gives up.
    /// Retries forever if unset.
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl ChannelConfig {
    /// Returns the default configuration for the given kind of device
    pub fn new(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Mouse => Self {
                label: kind.label().to_string(),
                input: None,
                output: DEFAULT_MOUSE_OUTPUT.to_string(),
                backoff: BackoffConfig::default(),
                max_retries: None,
            },
            DeviceKind::Keyboard => Self {
                label: kind.label().to_string(),
                input: None,
                output: DEFAULT_KEYBOARD_OUTPUT.to_string(),
                backoff: BackoffConfig::keyboard(),
                max_retries: None,
            },
        }
    }

    /// Returns the configured input path, or discovers one by label with the
    /// given locator.
    pub fn resolve_input(&self, locator: &DeviceLocator) -> Result<String, LocateError> {
        if let Some(input) = self.input.as_ref() {
            return Ok(input.clone());
        }
        locator.find_input_device(&self.label)
    }
}
