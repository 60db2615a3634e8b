pub mod keyboard;
pub mod keycodes;
pub mod mouse;

use std::fmt;

use packed_struct::PackingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivers::hidg::hid_report::{KEYBOARD_REPORT_SIZE, MOUSE_REPORT_SIZE};
use crate::input::event::InputEvent;

use self::{keyboard::KeyboardConverter, mouse::MouseConverter};

/// Possible errors converting an input event into a report
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to pack report: {0}")]
    Pack(#[from] PackingError),
}

/// The kinds of devices that can be relayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Mouse,
    Keyboard,
}

impl DeviceKind {
    /// Default label used to discover the input device
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Mouse => "mouse",
            DeviceKind::Keyboard => "keyboard",
        }
    }

    /// Size of the reports written to the gadget device
    pub fn report_size(&self) -> usize {
        match self {
            DeviceKind::Mouse => MOUSE_REPORT_SIZE,
            DeviceKind::Keyboard => KEYBOARD_REPORT_SIZE,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Translates input events from a physical device into HID reports
pub trait ReportConverter {
    /// Name of the converter used in log messages
    fn name(&self) -> &'static str;

    /// Returns true if the given event is relevant to this converter
    fn validate(&self, event: &InputEvent) -> bool;

    /// Update the converter state with the given event and return the report
    /// to send, if any.
    fn convert(&mut self, event: &InputEvent) -> Result<Option<Vec<u8>>, ConvertError>;
}

/// [Converter] dispatches to the converter matching the relayed device kind.
#[derive(Debug)]
pub enum Converter {
    Keyboard(KeyboardConverter),
    Mouse(MouseConverter),
}

impl Converter {
    /// Create a converter with empty state for the given kind of device
    pub fn new(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Mouse => Self::Mouse(MouseConverter::new()),
            DeviceKind::Keyboard => Self::Keyboard(KeyboardConverter::new()),
        }
    }

    /// Returns the kind of device this converter produces reports for
    pub fn kind(&self) -> DeviceKind {
        match self {
            Converter::Keyboard(_) => DeviceKind::Keyboard,
            Converter::Mouse(_) => DeviceKind::Mouse,
        }
    }

    /// Size of the reports produced by this converter
    pub fn report_size(&self) -> usize {
        self.kind().report_size()
    }
}

impl ReportConverter for Converter {
    fn name(&self) -> &'static str {
        match self {
            Converter::Keyboard(converter) => converter.name(),
            Converter::Mouse(converter) => converter.name(),
        }
    }

    fn validate(&self, event: &InputEvent) -> bool {
        match self {
            Converter::Keyboard(converter) => converter.validate(event),
            Converter::Mouse(converter) => converter.validate(event),
        }
    }

    fn convert(&mut self, event: &InputEvent) -> Result<Option<Vec<u8>>, ConvertError> {
        match self {
            Converter::Keyboard(converter) => converter.convert(event),
            Converter::Mouse(converter) => converter.convert(event),
        }
    }
}
