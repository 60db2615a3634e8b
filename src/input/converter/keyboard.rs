use evdev::EventType;
use packed_struct::PackedStruct;

use crate::{
    drivers::hidg::hid_report::KeyboardReport,
    input::{
        converter::{keycodes, ConvertError, ReportConverter},
        event::InputEvent,
    },
};

/// Converts key events into 8 byte boot protocol keyboard reports.
///
/// Only a single regular key is reported at a time, the most recently
/// pressed one. Modifier keys are tracked separately as a bitmask.
#[derive(Debug, Default)]
pub struct KeyboardConverter {
    /// Currently held modifier keys
    modifiers: u8,
    /// Usage ID of the last pressed regular key, 0 when released
    last_key: u8,
}

impl KeyboardConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently held modifier bitmask
    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    /// Returns the usage ID of the held regular key, if any
    pub fn held_key(&self) -> Option<u8> {
        (self.last_key != 0).then_some(self.last_key)
    }

    fn report(&self, key: u8) -> Result<Option<Vec<u8>>, ConvertError> {
        let report = KeyboardReport::new(self.modifiers, key);
        Ok(Some(report.pack()?.to_vec()))
    }
}

impl ReportConverter for KeyboardConverter {
    fn name(&self) -> &'static str {
        "keyboard"
    }

    fn validate(&self, event: &InputEvent) -> bool {
        match event.event_type() {
            EventType::KEY => keycodes::is_supported(event.code),
            // Sync events only mark the end of a batch and misc events carry
            // raw scancodes, neither is needed for the report.
            EventType::SYNCHRONIZATION | EventType::MISC => false,
            other => {
                log::trace!("Ignoring unexpected event type for keyboard: {}", other.0);
                false
            }
        }
    }

    fn convert(&mut self, event: &InputEvent) -> Result<Option<Vec<u8>>, ConvertError> {
        // Modifier changes always clear the key slot of the emitted report
        if let Some(bit) = keycodes::modifier_bit(event.code) {
            if event.value != 0 {
                self.modifiers |= bit;
            } else {
                self.modifiers &= !bit;
            }
            return self.report(0);
        }

        let Some(usage) = keycodes::usage_id(event.code) else {
            log::debug!("No mapping for key code: {}", event.code);
            return Ok(None);
        };

        match event.value {
            // Release
            0 => {
                self.last_key = 0;
                self.report(0)
            }
            // Press or repeat
            1 | 2 => {
                self.last_key = usage;
                self.report(usage)
            }
            value => {
                log::debug!("Unknown key state {value} for key code {}", event.code);
                Ok(None)
            }
        }
    }
}
