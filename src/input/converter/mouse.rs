use evdev::{EventType, KeyCode, RelativeAxisCode};
use packed_struct::PackedStruct;

use crate::{
    drivers::hidg::hid_report::MouseReport,
    input::{
        converter::{ConvertError, ReportConverter},
        event::InputEvent,
    },
};

/// First button code; each following code maps to the next report bit
const BUTTON_BASE: u16 = KeyCode::BTN_LEFT.0;
/// Number of relayed buttons (left, right, middle)
const BUTTON_COUNT: u16 = 3;

/// Converts button and relative motion events into 4 byte boot protocol
/// mouse reports.
///
/// Every accepted event produces a report, including reports that are all
/// zeros, so the release of the last held button always reaches the host.
#[derive(Debug, Default)]
pub struct MouseConverter {
    /// Currently held buttons, echoed in every report
    buttons: u8,
}

impl MouseConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently held button bitmask
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    fn is_button(code: u16) -> bool {
        (BUTTON_BASE..BUTTON_BASE + BUTTON_COUNT).contains(&code)
    }

    fn is_axis(code: u16) -> bool {
        code == RelativeAxisCode::REL_X.0
            || code == RelativeAxisCode::REL_Y.0
            || code == RelativeAxisCode::REL_WHEEL.0
    }
}

impl ReportConverter for MouseConverter {
    fn name(&self) -> &'static str {
        "mouse"
    }

    fn validate(&self, event: &InputEvent) -> bool {
        match event.event_type() {
            EventType::KEY => Self::is_button(event.code),
            EventType::RELATIVE => Self::is_axis(event.code),
            EventType::SYNCHRONIZATION | EventType::MISC => false,
            other => {
                log::trace!("Ignoring unexpected event type for mouse: {}", other.0);
                false
            }
        }
    }

    fn convert(&mut self, event: &InputEvent) -> Result<Option<Vec<u8>>, ConvertError> {
        let mut report = MouseReport::default();

        match event.event_type() {
            EventType::KEY if Self::is_button(event.code) => {
                let bit = 1u8 << (event.code - BUTTON_BASE);
                if event.value != 0 {
                    self.buttons |= bit;
                } else {
                    self.buttons &= !bit;
                }
            }
            // Deltas wrap to a signed byte
            EventType::RELATIVE => match RelativeAxisCode(event.code) {
                RelativeAxisCode::REL_X => report.x = event.value as i8,
                RelativeAxisCode::REL_Y => report.y = event.value as i8,
                RelativeAxisCode::REL_WHEEL => report.wheel = event.value as i8,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        }

        report.buttons = self.buttons;
        Ok(Some(report.pack()?.to_vec()))
    }
}
