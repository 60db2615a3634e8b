//! Boot protocol reports understood by the Linux HID gadget function
//! (see Documentation/usb/gadget_hid.rst in the kernel tree).
use packed_struct::prelude::*;

/// Size of a keyboard report in bytes
pub const KEYBOARD_REPORT_SIZE: usize = 8;
/// Size of a mouse report in bytes
pub const MOUSE_REPORT_SIZE: usize = 4;

// KeyboardReport
//
// # Modifiers: LCtrl | Reserved | Key 1 | Key 2 | Key 3 | Key 4 | Key 5 | Key 6
// 02 00 04 00 00 00 00 00  <- shift + a
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct KeyboardReport {
    // BYTE 0
    #[packed_field(bytes = "0")]
    pub modifiers: u8,
    // BYTE 1
    #[packed_field(bytes = "1")]
    pub reserved: u8,
    // BYTE 2-7
    #[packed_field(bytes = "2..=7")]
    pub keys: [u8; 6],
}

impl KeyboardReport {
    /// Create a report with the given modifier mask and a single held key.
    /// A key of 0 means no key is held.
    pub fn new(modifiers: u8, key: u8) -> Self {
        let mut keys = [0; 6];
        keys[0] = key;
        Self {
            modifiers,
            keys,
            ..Default::default()
        }
    }
}

// MouseReport
//
// # Buttons | X | Y | Wheel
// 01 0a 00 00  <- left button held, moving right by 10
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct MouseReport {
    // BYTE 0
    #[packed_field(bytes = "0")]
    pub buttons: u8,
    // BYTE 1
    #[packed_field(bytes = "1")]
    pub x: i8,
    // BYTE 2
    #[packed_field(bytes = "2")]
    pub y: i8,
    // BYTE 3
    #[packed_field(bytes = "3")]
    pub wheel: i8,
}
