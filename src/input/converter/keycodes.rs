//! Translation tables from Linux key codes to USB HID usage IDs
//! (HID Usage Tables, Keyboard/Keypad page 0x07).
use std::{collections::HashMap, sync::LazyLock};

use evdev::KeyCode;

/// Modifier keys and their bit in the first byte of a keyboard report
const MODIFIERS: [(KeyCode, u8); 8] = [
    (KeyCode::KEY_LEFTCTRL, 0x01),
    (KeyCode::KEY_LEFTSHIFT, 0x02),
    (KeyCode::KEY_LEFTALT, 0x04),
    (KeyCode::KEY_LEFTMETA, 0x08),
    (KeyCode::KEY_RIGHTCTRL, 0x10),
    (KeyCode::KEY_RIGHTSHIFT, 0x20),
    (KeyCode::KEY_RIGHTALT, 0x40),
    (KeyCode::KEY_RIGHTMETA, 0x80),
];

/// Regular keys and their HID usage ID
const USAGES: &[(KeyCode, u8)] = &[
    // Control keys
    (KeyCode::KEY_ESC, 0x29),
    (KeyCode::KEY_BACKSPACE, 0x2A),
    (KeyCode::KEY_TAB, 0x2B),
    (KeyCode::KEY_ENTER, 0x28),
    (KeyCode::KEY_CAPSLOCK, 0x39),
    (KeyCode::KEY_SPACE, 0x2C),
    // Number row
    (KeyCode::KEY_1, 0x1E),
    (KeyCode::KEY_2, 0x1F),
    (KeyCode::KEY_3, 0x20),
    (KeyCode::KEY_4, 0x21),
    (KeyCode::KEY_5, 0x22),
    (KeyCode::KEY_6, 0x23),
    (KeyCode::KEY_7, 0x24),
    (KeyCode::KEY_8, 0x25),
    (KeyCode::KEY_9, 0x26),
    (KeyCode::KEY_0, 0x27),
    // Top row
    (KeyCode::KEY_Q, 0x14),
    (KeyCode::KEY_W, 0x1A),
    (KeyCode::KEY_E, 0x08),
    (KeyCode::KEY_R, 0x15),
    (KeyCode::KEY_T, 0x17),
    (KeyCode::KEY_Y, 0x1C),
    (KeyCode::KEY_U, 0x18),
    (KeyCode::KEY_I, 0x0C),
    (KeyCode::KEY_O, 0x12),
    (KeyCode::KEY_P, 0x13),
    // Home row
    (KeyCode::KEY_A, 0x04),
    (KeyCode::KEY_S, 0x16),
    (KeyCode::KEY_D, 0x07),
    (KeyCode::KEY_F, 0x09),
    (KeyCode::KEY_G, 0x0A),
    (KeyCode::KEY_H, 0x0B),
    (KeyCode::KEY_J, 0x0D),
    (KeyCode::KEY_K, 0x0E),
    (KeyCode::KEY_L, 0x0F),
    // Bottom row
    (KeyCode::KEY_Z, 0x1D),
    (KeyCode::KEY_X, 0x1B),
    (KeyCode::KEY_C, 0x06),
    (KeyCode::KEY_V, 0x19),
    (KeyCode::KEY_B, 0x05),
    (KeyCode::KEY_N, 0x11),
    (KeyCode::KEY_M, 0x10),
    // Punctuation
    (KeyCode::KEY_MINUS, 0x2D),
    (KeyCode::KEY_EQUAL, 0x2E),
    (KeyCode::KEY_LEFTBRACE, 0x2F),
    (KeyCode::KEY_RIGHTBRACE, 0x30),
    (KeyCode::KEY_BACKSLASH, 0x31),
    (KeyCode::KEY_SEMICOLON, 0x33),
    (KeyCode::KEY_APOSTROPHE, 0x34),
    (KeyCode::KEY_GRAVE, 0x35),
    (KeyCode::KEY_COMMA, 0x36),
    (KeyCode::KEY_DOT, 0x37),
    (KeyCode::KEY_SLASH, 0x38),
    // Function keys
    (KeyCode::KEY_F1, 0x3A),
    (KeyCode::KEY_F2, 0x3B),
    (KeyCode::KEY_F3, 0x3C),
    (KeyCode::KEY_F4, 0x3D),
    (KeyCode::KEY_F5, 0x3E),
    (KeyCode::KEY_F6, 0x3F),
    (KeyCode::KEY_F7, 0x40),
    (KeyCode::KEY_F8, 0x41),
    (KeyCode::KEY_F9, 0x42),
    (KeyCode::KEY_F10, 0x43),
    (KeyCode::KEY_F11, 0x44),
    (KeyCode::KEY_F12, 0x45),
    // Navigation cluster
    (KeyCode::KEY_INSERT, 0x49),
    (KeyCode::KEY_HOME, 0x4A),
    (KeyCode::KEY_PAGEUP, 0x4B),
    (KeyCode::KEY_DELETE, 0x4C),
    (KeyCode::KEY_END, 0x4D),
    (KeyCode::KEY_PAGEDOWN, 0x4E),
    (KeyCode::KEY_RIGHT, 0x4F),
    (KeyCode::KEY_LEFT, 0x50),
    (KeyCode::KEY_DOWN, 0x51),
    (KeyCode::KEY_UP, 0x52),
];

static MODIFIER_BITS: LazyLock<HashMap<u16, u8>> = LazyLock::new(|| {
    MODIFIERS
        .iter()
        .map(|(key, bit)| (key.code(), *bit))
        .collect()
});

static USAGE_IDS: LazyLock<HashMap<u16, u8>> = LazyLock::new(|| {
    USAGES
        .iter()
        .map(|(key, usage)| (key.code(), *usage))
        .collect()
});

/// Returns the modifier bit for the given key code, if it is a modifier key
pub fn modifier_bit(code: u16) -> Option<u8> {
    MODIFIER_BITS.get(&code).copied()
}

/// Returns the HID usage ID for the given non-modifier key code
pub fn usage_id(code: u16) -> Option<u8> {
    USAGE_IDS.get(&code).copied()
}

/// Returns true if the key code can be relayed
pub fn is_supported(code: u16) -> bool {
    modifier_bit(code).is_some() || usage_id(code).is_some()
}

/// Returns the HID usage ID to type the given character on a US layout
/// without modifiers. Used to type test messages.
pub fn usage_for_char(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(0x04 + (c as u8 - b'a')),
        '1'..='9' => Some(0x1E + (c as u8 - b'1')),
        '0' => Some(0x27),
        ' ' => Some(0x2C),
        '\n' => Some(0x28),
        '-' => Some(0x2D),
        '=' => Some(0x2E),
        ',' => Some(0x36),
        '.' => Some(0x37),
        '/' => Some(0x38),
        _ => None,
    }
}
