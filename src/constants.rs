/// Pseudo-file listing every input device known to the kernel
pub const PROC_INPUT_DEVICES: &str = "/proc/bus/input/devices";
/// Directory containing the evdev character devices
pub const INPUT_PATH: &str = "/dev/input";
/// Default HID gadget device for mouse reports
pub const DEFAULT_MOUSE_OUTPUT: &str = "/dev/hidg0";
/// Default HID gadget device for keyboard reports
pub const DEFAULT_KEYBOARD_OUTPUT: &str = "/dev/hidg1";
/// System-wide configuration file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/hid-relay/config.yaml";
/// Prefix used for XDG configuration lookups
pub const XDG_PREFIX: &str = "hid-relay";
