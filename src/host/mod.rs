
use std::{fs, path::Path};

/// Markers in the USB device listing that indicate a host controller
const HOST_CONTROLLER_MARKERS: [&str; 4] = ["Cls=09", "EHCI", "XHCI", "OHCI"];

/// USB host and gadget support of the running system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSupport {
    /// The hardware has a USB host controller
    pub has_capability: bool,
    /// USB gadget mode is configured
    pub is_enabled: bool,
}

impl HostSupport {
    /// Returns true if the relay can run on this system
    pub fn is_supported(&self) -> bool {
        self.has_capability && self.is_enabled
    }
}

/// Probe the system under the given root directory (usually "/") for USB host
/// and gadget support. Unreadable files are treated as missing.
pub fn probe(root: impl AsRef<Path>) -> HostSupport {
    let root = root.as_ref();
    let has_capability = has_capability(root);
    if !has_capability {
        log::debug!("No USB host controller found under {}", root.display());
        return HostSupport::default();
    }

    HostSupport {
        has_capability,
        is_enabled: is_enabled(root),
    }
}

fn has_capability(root: &Path) -> bool {
    if root.join("sys/class/usb_host").exists() {
        return true;
    }

    let devices = read_file(root, "sys/kernel/debug/usb/devices");
    HOST_CONTROLLER_MARKERS
        .iter()
        .any(|marker| devices.contains(marker))
}

fn is_enabled(root: &Path) -> bool {
    // Device tree overlay for USB OTG
    if read_file(root, "boot/config.txt").contains("dtoverlay=dwc2") {
        log::trace!("Found dwc2 overlay in boot config");
        return true;
    }

    let modules = read_file(root, "proc/modules");
    if modules.contains("dwc2") && modules.contains("libcomposite") {
        log::trace!("Found dwc2 and libcomposite modules");
        return true;
    }

    root.join("sys/kernel/config/usb_gadget").exists()
}

/// Read the given file relative to the root
fn read_file(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap_or_default()
}
