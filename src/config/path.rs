//! Module for searching for hid-relay config files

use std::path::PathBuf;

use crate::constants::{SYSTEM_CONFIG_PATH, XDG_PREFIX};

/// Name of the config file inside each config directory
const CONFIG_FILE: &str = "config.yaml";

/// Returns the first config file that exists, if any. The system config in
/// /etc takes precedence over the XDG config directories.
pub fn find_config_file() -> Option<PathBuf> {
    let system_path = PathBuf::from(SYSTEM_CONFIG_PATH);
    if system_path.is_file() {
        return Some(system_path);
    }

    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix(XDG_PREFIX) else {
        log::debug!("Unable to determine XDG config directories");
        return None;
    };
    let path = base_dirs.find_config_file(CONFIG_FILE);
    log::trace!("Found XDG config file: {path:?}");

    path
}
