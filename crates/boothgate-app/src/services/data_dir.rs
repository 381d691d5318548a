// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory and printer config file resolution.

use std::path::{Path, PathBuf};

use boothgate_core::PrinterConfig;
use tracing::{info, warn};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "BOOTHGATE_CONFIG";

const CONFIG_FILE: &str = "printer.json";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = dirs_fallback().join("boothgate");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// `$BOOTHGATE_CONFIG`, or `printer.json` in the data directory.
pub fn config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => PathBuf::from(path),
        None => data_dir().join(CONFIG_FILE),
    }
}

/// Load the printer config, falling back to defaults.
///
/// A missing file is created with the defaults so operators have something to
/// edit. An unreadable or invalid file is logged and ignored.
pub fn load_config(path: &Path) -> PrinterConfig {
    if !path.exists() {
        let config = PrinterConfig::default();
        match config.save(path) {
            Ok(()) => info!(path = %path.display(), "wrote default printer config"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not write default printer config"),
        }
        return config;
    }

    match PrinterConfig::load(path) {
        Ok(config) => {
            info!(path = %path.display(), "printer config loaded");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "invalid printer config — using defaults");
            PrinterConfig::default()
        }
    }
}

fn dirs_fallback() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}
