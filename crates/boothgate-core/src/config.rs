// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer configuration consumed by the arbiter.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BoothError, Result};

/// Marker matched against device names when none is configured.
pub const DEFAULT_DEVICE_MARKER: &str = "SELPHY";

/// Local CUPS scheduler.
pub const DEFAULT_CUPS_SERVER: &str = "ipp://localhost:631";

/// How many prints the processing phase sends without a guest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AutoPrintRepr", into = "AutoPrintRepr")]
pub enum AutoPrint {
    /// A fixed count (0 disables auto-print).
    Count(u32),
    /// As many as the duplicate budget allows.
    Max,
}

impl AutoPrint {
    /// Resolve to a concrete count.
    pub fn resolve(self, max_duplicates: u32) -> u32 {
        match self {
            Self::Count(n) => n,
            Self::Max => max_duplicates,
        }
    }
}

impl FromStr for AutoPrint {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Count)
            .map_err(|_| BoothError::Config(format!("auto_print must be an integer or \"max\", got '{s}'")))
    }
}

/// On-disk shape of `auto_print`: a number or the keyword `"max"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AutoPrintRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<AutoPrintRepr> for AutoPrint {
    type Error = BoothError;

    fn try_from(repr: AutoPrintRepr) -> Result<Self> {
        match repr {
            AutoPrintRepr::Count(n) => Ok(Self::Count(n)),
            AutoPrintRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<AutoPrint> for AutoPrintRepr {
    fn from(value: AutoPrint) -> Self {
        match value {
            AutoPrint::Count(n) => Self::Count(n),
            AutoPrint::Max => Self::Keyword("max".into()),
        }
    }
}

/// The `[PRINTER]` settings of a booth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Copies of the picture laid out on one printed page.
    pub pictures_per_page: u32,
    /// Prints allowed for one picture before the budget resets.
    pub max_duplicates: u32,
    /// Total pages the printer may produce in this process.
    pub max_pages: u32,
    /// Prints sent automatically while processing.
    pub auto_print: AutoPrint,
    /// Case-insensitive substring identifying the booth printer.
    pub device_marker: String,
    /// How long a fault notice stays on screen.
    pub fault_display_secs: u64,
    /// CUPS queue to print to. `None` uses the first queue matching the marker.
    pub cups_queue: Option<String>,
    /// Base URI of the CUPS scheduler.
    pub cups_server: String,
    /// Upper bound for one IPP request (status query or job submission).
    pub request_timeout_secs: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            pictures_per_page: 1,
            max_duplicates: 3,
            max_pages: 100,
            auto_print: AutoPrint::Count(0),
            device_marker: DEFAULT_DEVICE_MARKER.into(),
            fault_display_secs: 3,
            cups_queue: None,
            cups_server: DEFAULT_CUPS_SERVER.into(),
            request_timeout_secs: 10,
        }
    }
}

impl PrinterConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pictures_per_page == 0 {
            return Err(BoothError::Config("pictures_per_page must be at least 1".into()));
        }
        if self.device_marker.trim().is_empty() {
            return Err(BoothError::Config("device_marker must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(BoothError::Config("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Auto-print count with `"max"` resolved against `max_duplicates`.
    pub fn auto_print_count(&self) -> u32 {
        self.auto_print.resolve(self.max_duplicates)
    }

    pub fn fault_display_duration(&self) -> Duration {
        Duration::from_secs(self.fault_display_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_print_accepts_integer_and_max() {
        let json = r#"{"auto_print": "max", "max_duplicates": 4}"#;
        let config: PrinterConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.auto_print, AutoPrint::Max);
        assert_eq!(config.auto_print_count(), 4);

        let json = r#"{"auto_print": 2}"#;
        let config: PrinterConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.auto_print_count(), 2);
    }

    #[test]
    fn auto_print_rejects_other_keywords() {
        let json = r#"{"auto_print": "all"}"#;
        assert!(serde_json::from_str::<PrinterConfig>(json).is_err());
        assert!("lots".parse::<AutoPrint>().is_err());
        assert_eq!(" MAX ".parse::<AutoPrint>().expect("parse"), AutoPrint::Max);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config: PrinterConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, PrinterConfig::default());
        assert_eq!(config.device_marker, DEFAULT_DEVICE_MARKER);
        assert_eq!(config.fault_display_duration(), Duration::from_secs(3));
        assert_eq!(config.cups_server, DEFAULT_CUPS_SERVER);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("printer.json");
        let config = PrinterConfig {
            pictures_per_page: 2,
            auto_print: AutoPrint::Max,
            cups_queue: Some("Canon_SELPHY_CP1500".into()),
            ..Default::default()
        };
        config.save(&path).expect("save");

        let loaded = PrinterConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn zero_pictures_per_page_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("printer.json");
        std::fs::write(&path, r#"{"pictures_per_page": 0}"#).expect("write");

        let err = PrinterConfig::load(&path).expect_err("should reject");
        assert!(matches!(err, BoothError::Config(_)));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let config = PrinterConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BoothError::Config(_))));
    }
}
