// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Boothgate print arbiter.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation id for the log records of one print attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host lifecycle phases the arbiter is notified from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Recovery phase at the start of a capture cycle.
    Failsafe,
    /// Idle screen between sessions.
    Waiting,
    /// Picture is being assembled.
    Processing,
    /// Guest is asked whether to print.
    PrintPrompt,
}

/// What caused a print attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintTrigger {
    /// A guest pressed the print button.
    Manual,
    /// Auto-print during the processing phase.
    Auto,
}

/// Device-health categories surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    Offline,
    OutOfMedia,
    OutOfInk,
    TrayMissing,
    CommunicationError,
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Offline => "offline",
            Self::OutOfMedia => "out of media",
            Self::OutOfInk => "out of ink",
            Self::TrayMissing => "tray missing",
            Self::CommunicationError => "communication error",
        };
        f.write_str(name)
    }
}

/// Which budget stopped a print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaKind {
    /// `max_duplicates` copies of the current picture already printed.
    Duplicates,
    /// The printer reached `max_pages`.
    Pages,
}

impl std::fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicates => f.write_str("duplicate"),
            Self::Pages => f.write_str("page"),
        }
    }
}

/// One device as enumerated by the printing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Queue or device name, e.g. `Canon_SELPHY_CP1500`.
    pub name: String,
    /// Raw `printer-state-reasons` keywords as reported.
    pub state_reasons: Vec<String>,
}

impl DeviceStatus {
    pub fn new(name: impl Into<String>, state_reasons: &[&str]) -> Self {
        Self {
            name: name.into(),
            state_reasons: state_reasons.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Device state taken immediately before a print attempt. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterSnapshot {
    /// A matching device is currently enumerable.
    pub installed: bool,
    /// The device has not used up its `max_pages` budget.
    pub ready: bool,
    /// At most one fault, chosen by priority.
    pub fault: Option<FaultKind>,
    /// When the check ran. Logged with every fault it reports.
    pub checked_at: DateTime<Utc>,
}

/// A single print attempt. Lives only for the duration of one arbitration call.
#[derive(Debug, Clone)]
pub struct PrintRequest {
    pub id: RequestId,
    pub picture: PathBuf,
    /// Copies handed to the printer for one page layout.
    pub copies: u32,
    pub trigger: PrintTrigger,
}

impl PrintRequest {
    pub fn new(picture: impl Into<PathBuf>, copies: u32, trigger: PrintTrigger) -> Self {
        Self {
            id: RequestId::new(),
            picture: picture.into(),
            copies,
            trigger,
        }
    }
}
