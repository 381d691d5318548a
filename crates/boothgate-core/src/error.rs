// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Boothgate.

use thiserror::Error;

use crate::types::{FaultKind, QuotaKind};

/// Error type for collaborator boundaries and configuration.
#[derive(Debug, Error)]
pub enum BoothError {
    // -- Printer collaborators --
    #[error("printer command failed: {0}")]
    Device(String),

    #[error("printer status query failed: {0}")]
    StatusQuery(String),

    #[error("page composition failed: {0}")]
    Image(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BoothError>;

/// Why a single print attempt did not reach the printer (or did not finish).
///
/// Rejections never escape the arbiter as failures of the host loop; they are
/// logged, optionally shown to the guest, and returned as outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Duplicate or page budget used up. Silent to the guest.
    #[error("{0} budget exhausted")]
    QuotaExceeded(QuotaKind),

    /// The printer reported a hardware condition.
    #[error("printer fault: {0}")]
    DeviceFault(FaultKind),

    /// Status query or print command could not complete.
    #[error("printer communication failed: {0}")]
    CommunicationError(String),
}

impl From<BoothError> for Rejection {
    fn from(err: BoothError) -> Self {
        Self::CommunicationError(err.to_string())
    }
}
