// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator interfaces consumed by the print arbiter.
//
// The arbiter never talks to a spooler or a screen directly. Each backend
// (CUPS, simulated) implements these traits; all of them are `Send + Sync` so
// one arbiter can be shared by a multi-threaded host.

use std::path::Path;
use std::time::Duration;

use boothgate_core::error::Result;
use boothgate_core::types::DeviceStatus;

/// Command side of the booth printer.
pub trait PrinterDevice: Send + Sync {
    /// Whether a matching printer is currently enumerable.
    fn is_installed(&self) -> bool;

    /// False once the configured `max_pages` have been printed.
    fn is_ready(&self) -> bool;

    /// Send one page holding `copies` pictures of the file.
    /// Returns `BoothError::Device` on transport failure.
    fn print_file(&self, path: &Path, copies: u32) -> Result<()>;

    /// Release anything held on behalf of the session.
    fn quit(&self);
}

/// Fault side of the printing subsystem.
pub trait DeviceStatusSource: Send + Sync {
    /// Every device the subsystem knows about with its raw state reasons.
    fn devices(&self) -> Result<Vec<DeviceStatus>>;
}

/// Guest-facing notice for printer faults.
pub trait FaultDisplay: Send + Sync {
    /// Show `text` and block for `duration` before returning to the host loop.
    fn show_fault_message(&self, text: &str, duration: Duration);
}
