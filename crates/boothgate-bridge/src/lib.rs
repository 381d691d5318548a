// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boothgate — Printer and display collaborator bridges.
//
// The arbiter only sees the traits in `traits`. `cups` drives a real printer
// over IPP through the local CUPS scheduler; `stub` simulates one in memory.

pub mod cups;
pub mod layout;
pub mod stub;
pub mod traits;

use std::sync::Arc;

use boothgate_core::PrinterConfig;
use boothgate_core::error::Result;
use tracing::{info, warn};

pub use traits::{DeviceStatusSource, FaultDisplay, PrinterDevice};

/// Printer collaborators handed to the arbiter.
#[derive(Clone)]
pub struct PrinterBackend {
    pub printer: Arc<dyn PrinterDevice>,
    pub status: Arc<dyn DeviceStatusSource>,
    /// Human-readable backend name for logs.
    pub name: &'static str,
}

/// Pick the CUPS backend when the scheduler answers, otherwise a simulated
/// printer so the booth still starts on development machines.
pub fn printer_backend(config: &PrinterConfig) -> PrinterBackend {
    match cups_backend(config) {
        Ok(backend) => backend,
        Err(e) => {
            warn!(error = %e, server = %config.cups_server, "CUPS unavailable — using simulated printer");
            let sim = stub::SimulatedPrinter::new(
                format!("Simulated_{}", config.device_marker),
                config.max_pages,
            );
            PrinterBackend {
                printer: Arc::new(sim.clone()),
                status: Arc::new(sim),
                name: "simulated",
            }
        }
    }
}

fn cups_backend(config: &PrinterConfig) -> Result<PrinterBackend> {
    let cups = Arc::new(cups::CupsIppPrinter::new(config)?);
    let queues = cups.devices()?.len();
    info!(server = %config.cups_server, queues, "using CUPS printer backend");
    Ok(PrinterBackend {
        printer: cups.clone(),
        status: cups,
        name: "cups",
    })
}
