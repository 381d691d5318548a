// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer health checks taken right before each print attempt.
//
// The printing subsystem reports free-form `printer-state-reasons` keywords
// (often with `-error`, `-warning` or `-report` suffixes). Only a handful of
// them mean the booth cannot print; those are reduced to a `FaultKind` using a
// fixed priority table. Devices are checked in the order the printing
// subsystem lists them and the first faulty one decides.

use std::sync::Arc;

use boothgate_bridge::PrinterBackend;
use boothgate_bridge::traits::{DeviceStatusSource, PrinterDevice};
use boothgate_core::types::{DeviceStatus, FaultKind, PrinterSnapshot};
use chrono::Utc;
use tracing::{debug, error, info};

/// Reason substrings in priority order. First entry matched wins.
const FAULT_PRIORITY: [(&str, FaultKind); 4] = [
    ("offline", FaultKind::Offline),
    ("media-empty", FaultKind::OutOfMedia),
    ("marker-supply-empty", FaultKind::OutOfInk),
    ("input-tray-missing", FaultKind::TrayMissing),
];

/// Reduce state reasons to at most one fault.
///
/// Reasons are compared lower-cased and by substring, so `media-empty-error`
/// matches `media-empty`. Unknown reasons are ignored.
pub fn classify_reasons<S: AsRef<str>>(reasons: &[S]) -> Option<FaultKind> {
    let lowered: Vec<String> = reasons
        .iter()
        .map(|r| r.as_ref().to_lowercase())
        .collect();

    FAULT_PRIORITY
        .iter()
        .find(|(pattern, _)| lowered.iter().any(|r| r.contains(pattern)))
        .map(|(_, fault)| *fault)
}

/// Fault of the first device whose name contains `marker` (case-insensitive)
/// and reports one. Later devices are not looked at once a fault is found.
pub fn classify_devices(devices: &[DeviceStatus], marker: &str) -> Option<FaultKind> {
    let marker = marker.to_lowercase();
    devices
        .iter()
        .filter(|d| d.name.to_lowercase().contains(&marker))
        .inspect(|d| debug!(device = %d.name, reasons = ?d.state_reasons, "checking printer state"))
        .find_map(|d| classify_reasons(&d.state_reasons))
}

/// Builds a [`PrinterSnapshot`] from the printer collaborators.
pub struct HealthMonitor {
    printer: Arc<dyn PrinterDevice>,
    status: Arc<dyn DeviceStatusSource>,
    marker: String,
}

impl HealthMonitor {
    pub fn new(backend: &PrinterBackend, marker: &str) -> Self {
        Self {
            printer: backend.printer.clone(),
            status: backend.status.clone(),
            marker: marker.to_string(),
        }
    }

    /// Current state of the booth printer. Never fails: a status query error
    /// becomes `FaultKind::CommunicationError` and is logged here.
    ///
    /// One call is one health check; the arbiter gates a whole attempt on a
    /// single snapshot.
    pub fn query(&self) -> PrinterSnapshot {
        let fault = match self.status.devices() {
            Ok(devices) => classify_devices(&devices, &self.marker),
            Err(e) => {
                error!(error = %e, marker = %self.marker, "printer status query failed");
                Some(FaultKind::CommunicationError)
            }
        };

        let snapshot = PrinterSnapshot {
            installed: self.printer.is_installed(),
            ready: self.printer.is_ready(),
            fault,
            checked_at: Utc::now(),
        };

        if let Some(fault) = snapshot.fault {
            info!(
                %fault,
                installed = snapshot.installed,
                checked_at = %snapshot.checked_at,
                "printer fault detected"
            );
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boothgate_bridge::stub::SimulatedPrinter;

    fn monitor(sim: &SimulatedPrinter) -> HealthMonitor {
        let backend = PrinterBackend {
            printer: Arc::new(sim.clone()),
            status: Arc::new(sim.clone()),
            name: "simulated",
        };
        HealthMonitor::new(&backend, "SELPHY")
    }

    #[test]
    fn priority_beats_report_order() {
        assert_eq!(
            classify_reasons(&["media-empty-error", "printer-offline"]),
            Some(FaultKind::Offline)
        );
        assert_eq!(
            classify_reasons(&["input-tray-missing", "marker-supply-empty-warning"]),
            Some(FaultKind::OutOfInk)
        );
    }

    #[test]
    fn reasons_are_case_insensitive() {
        assert_eq!(classify_reasons(&["MEDIA-EMPTY-ERROR"]), Some(FaultKind::OutOfMedia));
    }

    #[test]
    fn unknown_reasons_are_not_faults() {
        assert_eq!(classify_reasons(&["none", "cover-open", "toner-low"]), None);
        assert_eq!(classify_reasons::<&str>(&[]), None);
    }

    #[test]
    fn only_marked_devices_are_considered() {
        let devices = vec![
            DeviceStatus::new("Office_Laser", &["offline-report"]),
            DeviceStatus::new("Canon_Selphy_CP1500", &["media-empty-error"]),
        ];
        assert_eq!(classify_devices(&devices, "SELPHY"), Some(FaultKind::OutOfMedia));
        assert_eq!(classify_devices(&devices, "DNP"), None);
    }

    #[test]
    fn first_faulty_device_wins() {
        let devices = vec![
            DeviceStatus::new("SELPHY_A", &["input-tray-missing"]),
            DeviceStatus::new("SELPHY_B", &["offline"]),
        ];
        assert_eq!(classify_devices(&devices, "selphy"), Some(FaultKind::TrayMissing));
    }

    #[test]
    fn healthy_devices_are_skipped() {
        let devices = vec![
            DeviceStatus::new("SELPHY_A", &["toner-low"]),
            DeviceStatus::new("SELPHY_B", &["marker-supply-empty-error"]),
        ];
        assert_eq!(classify_devices(&devices, "selphy"), Some(FaultKind::OutOfInk));
    }

    #[test]
    fn healthy_printer_snapshot() {
        let sim = SimulatedPrinter::new("Canon_SELPHY_CP1500", 10);
        let before = Utc::now();
        let snapshot = monitor(&sim).query();
        assert!(snapshot.installed);
        assert!(snapshot.ready);
        assert_eq!(snapshot.fault, None);
        assert!(snapshot.checked_at >= before && snapshot.checked_at <= Utc::now());
    }

    #[test]
    fn no_marked_device_means_no_fault_and_not_installed() {
        let sim = SimulatedPrinter::new("Canon_SELPHY_CP1500", 10);
        sim.set_installed(false);
        sim.add_other_device(DeviceStatus::new("Office_Laser", &["offline"]));

        let snapshot = monitor(&sim).query();
        assert!(!snapshot.installed);
        assert_eq!(snapshot.fault, None);
    }

    #[test]
    fn query_failure_is_communication_error() {
        let sim = SimulatedPrinter::new("Canon_SELPHY_CP1500", 10);
        sim.fail_status_queries(Some("connection refused"));
        assert_eq!(monitor(&sim).query().fault, Some(FaultKind::CommunicationError));
    }
}
