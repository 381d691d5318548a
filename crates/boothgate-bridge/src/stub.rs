// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory printer and display for machines without CUPS, and for tests.
//
// Handles are cheap clones over shared state, so a test can keep one handle
// for inspection while the arbiter owns another.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use boothgate_core::error::{BoothError, Result};
use boothgate_core::types::DeviceStatus;
use tracing::{debug, info};

use crate::traits::{DeviceStatusSource, FaultDisplay, PrinterDevice};

#[derive(Debug)]
struct SimState {
    name: String,
    installed: bool,
    max_pages: u32,
    pages_printed: u32,
    state_reasons: Vec<String>,
    other_devices: Vec<DeviceStatus>,
    status_error: Option<String>,
    print_error: Option<String>,
    jobs: Vec<(PathBuf, u32)>,
    /// Calls that would reach the printing subsystem (`is_installed`, `devices`).
    status_queries: u32,
    quit_called: bool,
}

/// Simulated booth printer implementing both printer traits.
#[derive(Debug, Clone)]
pub struct SimulatedPrinter {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPrinter {
    pub fn new(name: impl Into<String>, max_pages: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                name: name.into(),
                installed: true,
                max_pages,
                pages_printed: 0,
                state_reasons: Vec::new(),
                other_devices: Vec::new(),
                status_error: None,
                print_error: None,
                jobs: Vec::new(),
                status_queries: 0,
                quit_called: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Unplug (`false`) or plug in (`true`) the printer.
    pub fn set_installed(&self, installed: bool) {
        self.state().installed = installed;
    }

    /// Replace the printer's state reasons.
    pub fn set_state_reasons(&self, reasons: &[&str]) {
        self.state().state_reasons = reasons.iter().map(|r| r.to_string()).collect();
    }

    /// Add an unrelated device to the enumeration.
    pub fn add_other_device(&self, device: DeviceStatus) {
        self.state().other_devices.push(device);
    }

    /// Make every status query fail with `detail` (`None` restores it).
    pub fn fail_status_queries(&self, detail: Option<&str>) {
        self.state().status_error = detail.map(String::from);
    }

    /// Make every print command fail with `detail` (`None` restores it).
    pub fn fail_print_commands(&self, detail: Option<&str>) {
        self.state().print_error = detail.map(String::from);
    }

    /// Files sent so far with their copy counts.
    pub fn jobs(&self) -> Vec<(PathBuf, u32)> {
        self.state().jobs.clone()
    }

    pub fn pages_printed(&self) -> u32 {
        self.state().pages_printed
    }

    pub fn quit_called(&self) -> bool {
        self.state().quit_called
    }

    /// Number of `is_installed` and `devices` calls so far.
    pub fn status_queries(&self) -> u32 {
        self.state().status_queries
    }
}

impl PrinterDevice for SimulatedPrinter {
    fn is_installed(&self) -> bool {
        let mut state = self.state();
        state.status_queries += 1;
        state.installed
    }

    fn is_ready(&self) -> bool {
        let state = self.state();
        state.installed && state.pages_printed < state.max_pages
    }

    fn print_file(&self, path: &Path, copies: u32) -> Result<()> {
        let mut state = self.state();
        if let Some(detail) = &state.print_error {
            return Err(BoothError::Device(detail.clone()));
        }
        if !state.installed {
            return Err(BoothError::Device(format!("{} is not connected", state.name)));
        }
        state.jobs.push((path.to_path_buf(), copies));
        state.pages_printed += 1;
        info!(printer = %state.name, path = %path.display(), copies, "simulated print");
        Ok(())
    }

    fn quit(&self) {
        let mut state = self.state();
        state.quit_called = true;
        debug!(printer = %state.name, "simulated printer released");
    }
}

impl DeviceStatusSource for SimulatedPrinter {
    fn devices(&self) -> Result<Vec<DeviceStatus>> {
        let mut state = self.state();
        state.status_queries += 1;
        if let Some(detail) = &state.status_error {
            return Err(BoothError::StatusQuery(detail.clone()));
        }
        let mut devices = state.other_devices.clone();
        if state.installed {
            devices.push(DeviceStatus {
                name: state.name.clone(),
                state_reasons: state.state_reasons.clone(),
            });
        }
        Ok(devices)
    }
}

/// Display that records messages instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    shown: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far with their requested durations.
    pub fn messages(&self) -> Vec<(String, Duration)> {
        self.shown
            .lock()
            .map(|shown| shown.clone())
            .unwrap_or_default()
    }
}

impl FaultDisplay for RecordingDisplay {
    fn show_fault_message(&self, text: &str, duration: Duration) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push((text.to_string(), duration));
        }
    }
}
