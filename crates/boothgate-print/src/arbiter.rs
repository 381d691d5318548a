// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print arbitration for the booth lifecycle.
//
// The host drives the phases (failsafe → waiting → processing → print prompt)
// and notifies the arbiter on phase entry and on every polling tick. The
// arbiter decides whether a print may go out, runs the attempt against the
// printer, and turns every failure into a logged (and, for faults, displayed)
// `Rejection`. Nothing here panics or returns an error to the host loop.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use boothgate_bridge::traits::{FaultDisplay, PrinterDevice};
use boothgate_bridge::PrinterBackend;
use boothgate_core::config::PrinterConfig;
use boothgate_core::error::Rejection;
use boothgate_core::human_errors::rejection_message;
use boothgate_core::types::{FaultKind, Phase, PrintRequest, PrintTrigger, PrinterSnapshot, QuotaKind};
use tracing::{debug, error, info, instrument, warn};

use crate::health::HealthMonitor;
use crate::quota::QuotaTracker;

/// Input for one polling tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tick<'a> {
    /// Last captured picture, if any.
    pub picture: Option<&'a Path>,
    /// A guest pressed the print button since the previous tick.
    pub print_requested: bool,
}

/// Result of one print attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Printed { copies: u32 },
    Rejected(Rejection),
}

impl AttemptOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}

/// Extra conditions an attempt checks against its health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Re-print from the idle screen: printer installed, duplicate and page
    /// budgets left.
    Reprint,
    /// Auto-print: ends quietly once the printer is not ready.
    Auto,
    /// Print prompt: duplicate budget and health only.
    Prompt,
}

/// Decides when the booth may print and performs the attempts.
///
/// All methods take `&self`; attempts are serialized by an internal lock so one
/// arbiter can be shared between threads.
pub struct PrintArbiter {
    config: PrinterConfig,
    printer: Arc<dyn PrinterDevice>,
    health: HealthMonitor,
    display: Arc<dyn FaultDisplay>,
    /// Held across "check health → send job → record print". One health
    /// snapshot per attempt gates everything under the lock.
    print_lock: Mutex<()>,
}

impl PrintArbiter {
    pub fn new(config: PrinterConfig, backend: PrinterBackend, display: Arc<dyn FaultDisplay>) -> Self {
        let health = HealthMonitor::new(&backend, &config.device_marker);
        info!(
            backend = backend.name,
            max_duplicates = config.max_duplicates,
            max_pages = config.max_pages,
            auto_print = ?config.auto_print,
            "print arbiter ready"
        );
        Self {
            config,
            printer: backend.printer,
            health,
            display,
            print_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    // -- Phase notifications -------------------------------------------------

    /// Dispatch a phase-enter notification.
    pub fn enter(&self, phase: Phase, quota: &mut QuotaTracker) {
        match phase {
            Phase::Failsafe => self.failsafe_enter(quota),
            Phase::Processing => self.processing_enter(quota),
            Phase::Waiting | Phase::PrintPrompt => {}
        }
    }

    /// Dispatch a phase-do notification.
    pub fn tick(&self, phase: Phase, quota: &mut QuotaTracker, tick: Tick<'_>) -> Vec<AttemptOutcome> {
        match phase {
            Phase::Failsafe => Vec::new(),
            Phase::Waiting => self.waiting_do(quota, tick),
            Phase::Processing => self.processing_do(quota, tick.picture),
            Phase::PrintPrompt => self.print_prompt_do(quota, tick),
        }
    }

    /// Start of a capture cycle: drop whatever an aborted cycle consumed.
    pub fn failsafe_enter(&self, quota: &mut QuotaTracker) {
        quota.reset_duplicates(self.config.max_duplicates);
    }

    /// Guest asked for another copy from the idle screen.
    pub fn waiting_do(&self, quota: &mut QuotaTracker, tick: Tick<'_>) -> Vec<AttemptOutcome> {
        match tick.picture {
            Some(picture) if tick.print_requested => self
                .print_picture(quota, picture, PrintTrigger::Manual, Gate::Reprint)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// New output cycle for the same picture: full budget again.
    pub fn processing_enter(&self, quota: &mut QuotaTracker) {
        quota.reset_duplicates(self.config.max_duplicates);
    }

    /// Auto-print up to `auto_print` copies, stopping when the budget runs out
    /// or the printer is not ready.
    pub fn processing_do(&self, quota: &mut QuotaTracker, picture: Option<&Path>) -> Vec<AttemptOutcome> {
        let Some(picture) = picture else {
            return Vec::new();
        };

        let count = self.config.auto_print_count();
        let mut outcomes = Vec::new();
        for _ in 0..count {
            if !quota.can_duplicate() {
                debug!(
                    requested = count,
                    sent = outcomes.len(),
                    "auto-print stopped: duplicate budget exhausted"
                );
                break;
            }
            match self.print_picture(quota, picture, PrintTrigger::Auto, Gate::Auto) {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        outcomes
    }

    /// Guest confirmed printing on the prompt screen.
    pub fn print_prompt_do(&self, quota: &mut QuotaTracker, tick: Tick<'_>) -> Vec<AttemptOutcome> {
        match tick.picture {
            Some(picture) if tick.print_requested => self
                .print_picture(quota, picture, PrintTrigger::Manual, Gate::Prompt)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Release the printer at session teardown.
    pub fn shutdown(&self) {
        let _guard = self.print_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.printer.quit();
        info!("print arbiter shut down");
    }

    // -- Print attempt -------------------------------------------------------

    fn print_picture(
        &self,
        quota: &mut QuotaTracker,
        picture: &Path,
        trigger: PrintTrigger,
        gate: Gate,
    ) -> Option<AttemptOutcome> {
        let request = PrintRequest::new(picture, self.config.pictures_per_page, trigger);
        self.print_attempt(quota, &request, gate)
    }

    /// Run one attempt: duplicate gate, health check, send, record.
    ///
    /// `None` means the gate closed without anything worth reporting (printer
    /// unplugged, or auto-print out of pages). Counters only change when the
    /// printer accepted the job. Faults and communication failures are shown
    /// on the display before returning.
    #[instrument(skip_all, fields(request_id = %request.id, trigger = ?request.trigger, ?gate))]
    fn print_attempt(
        &self,
        quota: &mut QuotaTracker,
        request: &PrintRequest,
        gate: Gate,
    ) -> Option<AttemptOutcome> {
        let outcome = {
            let _guard = self.print_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.attempt_locked(quota, request, gate)
        };

        if let Some(AttemptOutcome::Rejected(rejection)) = &outcome
            && let Some(message) = rejection_message(rejection)
        {
            self.display
                .show_fault_message(message, self.config.fault_display_duration());
        }
        outcome
    }

    fn attempt_locked(
        &self,
        quota: &mut QuotaTracker,
        request: &PrintRequest,
        gate: Gate,
    ) -> Option<AttemptOutcome> {
        if gate != Gate::Reprint && !quota.can_duplicate() {
            return Some(self.duplicates_exhausted());
        }

        let snapshot = self.health.query();
        match gate {
            Gate::Reprint => {
                if !snapshot.installed {
                    debug!("print skipped: printer not installed");
                    return None;
                }
                if !quota.can_duplicate() {
                    return Some(self.duplicates_exhausted());
                }
                if !snapshot.ready {
                    warn!(
                        printed = quota.printed(),
                        max_pages = self.config.max_pages,
                        "maximum number of printed pages reached"
                    );
                    return Some(AttemptOutcome::Rejected(Rejection::QuotaExceeded(QuotaKind::Pages)));
                }
            }
            Gate::Auto if !snapshot.ready => {
                debug!(max_pages = self.config.max_pages, "auto-print stopped: printer not ready");
                return None;
            }
            Gate::Auto | Gate::Prompt => {}
        }

        Some(self.send_locked(quota, request, &snapshot))
    }

    fn duplicates_exhausted(&self) -> AttemptOutcome {
        warn!(
            max_duplicates = self.config.max_duplicates,
            "too many duplicates sent to the printer"
        );
        AttemptOutcome::Rejected(Rejection::QuotaExceeded(QuotaKind::Duplicates))
    }

    fn send_locked(
        &self,
        quota: &mut QuotaTracker,
        request: &PrintRequest,
        snapshot: &PrinterSnapshot,
    ) -> AttemptOutcome {
        match snapshot.fault {
            Some(FaultKind::CommunicationError) => {
                error!(checked_at = %snapshot.checked_at, "print cancelled: printer status unavailable");
                return AttemptOutcome::Rejected(Rejection::CommunicationError(
                    "printer status query failed".into(),
                ));
            }
            Some(fault) => {
                error!(%fault, checked_at = %snapshot.checked_at, "print cancelled: printer fault");
                return AttemptOutcome::Rejected(Rejection::DeviceFault(fault));
            }
            None => {}
        }

        info!(picture = %request.picture.display(), copies = request.copies, "sending picture to the printer");
        if let Err(e) = self.printer.print_file(&request.picture, request.copies) {
            error!(error = %e, "print command failed");
            return AttemptOutcome::Rejected(e.into());
        }

        quota.record_print();
        info!(
            printed = quota.printed(),
            remaining = quota.remaining_duplicates(),
            "picture printed"
        );
        AttemptOutcome::Printed {
            copies: request.copies,
        }
    }
}
