// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boothgate Print — session duplicate quotas, printer health checks, and the
// arbiter that decides when the booth may print.  This crate sits between the
// domain types in `boothgate-core` and the printer bridges in
// `boothgate-bridge`.

pub mod arbiter;
pub mod health;
pub mod quota;

pub use arbiter::{AttemptOutcome, PrintArbiter, Tick};
pub use health::HealthMonitor;
pub use quota::QuotaTracker;
