// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal stand-in for the booth screen.

use std::io::Write;
use std::time::Duration;

use boothgate_bridge::FaultDisplay;

/// Prints fault notices on stderr and holds for the requested time, the way
/// the booth screen freezes on an error.
pub struct ConsoleDisplay;

impl FaultDisplay for ConsoleDisplay {
    fn show_fault_message(&self, text: &str, duration: Duration) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr must not take the booth down.
        let _ = writeln!(stderr, "\n  !! {text}\n");
        let _ = stderr.flush();
        std::thread::sleep(duration);
    }
}
