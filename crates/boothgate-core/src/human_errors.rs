// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Guest-facing fault messages.
//
// Booth guests are not printer operators: every fault is reduced to one short
// sentence they can read from a few steps away. Technical detail stays in the
// log.

use crate::error::Rejection;
use crate::types::FaultKind;

/// Shown for every communication failure, whatever the underlying cause.
pub const CONNECTIVITY_MESSAGE: &str = "We can't reach the printer right now.";

/// Plain text for a fault category.
pub fn fault_message(fault: FaultKind) -> &'static str {
    match fault {
        FaultKind::Offline => "The printer is disconnected.",
        FaultKind::OutOfMedia => "The printer is out of paper.",
        FaultKind::OutOfInk => "The ink cassette is empty.",
        FaultKind::TrayMissing => "No paper, or the paper cassette is not inserted properly.",
        FaultKind::CommunicationError => CONNECTIVITY_MESSAGE,
    }
}

/// Text to show on screen for a rejection, or `None` for silent ones.
pub fn rejection_message(rejection: &Rejection) -> Option<&'static str> {
    match rejection {
        Rejection::QuotaExceeded(_) => None,
        Rejection::DeviceFault(fault) => Some(fault_message(*fault)),
        Rejection::CommunicationError(_) => Some(CONNECTIVITY_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuotaKind;

    #[test]
    fn quota_has_no_message() {
        assert!(rejection_message(&Rejection::QuotaExceeded(QuotaKind::Pages)).is_none());
    }

    #[test]
    fn communication_detail_is_not_shown() {
        let rejection = Rejection::CommunicationError("CUPS-Get-Printers: connection refused".into());
        let message = rejection_message(&rejection).expect("displayed");
        assert_eq!(message, CONNECTIVITY_MESSAGE);
        assert!(!message.contains("refused"));
    }

    #[test]
    fn media_empty_reads_as_paper() {
        let message = rejection_message(&Rejection::DeviceFault(FaultKind::OutOfMedia));
        assert_eq!(message, Some("The printer is out of paper."));
    }
}
