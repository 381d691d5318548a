// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session print counters.

use tracing::{debug, warn};

/// Counters for one processing cycle. The host owns one tracker and passes it
/// by `&mut` into every arbiter call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaTracker {
    printed: u32,
    remaining_duplicates: u32,
}

impl QuotaTracker {
    /// A tracker with a full duplicate budget.
    pub fn new(max_duplicates: u32) -> Self {
        Self {
            printed: 0,
            remaining_duplicates: max_duplicates,
        }
    }

    /// Refill the duplicate budget. `printed` is kept.
    pub fn reset_duplicates(&mut self, max: u32) {
        debug!(
            previous = self.remaining_duplicates,
            max, "duplicate budget reset"
        );
        self.remaining_duplicates = max;
    }

    pub fn can_duplicate(&self) -> bool {
        self.remaining_duplicates > 0
    }

    /// Count one successful print.
    ///
    /// Callers gate on [`can_duplicate`](Self::can_duplicate); an ungated call
    /// still counts the print but leaves the budget at zero.
    pub fn record_print(&mut self) {
        if self.remaining_duplicates == 0 {
            warn!(printed = self.printed, "print recorded with no duplicate budget left");
        }
        self.remaining_duplicates = self.remaining_duplicates.saturating_sub(1);
        self.printed += 1;
    }

    pub fn printed(&self) -> u32 {
        self.printed
    }

    pub fn remaining_duplicates(&self) -> u32 {
        self.remaining_duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_prints_consume_budget_exactly() {
        for max in 0..6 {
            let mut quota = QuotaTracker::default();
            quota.reset_duplicates(max);
            let mut calls = 0;
            for _ in 0..10 {
                if quota.can_duplicate() {
                    quota.record_print();
                    calls += 1;
                    assert_eq!(quota.remaining_duplicates(), max - calls);
                }
            }
            assert_eq!(calls, max);
            assert_eq!(quota.printed(), max);
            assert_eq!(quota.remaining_duplicates(), 0);
        }
    }

    #[test]
    fn ungated_print_never_goes_below_zero() {
        let mut quota = QuotaTracker::new(0);
        quota.record_print();
        assert_eq!(quota.remaining_duplicates(), 0);
        assert_eq!(quota.printed(), 1);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = QuotaTracker::new(1);
        once.record_print();
        let mut twice = once.clone();

        once.reset_duplicates(4);
        twice.reset_duplicates(4);
        twice.reset_duplicates(4);
        assert_eq!(once, twice);
        assert_eq!(twice.remaining_duplicates(), 4);
        assert_eq!(twice.printed(), 1);
    }
}
