//! Fault state manager.
//!
//! Owns the four fault entries and is the only place their state changes.
//! Level-triggered faults (TIMEOUT, BUSOFF) follow their condition and are
//! cleared explicitly. Hold faults (RANGE, CHKFAIL) carry a clear deadline
//! that every new occurrence pushes out to `now + hold`; the periodic sweep
//! clears them once that deadline has passed.

use std::time::{Duration, Instant};

use abs_common::fault::{FaultBits, FaultKind, FaultLatch};
use tracing::{debug, info, warn};

/// State of one fault kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultEntry {
    /// Whether the fault is currently asserted.
    pub asserted: bool,
    /// Hold faults only: instant after which the sweep clears the fault.
    pub clear_deadline: Option<Instant>,
    /// Number of times the fault has been asserted (including renewals).
    pub occurrences: u64,
}

/// Fault latching for all [`FaultKind`]s.
#[derive(Debug)]
pub struct FaultStateManager {
    entries: [FaultEntry; FaultKind::COUNT],
    hold: Duration,
}

impl FaultStateManager {
    /// Create a manager with every fault clear.
    pub fn new(hold: Duration) -> Self {
        Self {
            entries: [FaultEntry::default(); FaultKind::COUNT],
            hold,
        }
    }

    /// Assert `kind` at `now`.
    ///
    /// Hold faults get their clear deadline renewed to `now + hold` even
    /// when already asserted. Returns `true` on a clear-to-asserted edge.
    pub fn assert_fault(&mut self, kind: FaultKind, now: Instant) -> bool {
        let hold = self.hold;
        let entry = &mut self.entries[kind.index()];
        let newly = !entry.asserted;

        entry.asserted = true;
        entry.occurrences += 1;
        if kind.latch() == FaultLatch::Hold {
            entry.clear_deadline = Some(now + hold);
        }

        if newly {
            warn!(fault = kind.name(), "Fault asserted: {}", kind);
        } else {
            debug!(fault = kind.name(), "Fault renewed: {}", kind);
        }
        newly
    }

    /// Clear a level-triggered fault.
    ///
    /// Hold faults only clear through [`sweep`](Self::sweep); calling this
    /// for one of them is a no-op. Returns `true` on an asserted-to-clear edge.
    pub fn clear_fault(&mut self, kind: FaultKind) -> bool {
        if kind.latch() == FaultLatch::Hold {
            return false;
        }
        let entry = &mut self.entries[kind.index()];
        if !entry.asserted {
            return false;
        }
        entry.asserted = false;
        info!(fault = kind.name(), "Fault cleared: {}", kind);
        true
    }

    /// Clear every hold fault whose deadline lies strictly before `now`.
    ///
    /// Returns the bits cleared by this sweep.
    pub fn sweep(&mut self, now: Instant) -> FaultBits {
        let mut cleared = FaultBits::empty();
        for kind in FaultKind::ALL {
            if kind.latch() != FaultLatch::Hold {
                continue;
            }
            let entry = &mut self.entries[kind.index()];
            let expired = entry.asserted && entry.clear_deadline.is_some_and(|d| now > d);
            if expired {
                entry.asserted = false;
                entry.clear_deadline = None;
                cleared |= kind.bit();
                info!(fault = kind.name(), "Fault hold expired: {}", kind);
            }
        }
        cleared
    }

    /// Bitwise OR of all asserted faults.
    pub fn bitmask(&self) -> FaultBits {
        FaultKind::ALL
            .into_iter()
            .filter(|k| self.entries[k.index()].asserted)
            .fold(FaultBits::empty(), |acc, k| acc | k.bit())
    }

    /// Whether `kind` is asserted.
    pub fn is_asserted(&self, kind: FaultKind) -> bool {
        self.entries[kind.index()].asserted
    }

    /// Read-only view of the entry for `kind`.
    pub fn entry(&self, kind: FaultKind) -> &FaultEntry {
        &self.entries[kind.index()]
    }

    /// Configured hold window.
    pub fn hold(&self) -> Duration {
        self.hold
    }
}
