//! Bus-off tracking.
//!
//! The transport reports bus state two ways: pushed [`BusEvent`]s from
//! `receive()` and the polled `bus_state()`. Both feed the same monitor,
//! which reports only real transitions.

use std::time::Instant;

use abs_common::can::transport::{BusEvent, BusState};
use tracing::{info, warn};

/// A change of controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusTransition {
    /// Active to bus-off.
    WentBusOff,
    /// Bus-off to active.
    Recovered,
}

/// Last known controller state.
#[derive(Debug, Default)]
pub struct BusStateMonitor {
    state: BusState,
    since: Option<Instant>,
    bus_off_count: u64,
}

impl BusStateMonitor {
    /// Create a monitor assuming an active bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a pushed bus event.
    pub fn on_event(&mut self, event: BusEvent, now: Instant) -> Option<BusTransition> {
        let state = match event {
            BusEvent::BusOff => BusState::BusOff,
            BusEvent::Recovered => BusState::Active,
        };
        self.transition_to(state, now)
    }

    /// Apply a polled bus state.
    pub fn poll(&mut self, state: BusState, now: Instant) -> Option<BusTransition> {
        self.transition_to(state, now)
    }

    fn transition_to(&mut self, state: BusState, now: Instant) -> Option<BusTransition> {
        if state == self.state {
            return None;
        }
        self.state = state;
        self.since = Some(now);
        match state {
            BusState::BusOff => {
                self.bus_off_count += 1;
                warn!("CAN controller entered bus-off (#{})", self.bus_off_count);
                Some(BusTransition::WentBusOff)
            }
            BusState::Active => {
                info!("CAN controller recovered from bus-off");
                Some(BusTransition::Recovered)
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Instant of the last transition.
    pub fn since(&self) -> Option<Instant> {
        self.since
    }

    /// Number of bus-off entries seen.
    pub fn bus_off_count(&self) -> u64 {
        self.bus_off_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_transitions() {
        let mut m = BusStateMonitor::new();
        let now = Instant::now();
        assert_eq!(
            m.on_event(BusEvent::BusOff, now),
            Some(BusTransition::WentBusOff)
        );
        assert_eq!(m.on_event(BusEvent::BusOff, now), None);
        assert_eq!(
            m.on_event(BusEvent::Recovered, now),
            Some(BusTransition::Recovered)
        );
        assert_eq!(m.state(), BusState::Active);
        assert_eq!(m.bus_off_count(), 1);
    }

    #[test]
    fn poll_and_event_share_state() {
        let mut m = BusStateMonitor::new();
        let now = Instant::now();
        assert_eq!(m.poll(BusState::Active, now), None);
        assert_eq!(
            m.poll(BusState::BusOff, now),
            Some(BusTransition::WentBusOff)
        );
        assert_eq!(m.on_event(BusEvent::BusOff, now), None);
        assert_eq!(m.since(), Some(now));
    }

    #[test]
    fn recovered_while_active_is_ignored() {
        let mut m = BusStateMonitor::new();
        assert_eq!(m.on_event(BusEvent::Recovered, Instant::now()), None);
    }
}
