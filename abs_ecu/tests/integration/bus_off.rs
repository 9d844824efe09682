//! Bus-off: BUSOFF forces the safe state until the controller recovers.

use abs_common::can::transport::{BusEvent, BusState};
use abs_common::fault::FaultBits;

use super::harness::Rig;

#[test]
fn bus_off_event_forces_zero_until_recovery() {
    let mut rig = Rig::start();
    rig.produce(55);
    rig.advance_to(150);

    rig.bus_off();
    assert_eq!(rig.duty(), 0);
    assert_eq!(rig.faults(), FaultBits::BUSOFF);

    // Commands keep arriving but cannot lift the override.
    rig.advance_to(250);
    assert_eq!(rig.duty(), 0);
    assert_eq!(rig.faults(), FaultBits::BUSOFF);

    rig.bus_recovered();
    assert!(rig.faults().is_empty());
    assert_eq!(rig.duty(), 55);
}

#[test]
fn polled_bus_state_is_honoured() {
    let mut rig = Rig::start();
    rig.produce(55);
    rig.advance_to(100);

    rig.bus.set_bus_state(BusState::BusOff);
    rig.advance_to(110);
    assert!(rig.faults().contains(FaultBits::BUSOFF));
    assert_eq!(rig.duty(), 0);

    rig.bus.set_bus_state(BusState::Active);
    rig.advance_to(120);
    assert!(!rig.faults().contains(FaultBits::BUSOFF));
    assert_eq!(rig.duty(), 55);
}

#[test]
fn heartbeats_lost_while_bus_off_still_count() {
    let mut rig = Rig::start();
    rig.produce(10);
    rig.advance_to(0);

    rig.bus.set_bus_state(BusState::BusOff);
    rig.advance_to(400);
    let stats = rig.core.stats();
    assert_eq!(stats.heartbeat_failures, 2);
    assert_eq!(rig.core.alive_counter(), 3);

    rig.bus.set_bus_state(BusState::Active);
    rig.advance_to(600);
    let hb = rig.last_heartbeat();
    assert_eq!(hb.alive_counter, 4);
    assert!(hb.fault_bits.is_empty());
}

#[test]
fn injected_bus_event_reaches_core_through_poll() {
    let mut rig = Rig::start();
    rig.command(80, 0);
    rig.bus.inject_bus_event(BusEvent::BusOff);
    rig.core.poll_once().unwrap();
    assert!(rig.faults().contains(FaultBits::BUSOFF));
    assert_eq!(rig.duty(), 0);
}
