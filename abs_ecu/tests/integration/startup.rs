//! Startup: the actuator is at 0 % and TIMEOUT is reported until the first
//! valid command arrives.

use abs_common::actuator::DutyPercent;
use abs_common::fault::FaultBits;

use super::harness::Rig;

#[test]
fn actuator_enabled_at_zero_before_loop() {
    let rig = Rig::start();
    assert!(rig.out.is_enabled());
    assert_eq!(rig.out.frequency_hz(), 500);
    assert_eq!(rig.out.history(), vec![DutyPercent::ZERO]);
}

#[test]
fn first_heartbeat_is_immediate_and_reports_timeout() {
    let mut rig = Rig::start();
    rig.tick();

    assert_eq!(rig.faults(), FaultBits::TIMEOUT);
    let hb = rig.last_heartbeat();
    assert_eq!(hb.alive_counter, 1);
    assert_eq!(hb.fault_bits, FaultBits::TIMEOUT);
    assert_eq!(rig.duty(), 0);
}

#[test]
fn stays_safe_while_no_producer() {
    let mut rig = Rig::start();
    rig.advance_to(450);
    assert_eq!(rig.duty(), 0);
    let hbs = rig.heartbeats();
    assert_eq!(hbs.len(), 3);
    assert!(hbs.iter().all(|hb| hb.fault_bits == FaultBits::TIMEOUT));
}

#[test]
fn first_command_leaves_safe_state() {
    let mut rig = Rig::start();
    rig.advance_to(50);
    rig.produce(40);
    rig.advance_to(60);

    assert_eq!(rig.duty(), 40);
    assert!(rig.faults().is_empty());

    rig.advance_to(200);
    let hb = rig.last_heartbeat();
    assert_eq!(hb.alive_counter, 2);
    assert!(hb.fault_bits.is_empty());
}
