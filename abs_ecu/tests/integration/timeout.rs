//! Command timeout: silence longer than 500 ms forces the safe state.

use abs_common::fault::FaultBits;

use super::harness::Rig;

#[test]
fn silence_forces_safe_state() {
    let mut rig = Rig::start();
    rig.produce(70);
    rig.advance_to(300);
    rig.silence();

    rig.advance_to(800);
    assert_eq!(rig.duty(), 70);
    assert!(!rig.faults().contains(FaultBits::TIMEOUT));

    rig.advance_to(810);
    assert_eq!(rig.duty(), 0);
    assert!(rig.faults().contains(FaultBits::TIMEOUT));

    rig.advance_to(1000);
    assert!(rig.last_heartbeat().fault_bits.contains(FaultBits::TIMEOUT));
}

#[test]
fn next_valid_command_recovers_with_its_own_level() {
    let mut rig = Rig::start();
    rig.produce(70);
    rig.advance_to(100);
    rig.silence();
    rig.advance_to(700);
    assert!(rig.faults().contains(FaultBits::TIMEOUT));

    rig.command(20, 2);
    assert!(!rig.faults().contains(FaultBits::TIMEOUT));
    assert_eq!(rig.duty(), 20);
}

#[test]
fn stale_level_is_not_revived() {
    let mut rig = Rig::start();
    rig.produce(70);
    rig.advance_to(100);
    rig.silence();
    rig.advance_to(700);

    rig.bus_off();
    rig.bus_recovered();
    rig.advance_to(800);

    assert_eq!(rig.faults(), FaultBits::TIMEOUT);
    assert_eq!(rig.duty(), 0);
}

#[test]
fn frames_just_inside_timeout_keep_output() {
    let mut rig = Rig::start();
    let mut t = 0;
    for counter in 0..6 {
        rig.advance_to(t);
        rig.command(35, counter);
        t += 490;
    }
    rig.advance_to(t);
    assert_eq!(rig.duty(), 35);
    assert!(!rig.faults().contains(FaultBits::TIMEOUT));
}
