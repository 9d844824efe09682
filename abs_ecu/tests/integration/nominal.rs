//! Nominal traffic: duty follows the commanded level, no faults reported.

use abs_common::actuator::DutyPercent;
use abs_ecu::core::FrameOutcome;

use super::harness::Rig;

#[test]
fn duty_follows_level_sweep() {
    let mut rig = Rig::start();
    let mut t = 0;
    for level in [0, 10, 50, 90, 100] {
        rig.produce(level);
        t += 300;
        rig.advance_to(t);
        assert_eq!(rig.duty(), level, "at {t}ms");
    }

    // One write per distinct level, nothing redundant.
    let expected: Vec<DutyPercent> = [0, 10, 50, 90, 100]
        .into_iter()
        .map(DutyPercent::from_level)
        .collect();
    assert_eq!(rig.out.history(), expected);
}

#[test]
fn nominal_heartbeats_carry_no_faults() {
    let mut rig = Rig::start();
    rig.produce(25);
    rig.advance_to(1000);

    let hbs = rig.heartbeats();
    assert_eq!(hbs.len(), 6);
    assert!(hbs.iter().all(|hb| hb.fault_bits.is_empty()));

    let stats = rig.core.stats();
    assert_eq!(stats.frames_accepted, 11);
    assert_eq!(stats.checksum_failures, 0);
    assert_eq!(stats.counter_jumps, 0);
}

#[test]
fn valid_command_is_applied_immediately() {
    let mut rig = Rig::start();
    rig.tick();
    let outcome = rig.command(64, 0);
    assert!(matches!(
        outcome,
        FrameOutcome::Accepted {
            range_violation: false,
            discontinuity: None,
            ..
        }
    ));
    // No timer service in between.
    assert_eq!(rig.duty(), 64);
}
