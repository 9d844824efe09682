//! Rolling counter discontinuities are reported but never fault.

use abs_common::fault::FaultBits;
use abs_ecu::core::FrameOutcome;

use super::harness::Rig;

fn jump_of(outcome: FrameOutcome) -> Option<u8> {
    match outcome {
        FrameOutcome::Accepted { discontinuity, .. } => discontinuity.map(|d| d.jump),
        other => panic!("expected accepted frame, got {other:?}"),
    }
}

#[test]
fn gap_is_reported_without_fault() {
    let mut rig = Rig::start();
    assert_eq!(jump_of(rig.command(20, 14)), None);
    assert_eq!(jump_of(rig.command(20, 15)), None);
    assert_eq!(jump_of(rig.command(20, 2)), Some(3));
    rig.tick();

    assert!(rig.faults().is_empty());
    assert_eq!(rig.duty(), 20);
    assert_eq!(rig.core.stats().counter_jumps, 1);
}

#[test]
fn wrap_and_repeat_are_continuous() {
    let mut rig = Rig::start();
    for counter in [13, 14, 15, 0, 0, 1, 2] {
        assert_eq!(jump_of(rig.command(20, counter)), None);
    }
    assert_eq!(rig.core.stats().counter_jumps, 0);
}

#[test]
fn frames_lost_across_timeout_are_reported() {
    let mut rig = Rig::start();
    rig.command(20, 3);
    rig.advance_to(600);
    assert!(rig.faults().contains(FaultBits::TIMEOUT));

    assert_eq!(jump_of(rig.command(20, 9)), Some(6));
    assert!(!rig.faults().contains(FaultBits::TIMEOUT));
    assert_eq!(jump_of(rig.command(20, 10)), None);
    assert_eq!(rig.core.stats().counter_jumps, 1);
}
