//! Out-of-range levels: clamped to 100 %, RANGE held for 500 ms.

use abs_common::fault::FaultBits;
use abs_ecu::core::FrameOutcome;

use super::harness::Rig;

#[test]
fn boundary_between_100_and_101() {
    let mut rig = Rig::start();
    assert!(matches!(
        rig.command(100, 0),
        FrameOutcome::Accepted {
            range_violation: false,
            ..
        }
    ));
    assert!(rig.faults().is_empty());

    assert!(matches!(
        rig.command(101, 1),
        FrameOutcome::Accepted {
            range_violation: true,
            ..
        }
    ));
    assert_eq!(rig.duty(), 100);
    assert!(rig.faults().contains(FaultBits::RANGE));
}

#[test]
fn over_range_clamps_and_reports() {
    let mut rig = Rig::start();
    rig.produce(150);
    rig.advance_to(0);

    assert_eq!(rig.duty(), 100);
    assert_eq!(rig.faults(), FaultBits::RANGE);
    assert_eq!(rig.last_heartbeat().fault_bits, FaultBits::RANGE);
}

#[test]
fn range_holds_then_clears() {
    let mut rig = Rig::start();
    rig.produce(150);
    rig.advance_to(0);
    rig.produce(60);

    rig.advance_to(100);
    assert_eq!(rig.duty(), 60);
    assert!(rig.faults().contains(FaultBits::RANGE));

    rig.advance_to(500);
    assert!(rig.faults().contains(FaultBits::RANGE));
    rig.advance_to(510);
    assert!(rig.faults().is_empty());

    rig.advance_to(600);
    assert!(rig.last_heartbeat().fault_bits.is_empty());
}

#[test]
fn continuous_violation_keeps_range_set() {
    let mut rig = Rig::start();
    rig.produce(200);
    rig.advance_to(1000);
    assert!(
        rig.heartbeats()
            .iter()
            .all(|hb| hb.fault_bits == FaultBits::RANGE)
    );

    rig.produce(50);
    rig.advance_to(1500);
    assert!(rig.faults().contains(FaultBits::RANGE));
    rig.advance_to(1510);
    assert!(rig.faults().is_empty());
    assert_eq!(rig.duty(), 50);
}
