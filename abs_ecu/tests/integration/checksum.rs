//! Checksum failures: frame dropped, CHKFAIL held for 500 ms after the last one.

use abs_common::can::codec::FrameError;
use abs_common::fault::FaultBits;
use abs_ecu::core::FrameOutcome;

use super::harness::Rig;

#[test]
fn bad_checksum_is_dropped_and_flagged() {
    let mut rig = Rig::start();
    rig.produce(30);
    rig.advance_to(150);

    let outcome = rig.corrupted(80, 5);
    assert!(matches!(
        outcome,
        FrameOutcome::Rejected(FrameError::ChecksumInvalid { .. })
    ));
    assert_eq!(rig.duty(), 30);
    assert!(rig.faults().contains(FaultBits::CHKFAIL));

    rig.advance_to(200);
    assert_eq!(rig.last_heartbeat().fault_bits, FaultBits::CHKFAIL);
    assert_eq!(rig.core.stats().checksum_failures, 1);
}

#[test]
fn chkfail_clears_after_hold() {
    let mut rig = Rig::start();
    rig.produce(30);
    rig.advance_to(100);
    rig.corrupted(30, 9);

    rig.advance_to(600);
    assert!(rig.faults().contains(FaultBits::CHKFAIL));
    rig.advance_to(610);
    assert!(!rig.faults().contains(FaultBits::CHKFAIL));

    rig.advance_to(800);
    assert!(rig.last_heartbeat().fault_bits.is_empty());
}

#[test]
fn repeated_failures_renew_hold() {
    let mut rig = Rig::start();
    rig.produce(30);
    rig.advance_to(100);
    rig.corrupted(30, 9);
    rig.advance_to(400);
    rig.corrupted(30, 9);

    rig.advance_to(700);
    assert!(rig.faults().contains(FaultBits::CHKFAIL));
    rig.advance_to(900);
    assert!(rig.faults().contains(FaultBits::CHKFAIL));
    rig.advance_to(910);
    assert!(!rig.faults().contains(FaultBits::CHKFAIL));
}

#[test]
fn corrupted_frames_do_not_keep_command_alive() {
    let mut rig = Rig::start();
    rig.produce(30);
    rig.advance_to(0);
    rig.silence();

    for t in [100, 200, 300, 400, 500] {
        rig.advance_to(t);
        rig.corrupted(30, 1);
    }
    rig.advance_to(510);

    assert!(rig.faults().contains(FaultBits::TIMEOUT | FaultBits::CHKFAIL));
    assert_eq!(rig.duty(), 0);
}

#[test]
fn chkfail_alone_keeps_output() {
    let mut rig = Rig::start();
    rig.produce(45);
    rig.advance_to(0);
    rig.corrupted(45, 1);
    rig.advance_to(300);
    assert_eq!(rig.faults(), FaultBits::CHKFAIL);
    assert_eq!(rig.duty(), 45);
}
