//! Heartbeat: 200 ms period, alive counter, fault bits.

use abs_common::consts::HEARTBEAT_CAN_ID;
use abs_common::fault::FaultBits;

use super::harness::Rig;

#[test]
fn period_and_alive_counter() {
    let mut rig = Rig::start();
    rig.produce(10);
    rig.advance_to(2000);

    let alive: Vec<u8> = rig.heartbeats().iter().map(|hb| hb.alive_counter).collect();
    assert_eq!(alive, (1..=11).collect::<Vec<u8>>());
}

#[test]
fn heartbeat_wire_layout() {
    let mut rig = Rig::start();
    rig.tick();
    let sent = rig.bus.sent_frames();
    let frame = sent.iter().find(|f| f.id == HEARTBEAT_CAN_ID).unwrap();
    assert!(!frame.extended);
    assert_eq!(frame.len, 8);
    assert_eq!(frame.data, [1, 0x01, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn combined_fault_bits() {
    let mut rig = Rig::start();
    rig.produce(150);
    rig.advance_to(50);
    rig.corrupted(10, 0);
    rig.bus_off();

    assert_eq!(
        rig.faults(),
        FaultBits::RANGE | FaultBits::CHKFAIL | FaultBits::BUSOFF
    );
    assert_eq!(rig.duty(), 0);

    rig.bus_recovered();
    rig.advance_to(200);
    assert_eq!(rig.last_heartbeat().fault_bits.bits(), 0x06);
}

#[test]
fn alive_counter_wraps() {
    let mut rig = Rig::start();
    rig.advance_to(255 * 200);
    let hbs = rig.heartbeats();
    assert_eq!(hbs.len(), 256);
    assert_eq!(hbs[254].alive_counter, 255);
    assert_eq!(hbs[255].alive_counter, 0);
}

#[test]
fn no_drift_over_many_periods() {
    let mut rig = Rig::start();
    rig.advance_to(10_000);
    assert_eq!(rig.heartbeats().len(), 51);
    assert_eq!(rig.core.next_heartbeat(), Some(rig.at(10_200)));
}

#[test]
fn late_heartbeat_after_stall_is_not_followed_by_a_burst() {
    let mut rig = Rig::start();
    rig.advance_to(200);
    assert_eq!(rig.heartbeats().len(), 2);

    // Due at 400, serviced 70 ms late.
    rig.stall_to(470);
    assert_eq!(rig.heartbeats().len(), 3);
    assert_eq!(rig.core.next_heartbeat(), Some(rig.at(670)));

    rig.advance_to(660);
    assert_eq!(rig.heartbeats().len(), 3);
    rig.advance_to(670);
    assert_eq!(rig.heartbeats().len(), 4);
}
