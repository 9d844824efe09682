//! Sustained traffic and the wall-clock loop.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use abs_common::actuator::DutyPercent;
use abs_common::can::frame::RawFrame;
use abs_common::config::AbsConfig;
use abs_common::consts::COMMAND_CAN_ID;
use abs_ecu::core::EcuCore;
use abs_ecu::drivers::simulation::{SimulatedActuator, SimulatedBus};

use super::harness::Rig;

#[test]
fn mixed_burst_is_fully_processed() {
    let mut rig = Rig::start();
    let foreign = RawFrame::standard(0x300, &[0xAA; 8]);
    for i in 0..10_000u32 {
        if i % 10 == 0 {
            let counter = ((i / 10) % 16) as u8;
            rig.command((i % 101) as u8, counter);
        } else {
            rig.deliver(foreign);
        }
    }
    rig.tick();

    let stats = rig.core.stats();
    assert_eq!(stats.frames_accepted, 1_000);
    assert_eq!(stats.frames_ignored, 9_000);
    assert_eq!(stats.counter_jumps, 0);
    assert!(rig.faults().is_empty());
    assert!(stats.max_actuation_latency < Duration::from_millis(5));
}

#[test]
fn wall_clock_loop_runs_and_stops() {
    let config = AbsConfig::default();
    let bus = SimulatedBus::with_producer(COMMAND_CAN_ID, config.timing.command_period());
    let bus_handle = bus.handle();
    let (actuator, out) = SimulatedActuator::new();
    let mut core = EcuCore::new(config, Box::new(bus), Box::new(actuator)).unwrap();
    let running = core.running_flag();

    core.start(Instant::now()).unwrap();
    let worker = thread::spawn(move || {
        core.run().unwrap();
        core.shutdown().unwrap();
        core.stats()
    });

    thread::sleep(Duration::from_millis(700));
    running.store(false, Ordering::SeqCst);
    let stats = worker.join().unwrap();

    assert!(stats.frames_accepted >= 5, "{stats:?}");
    assert!(stats.heartbeats_sent >= 3, "{stats:?}");
    assert!(stats.iterations > stats.frames_accepted);
    assert_eq!(stats.receive_errors, 0);
    assert_eq!(out.duty(), Some(DutyPercent::ZERO));
    assert!(!out.is_enabled());
    assert!(!bus_handle.is_open());
}
