//! Synthetic-time rig around `EcuCore`.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use abs_common::consts::{COMMAND_CAN_ID, COUNTER_MASK, HEARTBEAT_CAN_ID};
use abs_common::prelude::*;
use abs_ecu::core::{EcuCore, FrameOutcome};
use abs_ecu::drivers::simulation::{
    SimulatedActuator, SimulatedActuatorHandle, SimulatedBus, SimulatedBusHandle,
};

/// Loop service granularity used by the rig.
pub const STEP_MS: u64 = 10;
/// Producer period used by the rig.
pub const COMMAND_PERIOD_MS: u64 = 100;

pub struct Rig {
    pub core: EcuCore,
    pub bus: SimulatedBusHandle,
    pub out: SimulatedActuatorHandle,
    t0: Instant,
    now_ms: u64,
    level: Option<u8>,
    counter: u8,
    next_command_ms: u64,
}

impl Rig {
    /// Started core at t=0 with default timing, producer silent.
    pub fn start() -> Self {
        Self::start_with(AbsConfig::default())
    }

    pub fn start_with(config: AbsConfig) -> Self {
        let (bus_driver, bus) = SimulatedBus::scripted();
        let (actuator, out) = SimulatedActuator::new();
        let mut core = EcuCore::new(config, Box::new(bus_driver), Box::new(actuator)).unwrap();
        let t0 = Instant::now();
        core.start(t0).unwrap();
        Self {
            core,
            bus,
            out,
            t0,
            now_ms: 0,
            level: None,
            counter: 0,
            next_command_ms: 0,
        }
    }

    pub fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run timers once at the current instant.
    pub fn tick(&mut self) {
        let now = self.at(self.now_ms);
        self.core.service_timers(now);
    }

    /// Start (or retarget) the periodic producer; the first frame goes out now.
    pub fn produce(&mut self, level: u8) {
        if self.level.is_none() {
            self.next_command_ms = self.now_ms;
        }
        self.level = Some(level);
    }

    /// Stop the periodic producer.
    pub fn silence(&mut self) {
        self.level = None;
    }

    /// Advance to `to_ms` in loop-sized steps, emitting producer frames on
    /// their period and servicing timers after each step.
    pub fn advance_to(&mut self, to_ms: u64) {
        while self.now_ms < to_ms {
            self.emit_due_command();
            self.tick();
            self.now_ms = (self.now_ms + STEP_MS).min(to_ms);
        }
        self.emit_due_command();
        self.tick();
    }

    /// Jump to `to_ms` without servicing anything in between, as a stalled
    /// loop would, then tick once.
    pub fn stall_to(&mut self, to_ms: u64) {
        self.now_ms = to_ms;
        self.emit_due_command();
        self.tick();
    }

    fn emit_due_command(&mut self) {
        if let Some(level) = self.level {
            if self.now_ms >= self.next_command_ms {
                let frame = CommandFrame::new(level, self.counter).encode(COMMAND_CAN_ID);
                self.counter = (self.counter + 1) & COUNTER_MASK;
                self.next_command_ms += COMMAND_PERIOD_MS;
                self.core.handle_frame(&frame, self.at(self.now_ms));
            }
        }
    }

    /// Deliver one frame at the current instant.
    pub fn deliver(&mut self, frame: RawFrame) -> FrameOutcome {
        let now = self.at(self.now_ms);
        self.core.handle_frame(&frame, now)
    }

    /// Deliver a valid command with an explicit counter at the current instant.
    pub fn command(&mut self, level: u8, counter: u8) -> FrameOutcome {
        self.deliver(CommandFrame::new(level, counter).encode(COMMAND_CAN_ID))
    }

    /// Deliver a command whose checksum byte is off by one.
    pub fn corrupted(&mut self, level: u8, counter: u8) -> FrameOutcome {
        let mut cmd = CommandFrame::new(level, counter);
        cmd.checksum = cmd.checksum.wrapping_add(1);
        self.deliver(cmd.encode(COMMAND_CAN_ID))
    }

    /// Controller goes bus-off now (event and polled state agree).
    pub fn bus_off(&mut self) {
        self.bus.set_bus_state(BusState::BusOff);
        let now = self.at(self.now_ms);
        self.core.handle_bus_event(BusEvent::BusOff, now);
    }

    /// Controller recovers now.
    pub fn bus_recovered(&mut self) {
        self.bus.set_bus_state(BusState::Active);
        let now = self.at(self.now_ms);
        self.core.handle_bus_event(BusEvent::Recovered, now);
    }

    /// Duty currently driven by the simulated actuator.
    pub fn duty(&self) -> u8 {
        self.out.duty().unwrap_or(DutyPercent::ZERO).get()
    }

    pub fn faults(&self) -> FaultBits {
        self.core.fault_bits()
    }

    /// Heartbeats transmitted so far, oldest first.
    pub fn heartbeats(&self) -> Vec<HeartbeatFrame> {
        self.bus
            .sent_frames()
            .iter()
            .filter(|f| f.id == HEARTBEAT_CAN_ID)
            .map(|f| HeartbeatFrame::decode(f, HEARTBEAT_CAN_ID).unwrap())
            .collect()
    }

    pub fn last_heartbeat(&self) -> HeartbeatFrame {
        *self.heartbeats().last().expect("no heartbeat sent")
    }
}
