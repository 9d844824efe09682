//! ECU core: the single-threaded brake-actuation loop.
//!
//! `EcuCore` owns the transport, the actuator controller and all fault
//! state. One iteration of [`EcuCore::poll_once`]:
//!
//! 1. bounded `receive()` (at most `max_wait`, less if a heartbeat or
//!    sweep is due sooner)
//! 2. a command frame is validated and, if valid, commanded to the actuator
//!    immediately; bus events update BUSOFF
//! 3. timers: fault sweep, command timeout, polled bus state, heartbeat,
//!    then the safe-state refresh so a slow actuator write never delays the
//!    heartbeat
//!
//! Every entry point below `poll_once` takes an explicit `now`, so the
//! timing behavior can be exercised with synthetic instants.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use abs_common::actuator::{Actuator, DutyPercent};
use abs_common::can::codec::{CommandFrame, FrameError};
use abs_common::can::frame::RawFrame;
use abs_common::can::transport::{BusEvent, CanTransport, Received, TransportError};
use abs_common::config::AbsConfig;
use abs_common::fault::{FaultBits, FaultKind};
use tracing::{debug, info, warn};

use crate::bus_state::{BusStateMonitor, BusTransition};
use crate::counter::{CounterMonitor, Discontinuity};
use crate::error::EcuError;
use crate::fault::FaultStateManager;
use crate::heartbeat::HeartbeatPublisher;
use crate::output::ActuatorController;
use crate::timeout::{TimeoutStatus, TimeoutWatcher};

/// What happened to one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Valid command, handed to the actuator controller.
    Accepted {
        /// Duty computed for the frame after clamping and safe-state
        /// override. A failed actuator write is retried on the next refresh,
        /// so this can differ from what the actuator currently holds.
        duty: DutyPercent,
        /// Level was above 100 (RANGE asserted).
        range_violation: bool,
        /// Rolling counter gap, if any.
        discontinuity: Option<Discontinuity>,
    },
    /// Command identifier but not a usable command.
    Rejected(FrameError),
    /// Another identifier; not for us.
    Ignored,
}

/// Loop counters, merged with the controller and publisher counters on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed `poll_once` iterations.
    pub iterations: u64,
    /// Longest single iteration.
    pub max_iteration: Duration,
    /// Valid commands applied.
    pub frames_accepted: u64,
    /// Frames on other identifiers.
    pub frames_ignored: u64,
    /// Command-id frames with bad length or format.
    pub malformed: u64,
    /// Checksum mismatches.
    pub checksum_failures: u64,
    /// Levels above 100.
    pub range_violations: u64,
    /// Rolling counter gaps.
    pub counter_jumps: u64,
    /// Non-fatal receive errors.
    pub receive_errors: u64,
    /// Heartbeats accepted by the transport.
    pub heartbeats_sent: u64,
    /// Heartbeats the transport rejected.
    pub heartbeat_failures: u64,
    /// Successful actuator writes.
    pub actuator_writes: u64,
    /// Rejected actuator writes.
    pub actuator_write_failures: u64,
    /// Worst validate-to-commit latency.
    pub max_actuation_latency: Duration,
    /// Commits slower than the actuation deadline.
    pub latency_overruns: u64,
}

/// The ECU control loop.
pub struct EcuCore {
    config: AbsConfig,
    transport: Box<dyn CanTransport>,
    output: ActuatorController,
    faults: FaultStateManager,
    counter: CounterMonitor,
    timeout: TimeoutWatcher,
    bus: BusStateMonitor,
    heartbeat: HeartbeatPublisher,
    running: Arc<AtomicBool>,
    started_at: Option<Instant>,
    next_sweep: Option<Instant>,
    stats: LoopStats,
}

impl EcuCore {
    /// Create a core from a validated configuration and its two collaborators.
    ///
    /// # Errors
    /// Returns `EcuError::Config` if the configuration is invalid.
    pub fn new(
        config: AbsConfig,
        transport: Box<dyn CanTransport>,
        actuator: Box<dyn Actuator>,
    ) -> Result<Self, EcuError> {
        config.validate()?;
        let timing = &config.timing;
        Ok(Self {
            output: ActuatorController::new(actuator, timing.actuation_deadline()),
            faults: FaultStateManager::new(timing.fault_hold()),
            counter: CounterMonitor::new(),
            timeout: TimeoutWatcher::new(timing.command_timeout()),
            bus: BusStateMonitor::new(),
            heartbeat: HeartbeatPublisher::new(config.can.heartbeat_id, timing.heartbeat_period()),
            running: Arc::new(AtomicBool::new(false)),
            started_at: None,
            next_sweep: None,
            stats: LoopStats::default(),
            transport,
            config,
        })
    }

    /// Enable the actuator at 0 %, open the transport and arm the timers.
    ///
    /// The first heartbeat is due at `now`.
    ///
    /// # Errors
    /// Returns `EcuError::Actuator` or `EcuError::Transport`; the actuator
    /// is released again if the transport fails to open.
    pub fn start(&mut self, now: Instant) -> Result<(), EcuError> {
        self.output.enable(&self.config.pwm)?;
        if let Err(e) = self.transport.open(&self.config.can) {
            if let Err(release) = self.output.shutdown() {
                warn!("Actuator release after failed open: {}", release);
            }
            return Err(e.into());
        }

        self.started_at = Some(now);
        self.heartbeat.start(now);
        self.next_sweep = Some(now);
        self.running.store(true, Ordering::SeqCst);
        info!(
            "ECU started (transport={}, actuator at 0%), waiting for commands",
            self.transport.name()
        );
        Ok(())
    }

    /// Process one received frame at `now`.
    pub fn handle_frame(&mut self, frame: &RawFrame, now: Instant) -> FrameOutcome {
        let command_id = self.config.can.command_id;
        if frame.id != command_id || frame.extended {
            self.stats.frames_ignored += 1;
            return FrameOutcome::Ignored;
        }

        let command = match CommandFrame::decode(frame, command_id) {
            Ok(command) => command,
            Err(e @ FrameError::ChecksumInvalid { .. }) => {
                self.stats.checksum_failures += 1;
                debug!("Dropped {}: {}", frame, e);
                self.faults.assert_fault(FaultKind::ChkFail, now);
                return FrameOutcome::Rejected(e);
            }
            Err(e) => {
                self.stats.malformed += 1;
                debug!("Dropped {}: {}", frame, e);
                return FrameOutcome::Rejected(e);
            }
        };
        let validated_at = Instant::now();

        let discontinuity = self.counter.observe(command.counter, now);
        if discontinuity.is_some() {
            self.stats.counter_jumps += 1;
        }

        self.timeout.on_valid_frame(now);
        if self.faults.clear_fault(FaultKind::Timeout) {
            info!("Valid command received, leaving safe state");
        }

        let range_violation = !command.in_range();
        if range_violation {
            self.stats.range_violations += 1;
            self.faults.assert_fault(FaultKind::Range, now);
        }

        let duty = self
            .output
            .command(command.level, self.faults.bitmask(), validated_at);
        self.stats.frames_accepted += 1;
        debug!(
            level = command.level,
            counter = command.counter,
            "Command applied: duty {}",
            duty
        );

        FrameOutcome::Accepted {
            duty,
            range_violation,
            discontinuity,
        }
    }

    /// Apply a bus-state notification at `now`.
    pub fn handle_bus_event(&mut self, event: BusEvent, now: Instant) {
        if let Some(transition) = self.bus.on_event(event, now) {
            self.apply_bus_transition(transition, now);
            self.output.refresh(self.faults.bitmask());
        }
    }

    fn apply_bus_transition(&mut self, transition: BusTransition, now: Instant) {
        match transition {
            BusTransition::WentBusOff => {
                self.faults.assert_fault(FaultKind::BusOff, now);
            }
            BusTransition::Recovered => {
                self.faults.clear_fault(FaultKind::BusOff);
            }
        }
    }

    /// Run the periodic duties that are due at `now`.
    ///
    /// Safe to call more often than needed; each duty keeps its own schedule.
    pub fn service_timers(&mut self, now: Instant) {
        if self.next_sweep.is_some_and(|due| now >= due) {
            self.faults.sweep(now);
            self.next_sweep = Some(now + self.config.timing.sweep_period());
        }

        if self.timeout.tick(now) == TimeoutStatus::Expired
            && self.faults.assert_fault(FaultKind::Timeout, now)
        {
            match self.timeout.silence(now) {
                Some(silent) => warn!(
                    "No valid command for {}ms, forcing safe state",
                    silent.as_millis()
                ),
                None => info!("No command received yet, holding safe state"),
            }
            self.output.discard_request();
        }

        let polled = self.transport.bus_state();
        if let Some(transition) = self.bus.poll(polled, now) {
            self.apply_bus_transition(transition, now);
        }

        let faults = self.faults.bitmask();
        self.heartbeat.tick(now, faults, self.transport.as_mut());
        self.output.refresh(faults);
    }

    /// How long the next receive may block at `now`.
    pub fn next_wait(&self, now: Instant) -> Duration {
        [self.heartbeat.next_due(), self.next_sweep]
            .into_iter()
            .flatten()
            .map(|due| due.saturating_duration_since(now))
            .fold(self.config.timing.max_wait(), Duration::min)
    }

    /// One loop iteration against the wall clock.
    ///
    /// # Errors
    /// `EcuError::NotStarted` before `start()`, `EcuError::Transport` if the
    /// transport reports itself closed. Other receive errors are counted.
    pub fn poll_once(&mut self) -> Result<(), EcuError> {
        if self.started_at.is_none() {
            return Err(EcuError::NotStarted);
        }
        let iteration_start = Instant::now();
        let wait = self.next_wait(iteration_start);

        match self.transport.receive(wait) {
            Ok(Received::Frame(frame)) => {
                self.handle_frame(&frame, Instant::now());
            }
            Ok(Received::Bus(event)) => self.handle_bus_event(event, Instant::now()),
            Ok(Received::Timeout) => {}
            Err(TransportError::Closed) => return Err(TransportError::Closed.into()),
            Err(e) => {
                self.stats.receive_errors += 1;
                if self.stats.receive_errors <= 10 || self.stats.receive_errors % 1000 == 0 {
                    warn!("Receive error #{}: {}", self.stats.receive_errors, e);
                }
                std::thread::sleep(wait);
            }
        }

        self.service_timers(Instant::now());

        self.stats.iterations += 1;
        let took = iteration_start.elapsed();
        if took > self.stats.max_iteration {
            self.stats.max_iteration = took;
        }
        Ok(())
    }

    /// Run until the running flag is cleared.
    ///
    /// # Errors
    /// Propagates `poll_once` errors.
    pub fn run(&mut self) -> Result<(), EcuError> {
        if self.started_at.is_none() {
            return Err(EcuError::NotStarted);
        }
        info!(
            "Starting control loop (max_wait={}ms)...",
            self.config.timing.max_wait_ms
        );
        if detect_rt_mode() {
            info!("Running in real-time mode");
        } else {
            info!("Running in standard (non-RT) mode");
        }

        while self.running.load(Ordering::SeqCst) {
            self.poll_once()?;

            if self.stats.iterations % 10_000 == 0 {
                let s = self.stats();
                debug!(
                    "Loop: {} iterations, {} commands, faults=0x{:02X}, max_iter={}us, max_latency={}us",
                    s.iterations,
                    s.frames_accepted,
                    self.fault_bits().bits(),
                    s.max_iteration.as_micros(),
                    s.max_actuation_latency.as_micros()
                );
            }
        }

        info!(
            "Control loop stopped after {} iterations",
            self.stats.iterations
        );
        Ok(())
    }

    /// Drive 0 %, release the actuator and close the transport.
    ///
    /// # Errors
    /// Returns the first failure; both collaborators are always attempted.
    pub fn shutdown(&mut self) -> Result<(), EcuError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        let output = self.output.shutdown();
        let transport = if self.started_at.take().is_some() {
            self.transport.close()
        } else {
            Ok(())
        };

        let s = self.stats();
        info!(
            "Final stats: commands={} chkfail={} range={} counter_jumps={} heartbeats={} (failed {}) actuator_writes={} (failed {}) latency_overruns={}",
            s.frames_accepted,
            s.checksum_failures,
            s.range_violations,
            s.counter_jumps,
            s.heartbeats_sent,
            s.heartbeat_failures,
            s.actuator_writes,
            s.actuator_write_failures,
            s.latency_overruns
        );

        output?;
        transport?;
        Ok(())
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Current heartbeat fault bitmask.
    pub fn fault_bits(&self) -> FaultBits {
        self.faults.bitmask()
    }

    /// Fault state manager.
    pub fn faults(&self) -> &FaultStateManager {
        &self.faults
    }

    /// Duty last acknowledged by the actuator.
    pub fn duty(&self) -> Option<DutyPercent> {
        self.output.committed()
    }

    /// Alive counter of the last heartbeat.
    pub fn alive_counter(&self) -> u8 {
        self.heartbeat.alive_counter()
    }

    /// Next heartbeat deadline.
    pub fn next_heartbeat(&self) -> Option<Instant> {
        self.heartbeat.next_due()
    }

    /// Configuration in use.
    pub fn config(&self) -> &AbsConfig {
        &self.config
    }

    /// Snapshot of all counters.
    pub fn stats(&self) -> LoopStats {
        let out = self.output.stats();
        LoopStats {
            heartbeats_sent: self.heartbeat.sent(),
            heartbeat_failures: self.heartbeat.send_failures(),
            actuator_writes: out.writes,
            actuator_write_failures: out.write_failures,
            max_actuation_latency: out.max_latency,
            latency_overruns: out.latency_overruns,
            ..self.stats
        }
    }
}

impl Drop for EcuCore {
    fn drop(&mut self) {
        if self.output.is_enabled() {
            warn!("EcuCore dropped without shutdown, forcing actuator to 0%");
            if let Err(e) = self.output.shutdown() {
                warn!("Actuator release failed: {}", e);
            }
        }
    }
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: sched_getscheduler(0) only queries the calling thread's policy.
        let policy = unsafe { sched_getscheduler(0) };
        policy == SCHED_FIFO || policy == SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
