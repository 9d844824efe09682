//! Simulated CAN bus.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use abs_common::can::frame::RawFrame;
use abs_common::can::transport::{BusEvent, BusState, CanTransport, Received, TransportError};
use abs_common::config::CanConfig;
use abs_common::consts::{COMMAND_CAN_ID, COMMAND_PERIOD_MS};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::producer::NominalProducer;

/// Sent frames retained for inspection.
const SENT_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct BusShared {
    inbox: VecDeque<Received>,
    sent: VecDeque<RawFrame>,
    state: BusState,
    fail_sends: bool,
    open: bool,
}

/// Test-side view of a [`SimulatedBus`].
#[derive(Debug, Clone)]
pub struct SimulatedBusHandle {
    shared: Arc<Mutex<BusShared>>,
}

impl SimulatedBusHandle {
    /// Queue a frame for the next `receive()`.
    pub fn inject_frame(&self, frame: RawFrame) {
        self.shared.lock().inbox.push_back(Received::Frame(frame));
    }

    /// Queue a bus-state notification; the polled state follows once it is received.
    pub fn inject_bus_event(&self, event: BusEvent) {
        self.shared.lock().inbox.push_back(Received::Bus(event));
    }

    /// Change the polled bus state without a notification.
    pub fn set_bus_state(&self, state: BusState) {
        self.shared.lock().state = state;
    }

    /// Make every `send()` fail until reset.
    pub fn fail_sends(&self, fail: bool) {
        self.shared.lock().fail_sends = fail;
    }

    /// Frames accepted by `send()`, oldest first.
    pub fn sent_frames(&self) -> Vec<RawFrame> {
        self.shared.lock().sent.iter().copied().collect()
    }

    /// Drain the sent-frame log.
    pub fn take_sent(&self) -> Vec<RawFrame> {
        self.shared.lock().sent.drain(..).collect()
    }

    /// Items still waiting in the inbox.
    pub fn pending(&self) -> usize {
        self.shared.lock().inbox.len()
    }

    /// Whether the transport is open.
    pub fn is_open(&self) -> bool {
        self.shared.lock().open
    }
}

/// In-process CAN transport.
///
/// Without a producer, `receive()` never blocks: it returns the next
/// injected item or `Received::Timeout` straight away, so tests can drive
/// the loop with synthetic time.
#[derive(Debug)]
pub struct SimulatedBus {
    shared: Arc<Mutex<BusShared>>,
    producer: Option<NominalProducer>,
}

impl SimulatedBus {
    /// Bus carrying nominal command traffic at the default identifier and period.
    pub fn new() -> Self {
        Self::with_producer(COMMAND_CAN_ID, Duration::from_millis(COMMAND_PERIOD_MS))
    }

    /// Bus carrying nominal command traffic on `command_id` every `period`.
    pub fn with_producer(command_id: u32, period: Duration) -> Self {
        Self {
            shared: Arc::default(),
            producer: Some(NominalProducer::new(command_id, period)),
        }
    }

    /// Silent bus driven only through the returned handle.
    pub fn scripted() -> (Self, SimulatedBusHandle) {
        let bus = Self {
            shared: Arc::default(),
            producer: None,
        };
        let handle = bus.handle();
        (bus, handle)
    }

    /// Handle sharing this bus's state.
    pub fn handle(&self) -> SimulatedBusHandle {
        SimulatedBusHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn take_injected(&self) -> Option<Received> {
        let mut shared = self.shared.lock();
        let item = shared.inbox.pop_front()?;
        if let Received::Bus(event) = item {
            shared.state = match event {
                BusEvent::BusOff => BusState::BusOff,
                BusEvent::Recovered => BusState::Active,
            };
        }
        Some(item)
    }
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CanTransport for SimulatedBus {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn open(&mut self, config: &CanConfig) -> Result<(), TransportError> {
        self.shared.lock().open = true;
        info!(
            "Simulated CAN bus '{}' open (producer: {})",
            config.interface,
            if self.producer.is_some() { "nominal" } else { "none" }
        );
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Received, TransportError> {
        if !self.shared.lock().open {
            return Err(TransportError::Closed);
        }
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.take_injected() {
                return Ok(item);
            }
            let now = Instant::now();
            let bus_off = self.shared.lock().state == BusState::BusOff;
            let Some(producer) = self.producer.as_mut() else {
                return Ok(Received::Timeout);
            };
            if !bus_off {
                if let Some(frame) = producer.poll(now) {
                    return Ok(Received::Frame(frame));
                }
            }
            if now >= deadline {
                return Ok(Received::Timeout);
            }
            let wake = producer.next_due().map_or(deadline, |due| due.min(deadline));
            std::thread::sleep(wake.saturating_duration_since(now));
        }
    }

    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError> {
        let mut shared = self.shared.lock();
        if !shared.open {
            return Err(TransportError::Closed);
        }
        if shared.fail_sends {
            return Err(TransportError::Io("injected send failure".to_string()));
        }
        if shared.state == BusState::BusOff {
            return Err(TransportError::Io("controller is bus-off".to_string()));
        }
        if shared.sent.len() == SENT_CAPACITY {
            shared.sent.pop_front();
        }
        shared.sent.push_back(*frame);
        debug!("sim tx {}", frame);
        Ok(())
    }

    fn bus_state(&self) -> BusState {
        self.shared.lock().state
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.shared.lock().open = false;
        info!("Simulated CAN bus closed");
        Ok(())
    }
}
