//! SocketCAN transport driver (Linux, `socketcan` feature).
//!
//! Opens a raw CAN socket with a bounded read timeout and all error
//! classes enabled. Controller error frames are mapped to bus events:
//! bus-off enters [`BusState::BusOff`], a restart notification or any
//! later data frame means the controller is back.

use std::io;
use std::time::Duration;

use abs_common::can::frame::RawFrame;
use abs_common::can::transport::{BusEvent, BusState, CanTransport, Received, TransportError};
use abs_common::config::{AbsConfig, CanConfig};
use socketcan::{
    CanError, CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Id, Socket, SocketOptions,
    StandardId,
};
use tracing::{debug, info, warn};

/// Factory: SocketCAN transport.
pub fn create_transport(_config: &AbsConfig) -> Box<dyn CanTransport> {
    Box::new(SocketCanTransport::new())
}

/// Raw SocketCAN socket bound to one interface.
#[derive(Default)]
pub struct SocketCanTransport {
    socket: Option<CanSocket>,
    interface: String,
    state: BusState,
    read_timeout: Option<Duration>,
    pending: Option<RawFrame>,
}

impl SocketCanTransport {
    /// Create a closed transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn socket(&self) -> Result<&CanSocket, TransportError> {
        self.socket.as_ref().ok_or(TransportError::Closed)
    }

    fn mark_active(&mut self) -> Option<BusEvent> {
        if self.state == BusState::BusOff {
            self.state = BusState::Active;
            Some(BusEvent::Recovered)
        } else {
            None
        }
    }
}

fn to_raw(frame: &impl EmbeddedFrame) -> RawFrame {
    let data = frame.data();
    match frame.id() {
        Id::Standard(id) => RawFrame::standard(u32::from(id.as_raw()), data),
        Id::Extended(id) => RawFrame::extended(id.as_raw(), data),
    }
}

fn to_socketcan(frame: &RawFrame) -> Result<CanFrame, TransportError> {
    let id: Id = if frame.extended {
        ExtendedId::new(frame.id)
            .ok_or_else(|| TransportError::Io(format!("invalid extended id 0x{:X}", frame.id)))?
            .into()
    } else {
        u16::try_from(frame.id)
            .ok()
            .and_then(StandardId::new)
            .ok_or_else(|| TransportError::Io(format!("invalid standard id 0x{:X}", frame.id)))?
            .into()
    };
    CanFrame::new(id, frame.payload())
        .ok_or_else(|| TransportError::Io(format!("cannot build frame {}", frame)))
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

impl CanTransport for SocketCanTransport {
    fn name(&self) -> &'static str {
        "socketcan"
    }

    fn open(&mut self, config: &CanConfig) -> Result<(), TransportError> {
        let socket = CanSocket::open(&config.interface).map_err(|e| {
            TransportError::OpenFailed(format!("{}: {}", config.interface, e))
        })?;
        socket
            .set_error_filter_accept_all()
            .map_err(|e| TransportError::OpenFailed(format!("error filter: {}", e)))?;
        info!(
            "SocketCAN interface '{}' open (bitrate {} configured externally)",
            config.interface, config.bitrate
        );
        self.interface = config.interface.clone();
        self.state = BusState::Active;
        self.read_timeout = None;
        self.pending = None;
        self.socket = Some(socket);
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Received, TransportError> {
        // A zero timeout would make the socket block indefinitely.
        if let Some(frame) = self.pending.take() {
            return Ok(Received::Frame(frame));
        }
        let timeout = timeout.max(Duration::from_micros(100));
        if self.read_timeout != Some(timeout) {
            self.socket()?
                .set_read_timeout(timeout)
                .map_err(|e| TransportError::Io(e.to_string()))?;
            self.read_timeout = Some(timeout);
        }

        let frame = match self.socket()?.read_frame() {
            Ok(frame) => frame,
            Err(e) if is_timeout(&e) => return Ok(Received::Timeout),
            Err(e) => return Err(TransportError::Io(e.to_string())),
        };

        match frame {
            CanFrame::Error(err) => match err.into_error() {
                CanError::BusOff => {
                    if self.state == BusState::BusOff {
                        return Ok(Received::Timeout);
                    }
                    self.state = BusState::BusOff;
                    warn!("'{}': controller bus-off", self.interface);
                    Ok(Received::Bus(BusEvent::BusOff))
                }
                CanError::Restarted => Ok(self
                    .mark_active()
                    .map_or(Received::Timeout, Received::Bus)),
                other => {
                    debug!("'{}': CAN error frame: {}", self.interface, other);
                    Ok(Received::Timeout)
                }
            },
            CanFrame::Remote(_) => Ok(Received::Timeout),
            CanFrame::Data(data) => {
                if let Some(event) = self.mark_active() {
                    // Report recovery first, deliver the frame on the next call.
                    self.pending = Some(to_raw(&data));
                    return Ok(Received::Bus(event));
                }
                Ok(Received::Frame(to_raw(&data)))
            }
        }
    }

    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError> {
        let can_frame = to_socketcan(frame)?;
        self.socket()?
            .write_frame(&can_frame)
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    fn bus_state(&self) -> BusState {
        self.state
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.socket.take().is_some() {
            info!("SocketCAN interface '{}' closed", self.interface);
        }
        Ok(())
    }
}
