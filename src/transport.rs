//! Transport collaborator interfaces
//!
//! The physical channel to the sensor is owned by external code; this crate
//! talks to it through [`Transport`]. Commands are asynchronous: the answer
//! to an issued command arrives later through the receiver's entry point.

use crate::protocol::{CommandKind, Response};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the transport layer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to send command: {0}")]
    Send(String),
    #[error("failed to read response: {0}")]
    Recv(String),
    #[error("short read: got {got} of {expected} bytes")]
    ShortRead { got: usize, expected: usize },
}

/// Ready-to-read counter the host increments to let the sensor deliver the
/// next sample (singletouch mode only)
pub trait Doorbell: Send + Sync {
    fn increment(&self);
}

/// Command/response channel to the sensor
pub trait Transport: Send + Sync {
    /// Send a command with the given parameter bytes
    fn issue(&self, kind: CommandKind, params: &[u8]) -> Result<(), TransportError>;

    /// Pull the next fixed-size response record
    fn receive(&self) -> Result<Response, TransportError>;

    /// The doorbell backing the negotiated memory window
    fn doorbell(&self) -> &dyn Doorbell;
}

impl<T: Transport> Transport for Arc<T> {
    fn issue(&self, kind: CommandKind, params: &[u8]) -> Result<(), TransportError> {
        (**self).issue(kind, params)
    }

    fn receive(&self) -> Result<Response, TransportError> {
        (**self).receive()
    }

    fn doorbell(&self) -> &dyn Doorbell {
        (**self).doorbell()
    }
}
