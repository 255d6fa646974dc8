//! Precise Touch host core
//!
//! Host-side response dispatch and lifecycle state machine for a touch/stylus
//! controller driven over an asynchronous command/response channel.
//!
//! # Features
//! - Classifies incoming responses into benign outcomes and protocol errors
//! - Drives the startup handshake (device info, mode, memory window, ready)
//! - Recovers from solicited and unsolicited sensor resets
//! - Exposes a one-shot readiness signal for code waiting on device startup
//!
//! The physical transport, buffer allocation, input-event translation and the
//! external start/stop/restart control path are collaborators reached through
//! the traits in [`transport`] and [`services`].

pub mod commands;
pub mod config;
pub mod context;
pub mod protocol;
pub mod receiver;
pub mod services;
pub mod transport;

pub use config::DeviceConfig;
pub use context::{DeviceContext, HostStatus};
pub use protocol::{CommandKind, DeviceInfo, MemWindow, Response, Status, TouchMode};
pub use receiver::{Receiver, ReceiverError};
pub use services::{InputBridge, Lifecycle, ResourceArena, ServiceError};
pub use transport::{Doorbell, Transport, TransportError};
