//! Driver-side collaborator interfaces
//!
//! Buffer provisioning, the downstream input-event bridge and the external
//! start/stop/restart control path live outside this crate. The receiver
//! reaches them through these traits.

use crate::protocol::{DeviceInfo, MemWindow, TouchMode};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by driver-side collaborators
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("{0}")]
    Failed(String),
}

/// Provisions the host buffers backing steady-state touch traffic
pub trait ResourceArena: Send + Sync {
    /// Allocate buffers sized for the negotiated mode and sensor
    /// capabilities, returning their memory window descriptor
    fn allocate(&self, mode: TouchMode, info: &DeviceInfo) -> Result<MemWindow, ServiceError>;

    /// Release previously allocated buffers; must be idempotent
    fn free(&self);
}

/// The downstream input-event translation layer
pub trait InputBridge: Send + Sync {
    /// Bring up the translation layer for the started session
    fn init(&self, mode: TouchMode, info: &DeviceInfo) -> Result<(), ServiceError>;

    /// Tear the translation layer down; must be idempotent
    fn free(&self);
}

/// Externally-driven session control operations
pub trait Lifecycle: Send + Sync {
    /// Begin a fresh handshake from `Stopped`
    fn request_start(&self) -> Result<(), ServiceError>;

    /// Request a transition into the stopping phase
    fn request_stop(&self) -> Result<(), ServiceError>;

    /// Full-cycle restart, used when the sensor resets unexpectedly
    fn request_restart(&self) -> Result<(), ServiceError>;
}

impl<R: ResourceArena> ResourceArena for Arc<R> {
    fn allocate(&self, mode: TouchMode, info: &DeviceInfo) -> Result<MemWindow, ServiceError> {
        (**self).allocate(mode, info)
    }

    fn free(&self) {
        (**self).free()
    }
}

impl<I: InputBridge> InputBridge for Arc<I> {
    fn init(&self, mode: TouchMode, info: &DeviceInfo) -> Result<(), ServiceError> {
        (**self).init(mode, info)
    }

    fn free(&self) {
        (**self).free()
    }
}

impl<L: Lifecycle> Lifecycle for Arc<L> {
    fn request_start(&self) -> Result<(), ServiceError> {
        (**self).request_start()
    }

    fn request_stop(&self) -> Result<(), ServiceError> {
        (**self).request_stop()
    }

    fn request_restart(&self) -> Result<(), ServiceError> {
        (**self).request_restart()
    }
}
