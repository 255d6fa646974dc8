//! Command parameter builders
//!
//! Convenience functions for building the little-endian parameter bytes of
//! outgoing commands. GetDeviceInfo, ReadyForData, Feedback and ResetSensor
//! carry no parameters.

use crate::protocol::{MemWindow, TouchMode};

/// Build SetMode parameters selecting the touch reporting mode
pub fn set_mode(mode: TouchMode) -> Vec<u8> {
    mode.code().to_le_bytes().to_vec()
}

/// Build SetMemWindow parameters describing the allocated host buffers
pub fn set_mem_window(window: &MemWindow) -> Vec<u8> {
    let mut params = Vec::with_capacity((window.data_buffers.len() * 2 + 3) * 8);

    for addr in &window.data_buffers {
        params.extend_from_slice(&addr.to_le_bytes());
    }
    for addr in &window.feedback_buffers {
        params.extend_from_slice(&addr.to_le_bytes());
    }
    params.extend_from_slice(&window.workqueue_addr.to_le_bytes());
    params.extend_from_slice(&window.doorbell_addr.to_le_bytes());
    params.extend_from_slice(&window.tail_offset_addr.to_le_bytes());

    params
}
