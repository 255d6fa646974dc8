//! Wire-level records exchanged with the touch controller
//!
//! The exact byte offsets of the response record are fixed by the transport
//! contract: a 32-bit command code, a 32-bit status code and a fixed-size
//! payload. The transport decodes raw messages into [`Response`] values;
//! this crate only interprets them.

use serde::{Deserialize, Serialize};

/// Fixed payload size of a response record in bytes
pub const RESPONSE_PAYLOAD_SIZE: usize = 80;

/// Number of data/feedback buffers described by a memory window
pub const TOUCH_BUFFERS: usize = 16;

/// Bit set in the command code of every response record
pub const RESPONSE_BIT: u32 = 0x8000_0000;

/// Commands the host can issue to the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandKind {
    /// Query sensor capabilities
    GetDeviceInfo = 0x0000_0001,
    /// Select singletouch or multitouch reporting
    SetMode = 0x0000_0002,
    /// Describe the allocated host buffers to the sensor
    SetMemWindow = 0x0000_0003,
    /// Signal that the host accepts steady-state data
    ReadyForData = 0x0000_0005,
    /// Acknowledge a processed data frame
    Feedback = 0x0000_0006,
    /// Ask the sensor to reset itself
    ResetSensor = 0x0000_000B,
}

impl CommandKind {
    /// Wire code of the outgoing command
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Wire code carried by the matching response record
    pub fn response_code(self) -> u32 {
        self.code() | RESPONSE_BIT
    }

    /// Parse the command kind out of a response code.
    ///
    /// Returns `None` for codes this host version does not know; the
    /// dispatcher treats those as a no-op success so newer firmware does
    /// not break older hosts.
    pub fn from_response(code: u32) -> Option<Self> {
        match code & !RESPONSE_BIT {
            0x0000_0001 => Some(CommandKind::GetDeviceInfo),
            0x0000_0002 => Some(CommandKind::SetMode),
            0x0000_0003 => Some(CommandKind::SetMemWindow),
            0x0000_0005 => Some(CommandKind::ReadyForData),
            0x0000_0006 => Some(CommandKind::Feedback),
            0x0000_000B => Some(CommandKind::ResetSensor),
            _ => None,
        }
    }
}

/// Outcome reported by the sensor for a completed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    InvalidParams,
    AccessDenied,
    CommandSizeError,
    NotReady,
    RequestOutstanding,
    NoSensorFound,
    OutOfMemory,
    InternalError,
    SensorDisabled,
    CompatCheckFail,
    SensorExpectedReset,
    SensorUnexpectedReset,
    ResetFailed,
    Timeout,
    TestModeFail,
    SensorFailFatal,
    SensorFailNonFatal,
    InvalidDeviceCaps,
    QuiesceIoInProgress,
    /// Status code this host version does not know
    Unknown(u32),
}

impl Status {
    /// Parse a raw status code from the wire
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Status::Success,
            1 => Status::InvalidParams,
            2 => Status::AccessDenied,
            3 => Status::CommandSizeError,
            4 => Status::NotReady,
            5 => Status::RequestOutstanding,
            6 => Status::NoSensorFound,
            7 => Status::OutOfMemory,
            8 => Status::InternalError,
            9 => Status::SensorDisabled,
            10 => Status::CompatCheckFail,
            11 => Status::SensorExpectedReset,
            12 => Status::SensorUnexpectedReset,
            13 => Status::ResetFailed,
            14 => Status::Timeout,
            15 => Status::TestModeFail,
            16 => Status::SensorFailFatal,
            17 => Status::SensorFailNonFatal,
            18 => Status::InvalidDeviceCaps,
            19 => Status::QuiesceIoInProgress,
            other => Status::Unknown(other),
        }
    }

    /// Raw wire value of this status code
    pub fn raw(self) -> u32 {
        match self {
            Status::Success => 0,
            Status::InvalidParams => 1,
            Status::AccessDenied => 2,
            Status::CommandSizeError => 3,
            Status::NotReady => 4,
            Status::RequestOutstanding => 5,
            Status::NoSensorFound => 6,
            Status::OutOfMemory => 7,
            Status::InternalError => 8,
            Status::SensorDisabled => 9,
            Status::CompatCheckFail => 10,
            Status::SensorExpectedReset => 11,
            Status::SensorUnexpectedReset => 12,
            Status::ResetFailed => 13,
            Status::Timeout => 14,
            Status::TestModeFail => 15,
            Status::SensorFailFatal => 16,
            Status::SensorFailNonFatal => 17,
            Status::InvalidDeviceCaps => 18,
            Status::QuiesceIoInProgress => 19,
            Status::Unknown(other) => other,
        }
    }
}

/// A single response record received from the sensor
///
/// Immutable once decoded by the transport; consumed exactly once by the
/// dispatcher.
#[derive(Debug, Clone)]
pub struct Response {
    /// Command code this record answers (response bit included)
    pub code: u32,
    /// Outcome of that command
    pub status: Status,
    /// Command-specific payload bytes
    pub payload: [u8; RESPONSE_PAYLOAD_SIZE],
}

impl Response {
    /// Create a response with an empty payload
    pub fn new(kind: CommandKind, status: Status) -> Self {
        Self {
            code: kind.response_code(),
            status,
            payload: [0u8; RESPONSE_PAYLOAD_SIZE],
        }
    }

    /// Attach payload bytes, truncating to the fixed record size
    pub fn with_payload(mut self, bytes: &[u8]) -> Self {
        let len = bytes.len().min(RESPONSE_PAYLOAD_SIZE);
        self.payload[..len].copy_from_slice(&bytes[..len]);
        self
    }

    /// The command kind this record answers, if known to this host version
    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_response(self.code)
    }
}

/// Touch reporting mode negotiated with the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchMode {
    /// One contact per frame; requires doorbell and feedback re-arm steps
    Singletouch,
    /// Full contact tracking handled by the sensor
    Multitouch,
}

impl TouchMode {
    /// Wire value used in SetMode parameters
    pub fn code(self) -> u32 {
        match self {
            TouchMode::Singletouch => 0,
            TouchMode::Multitouch => 1,
        }
    }
}

/// Sensor capabilities returned by GetDeviceInfo
///
/// Read-only after the first handshake step; collaborators size their
/// buffers from `data_size` and `feedback_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor: u16,
    pub product: u16,
    pub hw_rev: u32,
    pub fw_rev: u32,
    /// Size of one touch data frame in bytes
    pub data_size: u32,
    /// Size of one feedback buffer in bytes
    pub feedback_size: u32,
    pub max_contacts: u8,
}

impl DeviceInfo {
    /// Decode the capability record from a GetDeviceInfo response payload
    pub fn parse(payload: &[u8; RESPONSE_PAYLOAD_SIZE]) -> Self {
        Self {
            vendor: u16::from_le_bytes([payload[0], payload[1]]),
            product: u16::from_le_bytes([payload[2], payload[3]]),
            hw_rev: read_u32(payload, 4),
            fw_rev: read_u32(payload, 8),
            data_size: read_u32(payload, 12),
            feedback_size: read_u32(payload, 16),
            max_contacts: payload[20],
        }
    }
}

fn read_u32(payload: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

/// Host buffers negotiated for steady-state touch traffic
///
/// Produced by the resource arena after SetMode completes and sent to the
/// sensor as SetMemWindow parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemWindow {
    pub data_buffers: [u64; TOUCH_BUFFERS],
    pub feedback_buffers: [u64; TOUCH_BUFFERS],
    pub workqueue_addr: u64,
    pub doorbell_addr: u64,
    pub tail_offset_addr: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_code_roundtrip() {
        for kind in [
            CommandKind::GetDeviceInfo,
            CommandKind::SetMode,
            CommandKind::SetMemWindow,
            CommandKind::ReadyForData,
            CommandKind::Feedback,
            CommandKind::ResetSensor,
        ] {
            assert_eq!(CommandKind::from_response(kind.response_code()), Some(kind));
        }
        assert_eq!(CommandKind::from_response(0x8000_00FF), None);
    }

    #[test]
    fn test_status_roundtrip() {
        for raw in 0..25u32 {
            assert_eq!(Status::from_raw(raw).raw(), raw);
        }
        assert_eq!(Status::from_raw(0), Status::Success);
        assert_eq!(Status::from_raw(12), Status::SensorUnexpectedReset);
        assert_eq!(Status::from_raw(999), Status::Unknown(999));
    }

    #[test]
    fn test_response_payload_truncation() {
        let long = [0xAAu8; 200];
        let rsp = Response::new(CommandKind::GetDeviceInfo, Status::Success).with_payload(&long);
        assert_eq!(rsp.payload.len(), RESPONSE_PAYLOAD_SIZE);
        assert!(rsp.payload.iter().all(|&b| b == 0xAA));
        assert_eq!(rsp.kind(), Some(CommandKind::GetDeviceInfo));
    }

    #[test]
    fn test_device_info_parse() {
        let mut payload = [0u8; RESPONSE_PAYLOAD_SIZE];
        payload[0..2].copy_from_slice(&0x8086u16.to_le_bytes());
        payload[2..4].copy_from_slice(&0x9D3Eu16.to_le_bytes());
        payload[4..8].copy_from_slice(&2u32.to_le_bytes());
        payload[8..12].copy_from_slice(&0x0105u32.to_le_bytes());
        payload[12..16].copy_from_slice(&4096u32.to_le_bytes());
        payload[16..20].copy_from_slice(&320u32.to_le_bytes());
        payload[20] = 10;

        let info = DeviceInfo::parse(&payload);
        assert_eq!(info.vendor, 0x8086);
        assert_eq!(info.product, 0x9D3E);
        assert_eq!(info.hw_rev, 2);
        assert_eq!(info.fw_rev, 0x0105);
        assert_eq!(info.data_size, 4096);
        assert_eq!(info.feedback_size, 320);
        assert_eq!(info.max_contacts, 10);
    }

    #[test]
    fn test_touch_mode_codes() {
        assert_eq!(TouchMode::Singletouch.code(), 0);
        assert_eq!(TouchMode::Multitouch.code(), 1);
    }
}
