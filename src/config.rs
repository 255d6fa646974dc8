//! Device configuration

use crate::protocol::TouchMode;
use serde::{Deserialize, Serialize};

/// Configuration for the touch device session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Touch reporting mode requested during the handshake
    #[serde(default = "default_mode")]
    pub mode: TouchMode,
    /// Pause between a solicited reset acknowledgment and the immediate
    /// restart, in milliseconds
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_mode() -> TouchMode {
    TouchMode::Multitouch
}

fn default_settle_delay() -> u64 {
    1000
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DeviceConfig::default();
        assert_eq!(config.mode, TouchMode::Multitouch);
        assert_eq!(config.settle_delay_ms, 1000);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: DeviceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, TouchMode::Multitouch);

        let config: DeviceConfig =
            serde_json::from_str(r#"{"mode":"singletouch","settle_delay_ms":0}"#).unwrap();
        assert_eq!(config.mode, TouchMode::Singletouch);
        assert_eq!(config.settle_delay_ms, 0);
    }
}
