//! Device context and host lifecycle state
//!
//! One [`DeviceContext`] is created when the device is attached and reused
//! across every handshake/restart cycle; its fields are overwritten in
//! place, never reallocated. The host status lives in an atomic so that
//! transitions into [`HostStatus::Stopped`] made on the control path are
//! visible to the transport callback before it decides whether to receive.

use crate::protocol::{DeviceInfo, TouchMode};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tokio::sync::watch;

/// Host-side lifecycle phase of the touch session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HostStatus {
    /// No session; incoming messages are dropped at the entry point
    Stopped = 0,
    /// Handshake in progress
    Starting = 1,
    /// Fully provisioned, steady-state traffic flowing
    Started = 2,
    /// A stop has been requested but the sensor has not yet confirmed
    Stopping = 3,
}

impl HostStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => HostStatus::Starting,
            2 => HostStatus::Started,
            3 => HostStatus::Stopping,
            _ => HostStatus::Stopped,
        }
    }
}

/// One-shot readiness signal, re-armed once per handshake cycle
///
/// Backed by a watch channel so any number of waiters can block on it and
/// all are released together when it fires.
#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Reset to not-fired; called before the first command of a new cycle
    pub fn rearm(&self) {
        self.tx.send_replace(false);
    }

    /// Release all current and future waiters
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has fired in the current cycle
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe for waiting; see [`DeviceContext::wait_started`]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Long-lived state shared between the transport callback and the external
/// control path
#[derive(Debug)]
pub struct DeviceContext {
    status: AtomicU8,
    mode: Mutex<TouchMode>,
    device_info: Mutex<Option<DeviceInfo>>,
    restart: AtomicBool,
    ready: Readiness,
}

impl DeviceContext {
    /// Create a context in the `Stopped` state with the configured mode
    pub fn new(mode: TouchMode) -> Self {
        Self {
            status: AtomicU8::new(HostStatus::Stopped as u8),
            mode: Mutex::new(mode),
            device_info: Mutex::new(None),
            restart: AtomicBool::new(false),
            ready: Readiness::new(),
        }
    }

    /// Current host status
    pub fn status(&self) -> HostStatus {
        HostStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Transition the host status
    pub fn set_status(&self, status: HostStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }

    /// The negotiated touch reporting mode
    pub fn mode(&self) -> TouchMode {
        *self.mode.lock()
    }

    /// Replace the mode for the next handshake cycle
    pub fn set_mode(&self, mode: TouchMode) {
        *self.mode.lock() = mode;
    }

    /// Capability data from the last GetDeviceInfo response, if any
    pub fn device_info(&self) -> Option<DeviceInfo> {
        *self.device_info.lock()
    }

    /// Store the capability data received during the handshake
    pub fn set_device_info(&self, info: DeviceInfo) {
        *self.device_info.lock() = Some(info);
    }

    /// Mark that the next solicited reset should immediately restart the
    /// handshake instead of releasing resources
    pub fn set_restart(&self, restart: bool) {
        self.restart.store(restart, Ordering::SeqCst);
    }

    /// Consume the restart flag
    pub fn take_restart(&self) -> bool {
        self.restart.swap(false, Ordering::SeqCst)
    }

    /// Begin a new handshake cycle: re-arm the readiness signal and move
    /// into `Starting`. The external start path calls this before issuing
    /// the first GetDeviceInfo command.
    pub fn begin_cycle(&self) {
        self.ready.rearm();
        self.set_status(HostStatus::Starting);
    }

    /// The readiness signal for this device
    pub fn ready(&self) -> &Readiness {
        &self.ready
    }

    /// Wait until the device reaches `Started` and accepts steady-state
    /// traffic.
    ///
    /// The signal never fires for a handshake that is aborted by a stop
    /// request, so callers should pair this with a timeout.
    pub async fn wait_started(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_state() {
        let ctx = DeviceContext::new(TouchMode::Multitouch);
        assert_eq!(ctx.status(), HostStatus::Stopped);
        assert_eq!(ctx.mode(), TouchMode::Multitouch);
        assert!(ctx.device_info().is_none());
        assert!(!ctx.ready().is_fired());
    }

    #[test]
    fn test_restart_flag_is_consumed() {
        let ctx = DeviceContext::new(TouchMode::Singletouch);
        assert!(!ctx.take_restart());

        ctx.set_restart(true);
        assert!(ctx.take_restart());
        assert!(!ctx.take_restart());
    }

    #[test]
    fn test_begin_cycle_rearms_readiness() {
        let ctx = DeviceContext::new(TouchMode::Multitouch);
        ctx.ready().fire();
        assert!(ctx.ready().is_fired());

        ctx.begin_cycle();
        assert_eq!(ctx.status(), HostStatus::Starting);
        assert!(!ctx.ready().is_fired());
    }

    #[tokio::test]
    async fn test_wait_started_releases_all_waiters() {
        let ctx = std::sync::Arc::new(DeviceContext::new(TouchMode::Multitouch));
        ctx.begin_cycle();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let ctx = std::sync::Arc::clone(&ctx);
            waiters.push(tokio::spawn(async move { ctx.wait_started().await }));
        }

        ctx.ready().fire();
        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter should be released")
                .unwrap();
        }
    }
}
