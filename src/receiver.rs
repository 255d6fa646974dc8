//! Response dispatch and recovery
//!
//! The single entry point [`Receiver::on_message`] is invoked by the
//! transport whenever a response record is available. Responses flow
//! through classification (benign outcome vs. protocol error) into the
//! per-command handlers that drive the startup handshake, and failures
//! escalate into a stop request. Sensor resets are routed to the recovery
//! paths: an unsolicited reset immediately restarts the whole cycle, a
//! solicited one either restarts or releases resources depending on the
//! sticky restart flag.
//!
//! Every failure is handled here; the entry point always returns normally
//! so the transport's delivery loop is never disrupted by a bad response.

use crate::commands;
use crate::config::DeviceConfig;
use crate::context::{DeviceContext, HostStatus};
use crate::protocol::{CommandKind, DeviceInfo, Response, Status, TouchMode};
use crate::services::{InputBridge, Lifecycle, ResourceArena, ServiceError};
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Typed failure of a response handler
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to allocate resources: {0}")]
    Resources(ServiceError),
    #[error("failed to initialize input bridge: {0}")]
    Input(ServiceError),
    #[error("failed to start a new session: {0}")]
    Lifecycle(ServiceError),
    #[error("no device info stored for this session")]
    MissingDeviceInfo,
}

/// Dispatches sensor responses and drives the host lifecycle
pub struct Receiver<T, R, I, L> {
    ctx: Arc<DeviceContext>,
    transport: T,
    resources: R,
    input: I,
    lifecycle: L,
    settle_delay: Duration,
}

impl<T, R, I, L> Receiver<T, R, I, L>
where
    T: Transport,
    R: ResourceArena,
    I: InputBridge,
    L: Lifecycle,
{
    pub fn new(
        ctx: Arc<DeviceContext>,
        config: &DeviceConfig,
        transport: T,
        resources: R,
        input: I,
        lifecycle: L,
    ) -> Self {
        Self {
            ctx,
            transport,
            resources,
            input,
            lifecycle,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// The device context this receiver mutates
    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.ctx
    }

    /// Entry point invoked by the transport when a message is available.
    ///
    /// Messages arriving while the host is stopped are presumed stale and
    /// dropped without touching the transport. A failed receive is
    /// transient: it is logged and the next callback retries naturally.
    pub fn on_message(&self) {
        if self.ctx.status() == HostStatus::Stopped {
            return;
        }

        let rsp = match self.transport.receive() {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!("Error while reading response: {}", e);
                return;
            }
        };

        self.handle_response(&rsp);
    }

    fn handle_response(&self, rsp: &Response) {
        // An unsolicited reset never reaches the classifier; it always
        // triggers a full restart, regardless of the command code.
        if rsp.status == Status::SensorUnexpectedReset {
            info!("Sensor was reset");

            if let Err(e) = self.lifecycle.request_restart() {
                error!("Failed to restart touch session: {}", e);
            }

            return;
        }

        if self.reject_on_error(rsp) {
            // A protocol error is not recoverable within this session.
            self.stop_after_failure();
            return;
        }

        let ret = match rsp.kind() {
            Some(CommandKind::GetDeviceInfo) => self.handle_get_device_info(rsp),
            Some(CommandKind::SetMode) => self.handle_set_mode(),
            Some(CommandKind::SetMemWindow) => self.handle_set_mem_window(),
            Some(CommandKind::ReadyForData) => self.handle_ready_for_data(),
            Some(CommandKind::Feedback) => self.handle_feedback(),
            Some(CommandKind::ResetSensor) => self.handle_reset(),
            // Commands this host version does not know are a no-op success.
            None => Ok(()),
        };

        let err = match ret {
            Ok(()) => return,
            Err(err) => err,
        };

        error!("Error while handling response {:#010x}: {}", rsp.code, err);
        self.stop_after_failure();
    }

    fn stop_after_failure(&self) {
        if let Err(e) = self.lifecycle.request_stop() {
            error!("Failed to stop touch session: {}", e);
        }
    }

    /// Classify the response, logging and returning `true` when it is a
    /// protocol error that must not be dispatched.
    fn reject_on_error(&self, rsp: &Response) -> bool {
        let error = match rsp.status {
            // Compat-check failure is a benign negotiation outcome.
            Status::Success | Status::CompatCheckFail => false,
            // Feedback commands may legitimately be rejected as a no-op.
            Status::InvalidParams => rsp.kind() != Some(CommandKind::Feedback),
            // A reset is only expected while shutting down.
            Status::SensorDisabled | Status::SensorExpectedReset => {
                self.ctx.status() != HostStatus::Stopping
            }
            _ => true,
        };

        if !error {
            return false;
        }

        error!("Command {:#010x} failed: {:?}", rsp.code, rsp.status);
        true
    }

    fn handle_get_device_info(&self, rsp: &Response) -> Result<(), ReceiverError> {
        self.ctx.set_device_info(DeviceInfo::parse(&rsp.payload));

        let mode = self.ctx.mode();
        self.transport
            .issue(CommandKind::SetMode, &commands::set_mode(mode))?;

        Ok(())
    }

    fn handle_set_mode(&self) -> Result<(), ReceiverError> {
        let info = self.ctx.device_info().ok_or(ReceiverError::MissingDeviceInfo)?;

        let window = self
            .resources
            .allocate(self.ctx.mode(), &info)
            .map_err(ReceiverError::Resources)?;

        self.transport
            .issue(CommandKind::SetMemWindow, &commands::set_mem_window(&window))?;

        Ok(())
    }

    fn handle_set_mem_window(&self) -> Result<(), ReceiverError> {
        let info = self.ctx.device_info().ok_or(ReceiverError::MissingDeviceInfo)?;

        self.ctx.set_status(HostStatus::Started);

        self.input
            .init(self.ctx.mode(), &info)
            .map_err(ReceiverError::Input)?;

        // Release everything waiting on "device fully started".
        self.ctx.ready().fire();

        self.transport.issue(CommandKind::ReadyForData, &[])?;

        Ok(())
    }

    fn handle_ready_for_data(&self) -> Result<(), ReceiverError> {
        // In singletouch mode the sensor waits for a doorbell update before
        // delivering the next sample.
        if self.ctx.mode() == TouchMode::Singletouch {
            self.transport.doorbell().increment();
        }

        Ok(())
    }

    fn handle_feedback(&self) -> Result<(), ReceiverError> {
        // In singletouch mode the ReadyForData command needs to be resent
        // after every feedback acknowledgment.
        if self.ctx.mode() == TouchMode::Singletouch {
            self.transport.issue(CommandKind::ReadyForData, &[])?;
        }

        Ok(())
    }

    fn handle_reset(&self) -> Result<(), ReceiverError> {
        // This disables message dispatch at the entry point.
        self.ctx.set_status(HostStatus::Stopped);

        if self.ctx.take_restart() {
            // Give the sensor time to settle before starting over.
            thread::sleep(self.settle_delay);

            self.lifecycle
                .request_start()
                .map_err(ReceiverError::Lifecycle)?;

            return Ok(());
        }

        self.resources.free();
        self.input.free();

        Ok(())
    }
}
