use driver_udc::UDCAdapter;

use crate::config::FastbootConfig;
use crate::descriptors::FastbootDescriptors;
use crate::dispatch::{Callbacks, Dispatcher};
use crate::error::{report, DriverError, IoError};
use crate::transfer::Transport;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DriverState {
    Uninitialized,
    ProviderBound,
    Connected,
    Running,
    Stopped,
    Failed,
}

impl DriverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::ProviderBound => "provider_bound",
            Self::Connected => "connected",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

fn transition(state: &mut DriverState, next: DriverState) {
    log::debug!("fastboot: {} -> {}", state.as_str(), next.as_str());
    *state = next;
}

/// The Fastboot USB gadget driver.
///
/// One instance drives one device controller for the lifetime of the boot stage. The
/// descriptors are built when a controller is bound and stay put until the next
/// [FastbootUsb::start], or until the session fails.
pub struct FastbootUsb<A: UDCAdapter> {
    config: FastbootConfig,
    state: DriverState,
    udc: Option<A>,
    descriptors: Option<FastbootDescriptors>,
}

impl<A: UDCAdapter> FastbootUsb<A> {
    pub fn new(config: FastbootConfig) -> Self {
        Self {
            config,
            state: DriverState::Uninitialized,
            udc: None,
            descriptors: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &FastbootConfig {
        &self.config
    }

    pub fn descriptors(&self) -> Option<&FastbootDescriptors> {
        self.descriptors.as_ref()
    }

    /// The controller found by the last [FastbootUsb::start], if any.
    pub fn udc(&self) -> Option<&A> {
        self.udc.as_ref()
    }

    /// Brings the gadget up on the controller returned by `locate` and services the bus
    /// until the run budget is used up or the host goes away.
    ///
    /// Blocks for the whole session. Any failure leaves the driver in
    /// [DriverState::Failed]; it can only be recovered by calling `start` again.
    pub fn start<L>(&mut self, locate: L, callbacks: Callbacks) -> Result<(), DriverError>
    where
        L: FnOnce() -> Option<A>,
    {
        self.state = DriverState::Uninitialized;
        self.udc = None;
        self.descriptors = None;

        match self.run_session(locate, callbacks) {
            Ok(()) => {
                log::info!("fastboot: usb session ended");
                transition(&mut self.state, DriverState::Stopped);
                Ok(())
            }
            Err(err) => {
                transition(&mut self.state, DriverState::Failed);
                // The controller stays readable through `udc`, but nothing is queued to it
                // until the next successful start.
                self.descriptors = None;
                match err {
                    DriverError::ProviderUnavailable => log::warn!("fastboot: {}", err),
                    _ => report("fastboot", &err, err.code(), self.config.error_stall()),
                }
                Err(err)
            }
        }
    }

    fn run_session<L>(&mut self, locate: L, callbacks: Callbacks) -> Result<(), DriverError>
    where
        L: FnOnce() -> Option<A>,
    {
        let udc = self
            .udc
            .insert(locate().ok_or(DriverError::ProviderUnavailable)?);
        udc.init_controller()
            .map_err(DriverError::ControllerInitFailed)?;

        let speed = udc.speed();
        let descriptors = FastbootDescriptors::new(&self.config, speed);
        log::debug!(
            "fastboot: binding at {} speed, {} byte bulk packets",
            speed.as_str(),
            descriptors.bulk_max_packet_size()
        );
        udc.bind(descriptors.device_object())
            .map_err(DriverError::BindFailed)?;
        let mut dispatcher = Dispatcher::new(callbacks, &descriptors);
        self.descriptors = Some(descriptors);
        transition(&mut self.state, DriverState::ProviderBound);

        udc.connect().map_err(DriverError::ConnectFailed)?;
        transition(&mut self.state, DriverState::Connected);

        transition(&mut self.state, DriverState::Running);
        udc.run(self.config.run_timeout_us, &mut dispatcher)
            .map_err(DriverError::RunFailed)
    }

    /// Borrows the transfer engine outside of the callbacks.
    ///
    /// Fails with [IoError::NotBound] unless the last [FastbootUsb::start] bound a controller
    /// and ran its session to the end.
    pub fn transport(&mut self) -> Result<Transport<'_>, IoError> {
        let descriptors = self.descriptors.as_ref().ok_or(IoError::NotBound)?;
        let udc = self.udc.as_mut().ok_or(IoError::NotBound)?;
        Ok(Transport::new(udc, descriptors.ep_in(), descriptors.ep_out()))
    }

    /// See [Transport::write].
    pub fn write(&mut self, buffer: Vec<u8>, length: usize) -> Result<(), IoError> {
        self.transport()?.write(buffer, length)
    }

    /// See [Transport::read].
    pub fn read(&mut self, buffer: Vec<u8>, length: usize) -> Result<(), IoError> {
        self.transport()?.read(buffer, length)
    }
}
