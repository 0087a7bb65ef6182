use driver_udc::usb::{EndpDirection, EndpointDescriptor, Setup};
use driver_udc::{EndpointQueue, IoInfo, UDCHandler, UdcError, XferInfo};

use crate::descriptors::FastbootDescriptors;
use crate::error::{log_failure, DriverError};
use crate::transfer::Transport;

pub type StartCallback = Box<dyn FnMut(&mut Transport<'_>)>;
/// Gets the completed buffer and the number of bytes actually transferred.
pub type DataCallback = Box<dyn FnMut(&mut Transport<'_>, Vec<u8>, usize)>;

/// Handlers of the command interpreter. Any of them may be left unset, in which case the
/// matching events are ignored.
#[derive(Default)]
pub struct Callbacks {
    start: Option<StartCallback>,
    receive: Option<DataCallback>,
    transmit: Option<DataCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called every time the host selects the Fastboot configuration.
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Transport<'_>) + 'static,
    {
        self.start = Some(Box::new(f));
        self
    }

    /// Called when a receive completes.
    pub fn on_receive<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Transport<'_>, Vec<u8>, usize) + 'static,
    {
        self.receive = Some(Box::new(f));
        self
    }

    /// Called when a write completes.
    pub fn on_transmit<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Transport<'_>, Vec<u8>, usize) + 'static,
    {
        self.transmit = Some(Box::new(f));
        self
    }
}

/// Turns controller events into calls to [Callbacks].
pub struct Dispatcher {
    callbacks: Callbacks,
    configuration_value: u8,
    ep_in: EndpointDescriptor,
    ep_out: EndpointDescriptor,
}

impl Dispatcher {
    pub fn new(callbacks: Callbacks, descriptors: &FastbootDescriptors) -> Self {
        Self {
            callbacks,
            configuration_value: descriptors.configuration_value(),
            ep_in: descriptors.ep_in(),
            ep_out: descriptors.ep_out(),
        }
    }

    /// The host selected configuration `value`. Starts the interpreter if it is ours.
    ///
    /// Every selection starts it again; there is no tracking of earlier ones.
    pub fn configure(&mut self, udc: &mut dyn EndpointQueue, value: u8) -> Result<(), DriverError> {
        if value != self.configuration_value {
            return Err(DriverError::InvalidConfiguration(value));
        }

        log::debug!("fastboot: configuration {} selected", value);
        if let Some(start) = self.callbacks.start.as_mut() {
            let mut transport = Transport::new(udc, self.ep_in, self.ep_out);
            start(&mut transport);
        }
        Ok(())
    }

    /// Hands a completed transfer to the callback for its direction.
    pub fn complete(&mut self, udc: &mut dyn EndpointQueue, xfer: XferInfo) {
        let callback = match xfer.direction {
            EndpDirection::Out => self.callbacks.receive.as_mut(),
            EndpDirection::In => self.callbacks.transmit.as_mut(),
        };

        match callback {
            Some(callback) => {
                let mut transport = Transport::new(udc, self.ep_in, self.ep_out);
                callback(&mut transport, xfer.buffer, xfer.length);
            }
            None => log::trace!(
                "fastboot: no handler for {:?} completion of {} bytes",
                xfer.direction,
                xfer.length
            ),
        }
    }
}

impl UDCHandler for Dispatcher {
    fn on_setup(&mut self, _udc: &mut dyn EndpointQueue, _setup: &Setup, _io: &mut IoInfo) -> driver_udc::Result<()> {
        // Fastboot defines no class or vendor requests; everything moves over bulk.
        Ok(())
    }

    fn on_config(&mut self, udc: &mut dyn EndpointQueue, value: u8) -> driver_udc::Result<()> {
        self.configure(udc, value).map_err(|err| {
            log_failure("fastboot", &err, err.code());
            UdcError::InvalidParameter
        })
    }

    fn on_data(&mut self, udc: &mut dyn EndpointQueue, xfer: XferInfo) -> driver_udc::Result<()> {
        self.complete(udc, xfer);
        Ok(())
    }
}
