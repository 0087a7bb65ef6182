//! Device-mode USB controller interface.
//!
//! A device controller driver ("UDC") implements [UDCAdapter]. A gadget driver describes
//! itself with a [DeviceObject], binds it to the controller, connects to the host and then
//! hands the controller a [UDCHandler] for the duration of [UDCAdapter::run]. While running,
//! the controller answers standard control requests from the device object and calls back
//! into the handler for everything else. Handlers get the controller's [EndpointQueue] so
//! that they can queue the next transfer from inside a completion.

#[macro_use]
extern crate bitflags;

use thiserror::Error;

pub mod object;
pub mod sim;
pub mod usb;

pub use object::{ConfigObject, DeviceObject, EndpointObject, InterfaceObject};
use usb::{EndpDirection, EndpointDescriptor, Setup, UsbSpeed};

pub type Result<T, E = UdcError> = std::result::Result<T, E>;

const ERROR_BIT: usize = 1 << (usize::BITS - 1);

/// Errors reported by a device controller.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum UdcError {
    #[error("invalid parameter")]
    InvalidParameter,

    #[error("not ready")]
    NotReady,

    #[error("device error")]
    DeviceError,

    #[error("unsupported")]
    Unsupported,

    #[error("not found")]
    NotFound,

    #[error("timeout")]
    Timeout,

    #[error("aborted")]
    Aborted,
}

impl UdcError {
    /// Firmware status code, with the high bit marking an error.
    pub fn code(&self) -> usize {
        ERROR_BIT
            | match self {
                Self::InvalidParameter => 2,
                Self::Unsupported => 3,
                Self::NotReady => 6,
                Self::DeviceError => 7,
                Self::NotFound => 14,
                Self::Timeout => 18,
                Self::Aborted => 21,
            }
    }
}

/// A transfer handed to the controller.
///
/// The buffer is owned by the controller until the transfer completes, at which point it
/// comes back in the [XferInfo] passed to [UDCHandler::on_data].
#[derive(Debug)]
pub struct IoRequest {
    pub endpoint: EndpointDescriptor,
    pub buffer: Vec<u8>,
    pub length: usize,
}

/// Data stage of a control transfer.
#[derive(Debug, Default)]
pub struct IoInfo {
    pub buffer: Vec<u8>,
    pub length: usize,
}

/// A completed transfer.
#[derive(Debug)]
pub struct XferInfo {
    pub endpoint_address: u8,
    pub direction: EndpDirection,
    pub buffer: Vec<u8>,
    /// Bytes actually moved, which can be less than what was queued.
    pub length: usize,
}

pub trait EndpointQueue {
    /// Queues a device-to-host transfer.
    fn queue_tx(&mut self, req: IoRequest) -> Result<()>;
    /// Queues a host-to-device transfer.
    fn queue_rx(&mut self, req: IoRequest) -> Result<()>;
}

pub trait UDCAdapter: EndpointQueue {
    /// Speed the controller will run the bus at. Read while binding, before the descriptors
    /// are handed over.
    fn speed(&self) -> UsbSpeed;
    fn init_controller(&mut self) -> Result<()>;
    fn bind(&mut self, device: &DeviceObject) -> Result<()>;
    /// Enables the pull-up so that the host sees the device.
    fn connect(&mut self) -> Result<()>;
    /// Services the bus until `timeout_us` has elapsed or the host goes away.
    fn run(&mut self, timeout_us: u64, handler: &mut dyn UDCHandler) -> Result<()>;
}

/// Gadget side of a controller. Called on the controller's run loop.
pub trait UDCHandler {
    /// A class or vendor control request.
    fn on_setup(&mut self, udc: &mut dyn EndpointQueue, setup: &Setup, io: &mut IoInfo) -> Result<()>;
    /// The host selected configuration `value`.
    fn on_config(&mut self, udc: &mut dyn EndpointQueue, value: u8) -> Result<()>;
    /// A queued transfer completed.
    fn on_data(&mut self, udc: &mut dyn EndpointQueue, xfer: XferInfo) -> Result<()>;
}
