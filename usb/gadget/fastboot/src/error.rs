use std::fmt;
use std::time::Duration;

use driver_udc::UdcError;
use thiserror::Error;

/// Failure to queue a transfer. Leaves the driver usable.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum IoError {
    #[error("no usb device controller bound")]
    NotBound,

    #[error("transfer of {length} bytes does not fit a {capacity} byte buffer")]
    BufferTooShort { length: usize, capacity: usize },

    #[error("controller rejected transfer: {0}")]
    Rejected(#[from] UdcError),
}

impl IoError {
    pub fn code(&self) -> usize {
        match self {
            Self::NotBound => UdcError::NotReady.code(),
            Self::BufferTooShort { .. } => UdcError::InvalidParameter.code(),
            Self::Rejected(err) => err.code(),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DriverError {
    #[error("failed to locate usb device controller")]
    ProviderUnavailable,

    #[error("controller init failed: {0}")]
    ControllerInitFailed(UdcError),

    #[error("failed to bind fastboot to the usb device controller: {0}")]
    BindFailed(UdcError),

    #[error("failed to connect: {0}")]
    ConnectFailed(UdcError),

    #[error("error occurred during run: {0}")]
    RunFailed(UdcError),

    #[error("invalid configuration value: {0:#x}")]
    InvalidConfiguration(u8),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl DriverError {
    pub fn code(&self) -> usize {
        match self {
            Self::ProviderUnavailable => UdcError::NotFound.code(),
            Self::InvalidConfiguration(_) => UdcError::InvalidParameter.code(),
            Self::ControllerInitFailed(err)
            | Self::BindFailed(err)
            | Self::ConnectFailed(err)
            | Self::RunFailed(err) => err.code(),
            Self::Io(err) => err.code(),
        }
    }
}

/// Logs a failure with its code. Safe to call from the controller's run loop.
pub(crate) fn log_failure(context: &str, err: &dyn fmt::Display, code: usize) {
    log::error!("{}: {} ({:#x})", context, err, code);
}

/// Puts a failure on the console and holds it there for `stall`.
///
/// Only for failures that end the session; nothing is serviced while this spins.
pub(crate) fn report(context: &str, err: &dyn fmt::Display, code: usize, stall: Duration) {
    log_failure(context, err, code);
    common::stall(stall);
}
