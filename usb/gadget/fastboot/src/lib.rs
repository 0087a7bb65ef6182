//! USB transport for Fastboot.
//!
//! Presents a vendor-specific bulk interface (subclass 0x42, protocol 0x03) to the host and
//! turns its bulk transfers into callbacks for a Fastboot command interpreter. The device
//! controller is anything implementing [driver_udc::UDCAdapter].
//!
//! ```no_run
//! use driver_udc::sim::SimulatedUdc;
//! use fastboot_usb::{Callbacks, FastbootConfig, FastbootUsb};
//!
//! let mut fastboot = FastbootUsb::new(FastbootConfig::embedded());
//! let callbacks = Callbacks::new()
//!     .on_start(|transport| {
//!         let _ = transport.read(vec![0; 64], 64);
//!     })
//!     .on_receive(|transport, buffer, length| {
//!         log::info!("{}", String::from_utf8_lossy(&buffer[..length]));
//!         let _ = transport.write(b"OKAY".to_vec(), 4);
//!     });
//! fastboot.start(|| Some(SimulatedUdc::new()), callbacks).unwrap();
//! ```

pub mod config;
pub mod descriptors;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod transfer;

pub use config::{ConfigError, FastbootConfig};
pub use descriptors::FastbootDescriptors;
pub use dispatch::{Callbacks, DataCallback, Dispatcher, StartCallback};
pub use driver::{DriverState, FastbootUsb};
pub use error::{DriverError, IoError};
pub use transfer::{round_up_to_packet, Transport};
