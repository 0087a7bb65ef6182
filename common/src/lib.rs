//! Helpers shared by the USB gadget drivers: logger setup, busy-wait timeouts and the
//! console stall used when reporting failures.

mod logger;
mod timeout;

pub use logger::{file_level, output_level, setup_logging};
pub use timeout::{stall, Timeout};
