use driver_udc::usb::EndpointDescriptor;
use driver_udc::{EndpointQueue, IoRequest};

use crate::error::{log_failure, IoError};

/// Rounds `length` up to a whole number of `max_packet_size` packets.
pub fn round_up_to_packet(length: usize, max_packet_size: usize) -> usize {
    if max_packet_size == 0 {
        return length;
    }
    match length % max_packet_size {
        0 => length,
        rem => length + (max_packet_size - rem),
    }
}

/// Queues bulk transfers on the Fastboot endpoints.
///
/// Both operations only hand the buffer to the controller. The data moves later and the
/// completion, with the buffer, arrives through the receive or transmit callback.
pub struct Transport<'a> {
    udc: &'a mut dyn EndpointQueue,
    ep_in: EndpointDescriptor,
    ep_out: EndpointDescriptor,
}

impl<'a> Transport<'a> {
    pub(crate) fn new(
        udc: &'a mut dyn EndpointQueue,
        ep_in: EndpointDescriptor,
        ep_out: EndpointDescriptor,
    ) -> Self {
        Self { udc, ep_in, ep_out }
    }

    /// Max packet size of the OUT endpoint, which every receive length is a multiple of.
    pub fn max_packet_size(&self) -> usize {
        usize::from(self.ep_out.max_packet_size())
    }

    /// Sends the first `length` bytes of `buffer` to the host.
    pub fn write(&mut self, buffer: Vec<u8>, length: usize) -> Result<(), IoError> {
        if length > buffer.len() {
            return Err(IoError::BufferTooShort {
                length,
                capacity: buffer.len(),
            });
        }

        log::trace!("Tx {:#x} bytes", length);
        self.udc
            .queue_tx(IoRequest {
                endpoint: self.ep_in,
                buffer,
                length,
            })
            .map_err(|err| {
                let err = IoError::from(err);
                log_failure("failed to queue Tx request", &err, err.code());
                err
            })
    }

    /// Receives up to `length` bytes from the host into `buffer`.
    ///
    /// The controller only takes receives that are a whole number of packets, so `length` is
    /// rounded up and `buffer` grown to match.
    pub fn read(&mut self, mut buffer: Vec<u8>, length: usize) -> Result<(), IoError> {
        let length = round_up_to_packet(length, self.max_packet_size());
        if buffer.len() < length {
            buffer.resize(length, 0);
        }

        log::debug!("Rx {:#x} bytes", length);
        self.udc
            .queue_rx(IoRequest {
                endpoint: self.ep_out,
                buffer,
                length,
            })
            .map_err(|err| {
                let err = IoError::from(err);
                log_failure("failed to queue Rx request", &err, err.code());
                err
            })
    }
}
