//! Hosted build of the Fastboot USB gadget.
//!
//! Runs the gadget against the in-memory device controller with a scripted host that
//! enumerates the device and sends a single command. Every command is answered with `OKAY`.

use driver_udc::sim::{HostEvent, SimulatedUdc};
use fastboot_usb::{Callbacks, FastbootConfig, FastbootUsb, Transport};

const COMMAND_LEN: usize = 64;

fn queue_command_read(transport: &mut Transport<'_>) {
    if let Err(err) = transport.read(vec![0; COMMAND_LEN], COMMAND_LEN) {
        log::error!("fastboot-usbd: failed to queue command read: {}", err);
    }
}

fn main() {
    common::setup_logging(
        "usb",
        "gadget",
        "fastboot",
        common::output_level(),
        common::file_level(),
    );

    let config = FastbootConfig::embedded();
    let mut fastboot = FastbootUsb::new(config);

    let callbacks = Callbacks::new()
        .on_start(queue_command_read)
        .on_receive(|transport, buffer, length| {
            let command = String::from_utf8_lossy(&buffer[..length]);
            log::info!("fastboot-usbd: command {:?}", command);

            let reply = b"OKAY".to_vec();
            let reply_len = reply.len();
            if let Err(err) = transport.write(reply, reply_len) {
                log::error!("fastboot-usbd: failed to reply: {}", err);
            }
        })
        .on_transmit(|transport, _, _| queue_command_read(transport));

    let result = fastboot.start(
        || {
            let mut udc = SimulatedUdc::new();
            udc.push_enumeration(1);
            udc.push_host(HostEvent::Out(b"getvar:version".to_vec()));
            udc.push_host(HostEvent::Detach);
            Some(udc)
        },
        callbacks,
    );

    if let Err(err) = result {
        log::error!("fastboot-usbd: {} ({:#x})", err, err.code());
        std::process::exit(1);
    }

    if let Some(udc) = fastboot.udc() {
        for reply in udc.bulk_in() {
            log::info!("fastboot-usbd: host read {:?}", String::from_utf8_lossy(reply));
        }
    }
}
