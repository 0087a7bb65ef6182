//! The USB identity of the Fastboot gadget: one configuration with one vendor-specific
//! interface carrying a bulk IN and a bulk OUT endpoint.

use driver_udc::usb::{
    ConfigAttributes, ConfigDescriptor, DeviceDescriptor, EndpDirection, EndpointDescriptor,
    EndpointTy, InterfaceDescriptor, StringDescriptor, UsbSpeed, LANG_EN_US,
    VENDOR_SPECIFIC_CLASS,
};
use driver_udc::{ConfigObject, DeviceObject, EndpointObject, InterfaceObject};

use crate::config::FastbootConfig;

pub const CONFIG_COUNT: u8 = 1;
pub const INTERFACE_COUNT: u8 = 1;
pub const ENDPOINT_COUNT: u8 = 2;
pub const CONFIG_VALUE: u8 = 1;
/// Bus power drawn in this configuration, in 2 mA units.
pub const CFG_MAX_POWER: u8 = 0x00;
pub const FB_IF_SUBCLASS: u8 = 0x42;
pub const FB_IF_PROTOCOL: u8 = 0x03;
pub const IN_ENDPOINT_NUM: u8 = 1;
pub const OUT_ENDPOINT_NUM: u8 = 2;

/// Indexes into the string table.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StrIndex {
    Lang = 0,
    Manufacturer = 1,
    Product = 2,
    Serial = 3,
    Config = 4,
    Interface = 5,
}

pub const STR_TBL_COUNT: usize = 6;

#[derive(Clone, Debug)]
pub struct FastbootDescriptors {
    object: DeviceObject,
    ep_in: EndpointDescriptor,
    ep_out: EndpointDescriptor,
}

impl FastbootDescriptors {
    /// Bulk endpoints use the high-speed maximum packet size, lowered when `speed` cannot
    /// carry it.
    pub fn new(config: &FastbootConfig, speed: UsbSpeed) -> Self {
        let packet_size = UsbSpeed::High
            .bulk_max_packet_size()
            .min(speed.bulk_max_packet_size());

        let ep_in = EndpointDescriptor::new(
            IN_ENDPOINT_NUM,
            EndpDirection::In,
            EndpointTy::Bulk,
            packet_size,
        );
        let ep_out = EndpointDescriptor::new(
            OUT_ENDPOINT_NUM,
            EndpDirection::Out,
            EndpointTy::Bulk,
            packet_size,
        );

        let mut interface = InterfaceDescriptor::new(
            0,
            VENDOR_SPECIFIC_CLASS,
            FB_IF_SUBCLASS,
            FB_IF_PROTOCOL,
        );
        interface.endpoints = ENDPOINT_COUNT;
        interface.interface_str = StrIndex::Interface as u8;

        let mut config_desc = ConfigDescriptor::new(
            CONFIG_VALUE,
            ConfigAttributes::RESERVED | ConfigAttributes::SELF_POWERED,
            CFG_MAX_POWER,
        );
        config_desc.interfaces = INTERFACE_COUNT;
        config_desc.configuration_str = StrIndex::Config as u8;

        let mut configuration = ConfigObject {
            desc: config_desc,
            interfaces: vec![InterfaceObject {
                desc: interface,
                endpoints: vec![
                    EndpointObject {
                        desc: ep_in,
                        companion: None,
                    },
                    EndpointObject {
                        desc: ep_out,
                        companion: None,
                    },
                ],
            }],
        };
        configuration.desc.total_length = configuration.total_length();

        // Class information lives in the interface descriptor.
        let mut device = DeviceDescriptor::new(
            UsbSpeed::High.bcd_usb(),
            UsbSpeed::High.ep0_max_packet_size(),
            config.vendor_id,
            config.product_id,
            config.device_release,
        );
        device.manufacturer_str = StrIndex::Manufacturer as u8;
        device.product_str = StrIndex::Product as u8;
        device.serial_str = StrIndex::Serial as u8;
        device.configurations = CONFIG_COUNT;

        let strings = vec![
            StringDescriptor::languages(&[LANG_EN_US]),
            StringDescriptor::new(&config.manufacturer),
            StringDescriptor::new(&config.product),
            StringDescriptor::new(&config.serial),
            StringDescriptor::new(&config.configuration),
            StringDescriptor::new(&config.interface),
        ];

        Self {
            object: DeviceObject {
                device,
                strings,
                configs: vec![configuration],
            },
            ep_in,
            ep_out,
        }
    }

    /// The graph handed to the controller at bind time.
    pub fn device_object(&self) -> &DeviceObject {
        &self.object
    }

    pub fn configuration(&self) -> &ConfigObject {
        &self.object.configs[0]
    }

    pub fn configuration_value(&self) -> u8 {
        self.configuration().desc.configuration_value
    }

    pub fn ep_in(&self) -> EndpointDescriptor {
        self.ep_in
    }

    pub fn ep_out(&self) -> EndpointDescriptor {
        self.ep_out
    }

    pub fn bulk_max_packet_size(&self) -> u16 {
        self.ep_out.max_packet_size()
    }
}
