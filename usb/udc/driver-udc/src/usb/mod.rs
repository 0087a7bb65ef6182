//! USB descriptor records as a device presents them to the host.
//!
//! Every record is `#[repr(C, packed)]` so that its in-memory layout mirrors the wire layout,
//! but nothing relies on that: each one has an explicit little-endian `to_bytes` serializer
//! which is what actually goes out on the bus.
//!
//! References are to the [Universal Serial Bus Specification](https://www.usb.org/document-library/usb-20-specification)
//! (USB2) and the [Universal Serial Bus 3.2 Specification](https://usb.org/document-library/usb-32-revision-11-june-2022)
//! (USB32).
pub use self::config::{ConfigAttributes, ConfigDescriptor};
pub use self::device::DeviceDescriptor;
pub use self::endpoint::{
    EndpDirection, EndpointDescriptor, EndpointTy, SuperSpeedCompanionDescriptor,
    ENDP_ADDR_DIR_IN, ENDP_ADDR_NUM_MASK, ENDP_ATTR_TY_MASK,
};
pub use self::interface::{InterfaceDescriptor, VENDOR_SPECIFIC_CLASS};
pub use self::setup::{ReqDirection, ReqType, Setup, SetupReq};
pub use self::string::{StringDescriptor, LANG_EN_US};

/// Enumerates the descriptor kinds a device reports to the host. (See USB32 Sections 9.5 and 9.6)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum DescriptorKind {
    /// A Device Descriptor. See [DeviceDescriptor]
    Device = 1,
    /// A Configuration Descriptor. See [ConfigDescriptor]
    Configuration = 2,
    /// A String Descriptor. See [StringDescriptor]
    String = 3,
    /// An Interface Descriptor. See [InterfaceDescriptor]
    Interface = 4,
    /// An Endpoint Descriptor. See [EndpointDescriptor]
    Endpoint = 5,
    /// A Device Qualifier. USB2-specific.
    DeviceQualifier = 6,
    /// The "Other Speed Configuration" descriptor. USB2-specific.
    OtherSpeedConfiguration = 7,
    InterfacePower = 8,
    /// A Binary Device Object Store Descriptor.
    BinaryObjectStorage = 15,
    /// A Super Speed Endpoint Companion Descriptor. See [SuperSpeedCompanionDescriptor]
    SuperSpeedCompanion = 48,
}

impl DescriptorKind {
    pub fn from_value(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Device,
            2 => Self::Configuration,
            3 => Self::String,
            4 => Self::Interface,
            5 => Self::Endpoint,
            6 => Self::DeviceQualifier,
            7 => Self::OtherSpeedConfiguration,
            8 => Self::InterfacePower,
            15 => Self::BinaryObjectStorage,
            48 => Self::SuperSpeedCompanion,
            _ => return None,
        })
    }
}

/// Bus speed negotiated by the device controller.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum UsbSpeed {
    Low,
    Full,
    High,
    Super,
}

impl UsbSpeed {
    /// Largest bulk packet the speed allows (USB2 5.8.3, USB32 9.6.6).
    ///
    /// Low speed has no bulk endpoints; the smallest control packet size is returned for it.
    pub const fn bulk_max_packet_size(self) -> u16 {
        match self {
            Self::Low => 8,
            Self::Full => 64,
            Self::High => 512,
            Self::Super => 1024,
        }
    }

    /// `bMaxPacketSize0` to advertise at this speed.
    pub const fn ep0_max_packet_size(self) -> u8 {
        match self {
            Self::Low => 8,
            Self::Full | Self::High => 64,
            // Encoded as an exponent for SuperSpeed (2^9 = 512).
            Self::Super => 9,
        }
    }

    /// `bcdUSB` to advertise at this speed.
    pub const fn bcd_usb(self) -> u16 {
        match self {
            Self::Low | Self::Full | Self::High => 0x0200,
            Self::Super => 0x0320,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Full => "full",
            Self::High => "high",
            Self::Super => "super",
        }
    }
}

pub(crate) mod config;
pub(crate) mod device;
pub(crate) mod endpoint;
pub(crate) mod interface;
pub(crate) mod setup;
pub(crate) mod string;
