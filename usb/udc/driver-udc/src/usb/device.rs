//! Implements the "Device" USB Descriptor.
//!
//! This descriptor is described in USB32 section 9.6.1

use super::DescriptorKind;

/// A USB Device Descriptor.
///
/// "Provides information that applies globally to the device and all the device's
/// configurations" (USB32 9.6.1). A device has exactly one.
///
/// USB32 Table 9-11 describes the packet offsets of the fields described by this structure.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeviceDescriptor {
    /// bLength
    pub length: u8,
    /// bDescriptorType, always [DescriptorKind::Device]
    pub kind: u8,
    /// bcdUSB. USB 2.1 would be encoded as 210H, 3.2 would be 320H.
    pub usb: u16,
    /// bDeviceClass. Zero means every interface carries its own class information.
    pub class: u8,
    /// bDeviceSubClass
    pub sub_class: u8,
    /// bDeviceProtocol
    pub protocol: u8,
    /// bMaxPacketSize0
    pub packet_size: u8,
    /// idVendor
    pub vendor: u16,
    /// idProduct
    pub product: u16,
    /// bcdDevice
    pub release: u16,
    /// iManufacturer
    pub manufacturer_str: u8,
    /// iProduct
    pub product_str: u8,
    /// iSerialNumber
    pub serial_str: u8,
    /// bNumConfigurations
    pub configurations: u8,
}

unsafe impl plain::Plain for DeviceDescriptor {}

impl DeviceDescriptor {
    pub const LENGTH: u8 = 18;

    /// Builds a descriptor whose class triple is left to the interfaces.
    pub fn new(usb: u16, packet_size: u8, vendor: u16, product: u16, release: u16) -> Self {
        Self {
            length: Self::LENGTH,
            kind: DescriptorKind::Device as u8,
            usb,
            class: 0,
            sub_class: 0,
            protocol: 0,
            packet_size,
            vendor,
            product,
            release,
            manufacturer_str: 0,
            product_str: 0,
            serial_str: 0,
            configurations: 0,
        }
    }

    /// Gets the USB Minor Version
    pub fn minor_usb_vers(&self) -> u8 {
        (self.usb & 0xFF) as u8
    }

    /// Gets the USB Major Version
    pub fn major_usb_vers(&self) -> u8 {
        ((self.usb >> 8) & 0xFF) as u8
    }

    pub fn to_bytes(&self) -> [u8; 18] {
        let usb = self.usb.to_le_bytes();
        let vendor = self.vendor.to_le_bytes();
        let product = self.product.to_le_bytes();
        let release = self.release.to_le_bytes();
        [
            self.length,
            self.kind,
            usb[0],
            usb[1],
            self.class,
            self.sub_class,
            self.protocol,
            self.packet_size,
            vendor[0],
            vendor[1],
            product[0],
            product[1],
            release[0],
            release[1],
            self.manufacturer_str,
            self.product_str,
            self.serial_str,
            self.configurations,
        ]
    }
}
