use plain::Plain;

use super::DescriptorKind;

/// bInterfaceClass value for vendor-specific interfaces.
pub const VENDOR_SPECIFIC_CLASS: u8 = 0xFF;

/// USB2 Table 9-12
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InterfaceDescriptor {
    pub length: u8,
    pub kind: u8,
    pub number: u8,
    pub alternate_setting: u8,
    pub endpoints: u8,
    pub class: u8,
    pub sub_class: u8,
    pub protocol: u8,
    pub interface_str: u8,
}

unsafe impl Plain for InterfaceDescriptor {}

impl InterfaceDescriptor {
    pub const LENGTH: u8 = 9;

    pub fn new(number: u8, class: u8, sub_class: u8, protocol: u8) -> Self {
        Self {
            length: Self::LENGTH,
            kind: DescriptorKind::Interface as u8,
            number,
            alternate_setting: 0,
            endpoints: 0,
            class,
            sub_class,
            protocol,
            interface_str: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; 9] {
        [
            self.length,
            self.kind,
            self.number,
            self.alternate_setting,
            self.endpoints,
            self.class,
            self.sub_class,
            self.protocol,
            self.interface_str,
        ]
    }
}
