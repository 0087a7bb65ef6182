use super::DescriptorKind;

bitflags! {
    /// bmAttributes of a configuration (USB2 Table 9-10).
    pub struct ConfigAttributes: u8 {
        /// Bit 7 is reserved and must always be set.
        const RESERVED = 1 << 7;
        const SELF_POWERED = 1 << 6;
        const REMOTE_WAKEUP = 1 << 5;
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConfigDescriptor {
    pub length: u8,
    pub kind: u8,
    /// Length of the configuration and everything nested under it.
    pub total_length: u16,
    pub interfaces: u8,
    pub configuration_value: u8,
    pub configuration_str: u8,
    pub attributes: u8,
    /// In units of 2 mA.
    pub max_power: u8,
}

unsafe impl plain::Plain for ConfigDescriptor {}

impl ConfigDescriptor {
    pub const LENGTH: u8 = 9;

    pub fn new(configuration_value: u8, attributes: ConfigAttributes, max_power: u8) -> Self {
        Self {
            length: Self::LENGTH,
            kind: DescriptorKind::Configuration as u8,
            total_length: u16::from(Self::LENGTH),
            interfaces: 0,
            configuration_value,
            configuration_str: 0,
            attributes: (attributes | ConfigAttributes::RESERVED).bits(),
            max_power,
        }
    }

    pub fn attributes(&self) -> ConfigAttributes {
        ConfigAttributes::from_bits_truncate(self.attributes)
    }

    pub fn to_bytes(&self) -> [u8; 9] {
        let total_length = self.total_length.to_le_bytes();
        [
            self.length,
            self.kind,
            total_length[0],
            total_length[1],
            self.interfaces,
            self.configuration_value,
            self.configuration_str,
            self.attributes,
            self.max_power,
        ]
    }
}
