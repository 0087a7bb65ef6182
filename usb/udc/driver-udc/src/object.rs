//! The descriptor graph a gadget binds to a controller.
//!
//! The controller walks it to answer GET_DESCRIPTOR and to look up endpoints when transfers
//! are queued.

use crate::usb::{
    ConfigDescriptor, DescriptorKind, DeviceDescriptor, EndpointDescriptor, InterfaceDescriptor,
    StringDescriptor, SuperSpeedCompanionDescriptor,
};

#[derive(Clone, Debug)]
pub struct EndpointObject {
    pub desc: EndpointDescriptor,
    pub companion: Option<SuperSpeedCompanionDescriptor>,
}

#[derive(Clone, Debug)]
pub struct InterfaceObject {
    pub desc: InterfaceDescriptor,
    pub endpoints: Vec<EndpointObject>,
}

#[derive(Clone, Debug)]
pub struct ConfigObject {
    pub desc: ConfigDescriptor,
    pub interfaces: Vec<InterfaceObject>,
}

#[derive(Clone, Debug)]
pub struct DeviceObject {
    pub device: DeviceDescriptor,
    /// Indexed by string descriptor index; entry zero holds the LANGIDs.
    pub strings: Vec<StringDescriptor>,
    pub configs: Vec<ConfigObject>,
}

impl ConfigObject {
    /// Sum of the lengths of this configuration and every descriptor nested under it.
    pub fn total_length(&self) -> u16 {
        let nested: u16 = self
            .interfaces
            .iter()
            .map(|interface| {
                u16::from(interface.desc.length)
                    + interface
                        .endpoints
                        .iter()
                        .map(|ep| {
                            u16::from(ep.desc.length)
                                + ep.companion.map_or(0, |c| u16::from(c.length))
                        })
                        .sum::<u16>()
            })
            .sum();
        u16::from(self.desc.length) + nested
    }

    /// The blob returned for GET_DESCRIPTOR(Configuration): the configuration descriptor
    /// followed, for each interface, by the interface and then its endpoints.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(usize::from(self.total_length()));
        bytes.extend_from_slice(&self.desc.to_bytes());
        for interface in &self.interfaces {
            bytes.extend_from_slice(&interface.desc.to_bytes());
            for ep in &interface.endpoints {
                bytes.extend_from_slice(&ep.desc.to_bytes());
                if let Some(companion) = ep.companion {
                    bytes.extend_from_slice(&companion.to_bytes());
                }
            }
        }
        bytes
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointObject> {
        self.interfaces
            .iter()
            .flat_map(|interface| interface.endpoints.iter())
    }
}

impl DeviceObject {
    pub fn config_by_value(&self, value: u8) -> Option<&ConfigObject> {
        self.configs
            .iter()
            .find(|config| config.desc.configuration_value == value)
    }

    /// Looks up an endpoint by its address (number and direction bit) in any configuration.
    pub fn endpoint(&self, address: u8) -> Option<&EndpointDescriptor> {
        self.configs
            .iter()
            .flat_map(ConfigObject::endpoints)
            .map(|ep| &ep.desc)
            .find(|desc| desc.address == address)
    }

    pub fn string(&self, index: u8) -> Option<&StringDescriptor> {
        self.strings.get(usize::from(index))
    }

    /// Answers a standard GET_DESCRIPTOR request.
    pub fn get_descriptor(&self, kind: u8, index: u8) -> Option<Vec<u8>> {
        match DescriptorKind::from_value(kind)? {
            DescriptorKind::Device => Some(self.device.to_bytes().to_vec()),
            DescriptorKind::Configuration => self
                .configs
                .get(usize::from(index))
                .map(ConfigObject::to_bytes),
            DescriptorKind::String => self.string(index).map(StringDescriptor::to_bytes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usb::{ConfigAttributes, EndpDirection, EndpointTy, LANG_EN_US};

    fn device() -> DeviceObject {
        let mut config = ConfigDescriptor::new(3, ConfigAttributes::empty(), 50);
        config.interfaces = 1;
        let mut interface = InterfaceDescriptor::new(0, 0xFF, 0, 0);
        interface.endpoints = 1;
        let ep = EndpointDescriptor::new(1, EndpDirection::In, EndpointTy::Bulk, 64);
        let mut config = ConfigObject {
            desc: config,
            interfaces: vec![InterfaceObject {
                desc: interface,
                endpoints: vec![EndpointObject {
                    desc: ep,
                    companion: None,
                }],
            }],
        };
        config.desc.total_length = config.total_length();

        let mut device = DeviceDescriptor::new(0x0200, 64, 1, 2, 3);
        device.configurations = 1;
        DeviceObject {
            device,
            strings: vec![
                StringDescriptor::languages(&[LANG_EN_US]),
                StringDescriptor::new("a"),
            ],
            configs: vec![config],
        }
    }

    #[test]
    fn walk_graph() {
        let device = device();

        assert!(device.config_by_value(3).is_some());
        assert!(device.config_by_value(1).is_none());
        assert!(device.endpoint(0x81).is_some());
        assert!(device.endpoint(0x01).is_none());
        assert_eq!(device.configs[0].total_length(), 25);
    }

    #[test]
    fn get_descriptor() {
        let device = device();

        let config = device
            .get_descriptor(DescriptorKind::Configuration as u8, 0)
            .unwrap();
        assert_eq!(config.len(), 25);
        assert_eq!(&config[2..4], &[25, 0]);
        assert_eq!(
            device.get_descriptor(DescriptorKind::Device as u8, 0).unwrap().len(),
            18
        );
        assert_eq!(
            device.get_descriptor(DescriptorKind::String as u8, 1),
            Some(vec![4, 3, b'a', 0])
        );
        assert_eq!(device.get_descriptor(DescriptorKind::String as u8, 9), None);
        assert_eq!(device.get_descriptor(DescriptorKind::Endpoint as u8, 0), None);
    }
}
