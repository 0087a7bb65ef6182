use plain::Plain;

use super::DescriptorKind;

/// The descriptor for a USB Endpoint.
///
/// Each endpoint of an interface has its own descriptor. The host uses it to work out the
/// bandwidth requirements of the endpoint. It is only ever returned as part of the
/// configuration it belongs to.
///
/// See USB32 9.6.6, offsets in USB32 Table 9-26
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EndpointDescriptor {
    pub length: u8,
    pub kind: u8,
    /// Endpoint number in bits 3:0, direction in bit 7.
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    /// Polling interval. Unused for bulk endpoints.
    pub interval: u8,
}

/// Mask that is ANDed to the [EndpointDescriptor].attributes buffer to get the endpoint type.
pub const ENDP_ATTR_TY_MASK: u8 = 0x3;
/// Direction bit of [EndpointDescriptor].address, set for IN (device-to-host) endpoints.
pub const ENDP_ADDR_DIR_IN: u8 = 1 << 7;
pub const ENDP_ADDR_NUM_MASK: u8 = 0x0F;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EndpointTy {
    Ctrl = 0,
    Isoch = 1,
    Bulk = 2,
    Interrupt = 3,
}

/// Direction of an endpoint, from the host's point of view.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EndpDirection {
    /// Host-to-device.
    Out,
    /// Device-to-host.
    In,
}

impl EndpDirection {
    pub fn from_address(address: u8) -> Self {
        if address & ENDP_ADDR_DIR_IN == 0 {
            Self::Out
        } else {
            Self::In
        }
    }
}

impl EndpointDescriptor {
    pub const LENGTH: u8 = 7;

    pub fn new(number: u8, direction: EndpDirection, ty: EndpointTy, max_packet_size: u16) -> Self {
        let dir_bit = match direction {
            EndpDirection::In => ENDP_ADDR_DIR_IN,
            EndpDirection::Out => 0,
        };
        Self {
            length: Self::LENGTH,
            kind: DescriptorKind::Endpoint as u8,
            address: (number & ENDP_ADDR_NUM_MASK) | dir_bit,
            attributes: ty as u8,
            max_packet_size,
            interval: 0,
        }
    }

    pub fn ty(&self) -> EndpointTy {
        match self.attributes & ENDP_ATTR_TY_MASK {
            0 => EndpointTy::Ctrl,
            1 => EndpointTy::Isoch,
            2 => EndpointTy::Bulk,
            3 => EndpointTy::Interrupt,
            _ => unreachable!(),
        }
    }

    pub fn number(&self) -> u8 {
        self.address & ENDP_ADDR_NUM_MASK
    }

    pub fn direction(&self) -> EndpDirection {
        EndpDirection::from_address(self.address)
    }

    /// wMaxPacketSize without the high-bandwidth multiplier bits.
    pub fn max_packet_size(&self) -> u16 {
        self.max_packet_size & 0x07FF
    }

    pub fn to_bytes(&self) -> [u8; 7] {
        let max_packet_size = self.max_packet_size.to_le_bytes();
        [
            self.length,
            self.kind,
            self.address,
            self.attributes,
            max_packet_size[0],
            max_packet_size[1],
            self.interval,
        ]
    }
}

unsafe impl Plain for EndpointDescriptor {}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SuperSpeedCompanionDescriptor {
    pub length: u8,
    pub kind: u8,
    pub max_burst: u8,
    pub attributes: u8,
    pub bytes_per_interval: u16,
}
unsafe impl Plain for SuperSpeedCompanionDescriptor {}

impl SuperSpeedCompanionDescriptor {
    pub const LENGTH: u8 = 6;

    pub fn to_bytes(&self) -> [u8; 6] {
        let bytes_per_interval = self.bytes_per_interval.to_le_bytes();
        [
            self.length,
            self.kind,
            self.max_burst,
            self.attributes,
            bytes_per_interval[0],
            bytes_per_interval[1],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem;

    #[test]
    fn endpoint_descriptor_size() {
        assert_eq!(mem::size_of::<EndpointDescriptor>(), 7);
        assert_eq!(mem::size_of::<SuperSpeedCompanionDescriptor>(), 6);
    }

    #[test]
    fn address_carries_number_and_direction() {
        let ep_in = EndpointDescriptor::new(1, EndpDirection::In, EndpointTy::Bulk, 512);
        let ep_out = EndpointDescriptor::new(2, EndpDirection::Out, EndpointTy::Bulk, 512);

        assert_eq!(ep_in.to_bytes(), [7, 5, 0x81, 0x02, 0x00, 0x02, 0x00]);
        assert_eq!(ep_out.to_bytes(), [7, 5, 0x02, 0x02, 0x00, 0x02, 0x00]);
        assert_eq!(ep_in.direction(), EndpDirection::In);
        assert_eq!(ep_out.direction(), EndpDirection::Out);
        assert_eq!(ep_out.number(), 2);
        assert_eq!(ep_out.ty(), EndpointTy::Bulk);
    }
}
