use super::DescriptorKind;

/// A control request as received in the setup stage (USB2 Table 9-2).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Setup {
    pub kind: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

unsafe impl plain::Plain for Setup {}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqDirection {
    HostToDevice = 0,
    DeviceToHost = 1,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReqType {
    /// Standard device requests, such as SET_ADDRESS and SET_CONFIGURATION. These are answered
    /// by the device controller itself.
    Standard = 0,

    /// Class specific requests, forwarded to the gadget.
    Class = 1,

    /// Vendor specific requests, forwarded to the gadget.
    Vendor = 2,

    /// Reserved
    Reserved = 3,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetupReq {
    GetStatus = 0x00,
    ClearFeature = 0x01,
    SetFeature = 0x03,
    SetAddress = 0x05,
    GetDescriptor = 0x06,
    SetDescriptor = 0x07,
    GetConfiguration = 0x08,
    SetConfiguration = 0x09,
    GetInterface = 0x0A,
    SetInterface = 0x0B,
    SynchFrame = 0x0C,
}

impl SetupReq {
    pub fn from_value(value: u8) -> Option<Self> {
        Some(match value {
            0x00 => Self::GetStatus,
            0x01 => Self::ClearFeature,
            0x03 => Self::SetFeature,
            0x05 => Self::SetAddress,
            0x06 => Self::GetDescriptor,
            0x07 => Self::SetDescriptor,
            0x08 => Self::GetConfiguration,
            0x09 => Self::SetConfiguration,
            0x0A => Self::GetInterface,
            0x0B => Self::SetInterface,
            0x0C => Self::SynchFrame,
            _ => return None,
        })
    }
}

pub const USB_SETUP_DIR_BIT: u8 = 1 << 7;
pub const USB_SETUP_REQ_TY_MASK: u8 = 0x60;
pub const USB_SETUP_REQ_TY_SHIFT: u8 = 5;
pub const USB_SETUP_RECIPIENT_MASK: u8 = 0x1F;

impl Setup {
    pub const LENGTH: usize = 8;

    /// Decodes the 8 bytes of a setup stage.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw = plain::from_bytes::<Setup>(bytes.get(..Self::LENGTH)?).ok()?;
        Some(Self {
            kind: raw.kind,
            request: raw.request,
            value: u16::from_le(raw.value),
            index: u16::from_le(raw.index),
            length: u16::from_le(raw.length),
        })
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let value = self.value.to_le_bytes();
        let index = self.index.to_le_bytes();
        let length = self.length.to_le_bytes();
        [
            self.kind,
            self.request,
            value[0],
            value[1],
            index[0],
            index[1],
            length[0],
            length[1],
        ]
    }

    pub fn direction(&self) -> ReqDirection {
        if self.kind & USB_SETUP_DIR_BIT == 0 {
            ReqDirection::HostToDevice
        } else {
            ReqDirection::DeviceToHost
        }
    }

    pub const fn req_ty(&self) -> u8 {
        (self.kind & USB_SETUP_REQ_TY_MASK) >> USB_SETUP_REQ_TY_SHIFT
    }

    pub const fn req_recipient(&self) -> u8 {
        self.kind & USB_SETUP_RECIPIENT_MASK
    }

    pub fn is_standard(&self) -> bool {
        self.req_ty() == ReqType::Standard as u8
    }

    /// The standard request this is, if it is one.
    pub fn standard_request(&self) -> Option<SetupReq> {
        if self.is_standard() {
            SetupReq::from_value(self.request)
        } else {
            None
        }
    }

    /// Descriptor type and index of a GET_DESCRIPTOR request.
    pub fn descriptor_kind_and_index(&self) -> (u8, u8) {
        let value = self.value;
        ((value >> 8) as u8, (value & 0xFF) as u8)
    }

    pub const fn get_status() -> Self {
        Self {
            kind: 0b1000_0000,
            request: SetupReq::GetStatus as u8,
            value: 0,
            index: 0,
            length: 2,
        }
    }

    pub const fn set_address(address: u16) -> Self {
        Self {
            kind: 0b0000_0000,
            request: SetupReq::SetAddress as u8,
            value: address,
            index: 0,
            length: 0,
        }
    }

    pub const fn get_descriptor(
        kind: DescriptorKind,
        index: u8,
        language: u16,
        length: u16,
    ) -> Self {
        Self {
            kind: 0b1000_0000,
            request: SetupReq::GetDescriptor as u8,
            value: ((kind as u16) << 8) | (index as u16),
            index: language,
            length,
        }
    }

    pub const fn get_configuration() -> Self {
        Self {
            kind: 0b1000_0000,
            request: SetupReq::GetConfiguration as u8,
            value: 0,
            index: 0,
            length: 1,
        }
    }

    pub const fn set_configuration(value: u8) -> Self {
        Self {
            kind: 0b0000_0000,
            request: SetupReq::SetConfiguration as u8,
            value: value as u16,
            index: 0,
            length: 0,
        }
    }

    pub const fn set_interface(interface: u8, alternate_setting: u8) -> Self {
        Self {
            kind: 0b0000_0001,
            request: SetupReq::SetInterface as u8,
            value: alternate_setting as u16,
            index: interface as u16,
            length: 0,
        }
    }

    /// A vendor request addressed to an interface.
    pub const fn vendor(direction: ReqDirection, request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            kind: ((direction as u8) << 7) | ((ReqType::Vendor as u8) << USB_SETUP_REQ_TY_SHIFT) | 0x01,
            request,
            value,
            index,
            length,
        }
    }
}
