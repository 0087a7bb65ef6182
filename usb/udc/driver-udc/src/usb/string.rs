//! String descriptors (USB2 9.6.7).
//!
//! Unlike the other descriptors these are variable length, so they are kept as UTF-16 code
//! units and framed on serialization.

use super::DescriptorKind;

/// LANGID for English (United States).
pub const LANG_EN_US: u16 = 0x0409;

/// Most code units that fit behind a one-byte bLength.
const MAX_UNITS: usize = (u8::MAX as usize - 2) / 2;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StringDescriptor {
    /// UTF-16 code units, or LANGIDs for string zero.
    units: Vec<u16>,
}

impl StringDescriptor {
    /// String zero: the list of supported languages.
    pub fn languages(langs: &[u16]) -> Self {
        let mut units = langs.to_vec();
        units.truncate(MAX_UNITS);
        Self { units }
    }

    /// Encodes `s` as UTF-16, truncated to 126 code units.
    pub fn new(s: &str) -> Self {
        let mut units: Vec<u16> = s.encode_utf16().collect();
        units.truncate(MAX_UNITS);
        Self { units }
    }

    pub fn length(&self) -> u8 {
        (2 + self.units.len() * 2) as u8
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(usize::from(self.length()));
        bytes.push(self.length());
        bytes.push(DescriptorKind::String as u8);
        for unit in &self.units {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_table() {
        let desc = StringDescriptor::languages(&[LANG_EN_US]);
        assert_eq!(desc.to_bytes(), vec![4, 3, 0x09, 0x04]);
    }

    #[test]
    fn utf16_string() {
        let desc = StringDescriptor::new("Fb");
        assert_eq!(desc.to_bytes(), vec![6, 3, b'F', 0, b'b', 0]);
    }

    #[test]
    fn long_language_lists_are_truncated() {
        let langs = vec![LANG_EN_US; 200];
        let desc = StringDescriptor::languages(&langs);
        assert_eq!(desc.units().len(), 126);
        assert_eq!(desc.length(), 254);
        assert_eq!(desc.to_bytes().len(), 254);
    }

    #[test]
    fn long_strings_are_truncated() {
        let desc = StringDescriptor::new(&"x".repeat(300));
        assert_eq!(desc.length(), 254);
        assert_eq!(desc.to_bytes().len(), 254);
    }
}
