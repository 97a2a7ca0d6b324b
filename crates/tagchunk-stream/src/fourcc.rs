//! Four-character codes

use binrw::{BinRead, BinWrite};
use std::fmt;

/// A 4-byte tag naming a chunk or container type (`FORM`, `CcnK`, ...)
///
/// Tags compare by exact byte equality. No terminator is stored; use
/// [`FourCC::to_padded`] where a nul-terminated form is needed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BinRead, BinWrite)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create a tag from its four bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Raw tag bytes
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Tag with its byte order reversed (`FORM` <-> `MROF`)
    pub const fn reversed(self) -> Self {
        let [a, b, c, d] = self.0;
        Self([d, c, b, a])
    }

    /// Tag followed by a nul byte
    pub const fn to_padded(self) -> [u8; 5] {
        let [a, b, c, d] = self.0;
        [a, b, c, d, 0]
    }

    /// Create a tag from the first four bytes of `data`, if there are that many
    pub fn from_prefix(data: &[u8]) -> Option<Self> {
        data.get(..4)
            .and_then(|prefix| <[u8; 4]>::try_from(prefix).ok())
            .map(Self)
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl PartialEq<[u8; 4]> for FourCC {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02X}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{self}\")")
    }
}
