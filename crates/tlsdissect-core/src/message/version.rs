use std::fmt;

use serde::{Serialize, Serializer};

/// A 16-bit protocol version as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion(pub u16);

impl ProtocolVersion {
    pub const TLCP: Self = Self(0x0101);
    pub const SSL20: Self = Self(0x0200);
    pub const SSL30: Self = Self(0x0300);
    pub const TLS10: Self = Self(0x0301);
    pub const TLS11: Self = Self(0x0302);
    pub const TLS12: Self = Self(0x0303);
    pub const TLS13: Self = Self(0x0304);

    pub fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn lo(self) -> u8 {
        self.0 as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TLCP => "TLCP",
            Self::SSL20 => "SSL 2.0",
            Self::SSL30 => "SSL 3.0",
            Self::TLS10 => "TLS 1.0",
            Self::TLS11 => "TLS 1.1",
            Self::TLS12 => "TLS 1.2",
            Self::TLS13 => "TLS 1.3",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emit a version as its `[hi, lo]` byte pair rather than as an integer.
pub fn serialize_version_pair<S: Serializer>(
    version: &ProtocolVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    [version.hi(), version.lo()].serialize(serializer)
}

impl Serialize for ProtocolVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_version_pair(self, serializer)
    }
}

/// Compression method code. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CompressionMethod(pub u8);

impl CompressionMethod {
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "null",
            1 => "DEFLATE",
            64 => "LZS",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_names() {
        assert_eq!(ProtocolVersion(0x0303).to_string(), "TLS 1.2");
        assert_eq!(ProtocolVersion(0x0101).name(), "TLCP");
        assert_eq!(ProtocolVersion(0x7f1c).name(), "Unknown");
    }

    #[test]
    fn version_serializes_as_byte_pair() {
        let json = serde_json::to_string(&ProtocolVersion::TLS12).unwrap();
        assert_eq!(json, "[3,3]");
        let json = serde_json::to_string(&ProtocolVersion(0x0101)).unwrap();
        assert_eq!(json, "[1,1]");
    }

    #[test]
    fn compression_method_serializes_as_number() {
        assert_eq!(serde_json::to_string(&CompressionMethod(1)).unwrap(), "1");
        assert_eq!(CompressionMethod(0).name(), "null");
    }
}
