//! Hello extensions: the typed payload variants and the block decoder shared
//! by ClientHello and ServerHello.

pub mod parsers;

use serde::Serialize;

use crate::bytes::RawBytes;
use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::message::version::ProtocolVersion;
use crate::registry::extensions::{lookup_extension, payload_parser};

pub const SERVER_NAME: u16 = 0x0000;
pub const SUPPORTED_GROUPS: u16 = 0x000a;
pub const EC_POINT_FORMATS: u16 = 0x000b;
pub const SIGNATURE_ALGORITHMS: u16 = 0x000d;
pub const ALPN: u16 = 0x0010;
pub const SIGNED_CERTIFICATE_TIMESTAMP: u16 = 0x0012;
pub const SUPPORTED_VERSIONS: u16 = 0x002b;

/// Which hello message an extension block belongs to. A few extensions
/// (supported_versions) have a different layout in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelloOrigin {
    Client,
    Server,
}

/// One decoded extension, in the order it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    #[serde(rename = "type")]
    pub ext_type: u16,
    pub name: &'static str,
    pub grease: bool,
    pub private: bool,
    pub payload: ExtensionPayload,
}

/// Extension payload; which variant appears is fixed by the extension type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtensionPayload {
    ServerName(ServerNameData),
    SupportedGroups(SupportedGroupsData),
    EcPointFormats(EcPointFormatsData),
    SignatureAlgorithms(SignatureAlgorithmsData),
    Alpn(AlpnData),
    SignedCertificateTimestamp(SctData),
    SupportedVersions(SupportedVersionsData),
    Unknown(RawBytes),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerNameData {
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportedGroupsData {
    pub groups: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EcPointFormatsData {
    pub formats: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignatureAlgorithmsData {
    pub algorithms: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlpnData {
    pub protocols: Vec<String>,
}

/// Presence marker; the timestamps themselves are not interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SctData {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportedVersionsData {
    pub versions: Vec<ProtocolVersion>,
}

/// Facts lifted out of the extensions for quick access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HelloSummary {
    pub server_name: Option<String>,
    pub scts: bool,
    pub protocols: Vec<String>,
}

impl HelloSummary {
    fn observe(&mut self, payload: &ExtensionPayload) {
        match payload {
            ExtensionPayload::ServerName(data) => {
                if let Some(name) = &data.host_name {
                    self.server_name = Some(name.clone());
                }
            }
            ExtensionPayload::Alpn(data) => self.protocols = data.protocols.clone(),
            ExtensionPayload::SignedCertificateTimestamp(_) => self.scts = true,
            _ => {}
        }
    }
}

/// Decode `{u16 type, u16-prefixed payload}` pairs until `block` is used up.
pub fn decode_extension_block(
    mut block: Cursor<'_>,
    origin: HelloOrigin,
) -> Result<(Vec<Extension>, HelloSummary)> {
    let mut extensions = Vec::new();
    let mut summary = HelloSummary::default();

    while !block.is_empty() {
        let (ext_type, data) = read_extension_header(&mut block)?;
        let descriptor = lookup_extension(ext_type);
        let payload = payload_parser(ext_type, origin)(data).map_err(|e| e.within(descriptor.name))?;

        summary.observe(&payload);
        extensions.push(Extension {
            ext_type,
            name: descriptor.name,
            grease: descriptor.grease,
            private: descriptor.private,
            payload,
        });
    }

    Ok((extensions, summary))
}

fn read_extension_header<'a>(block: &mut Cursor<'a>) -> Result<(u16, Cursor<'a>)> {
    let ext_type = block.read_u16()?;
    let data = block.read_u16_prefixed()?;
    Ok((ext_type, data))
}

/// Read the optional trailing extensions field of a hello message.
///
/// An exhausted `msg` means the field is absent, which is valid. A single
/// leftover byte cannot start the field, so it is trailing data.
pub(crate) fn decode_optional_extensions(
    msg: &mut Cursor<'_>,
    origin: HelloOrigin,
) -> Result<(Vec<Extension>, HelloSummary)> {
    match msg.remaining() {
        0 => return Ok((Vec::new(), HelloSummary::default())),
        1 => {
            return Err(DecodeError::TrailingData {
                context: "extensions",
                remaining: 1,
            })
        }
        _ => {}
    }
    let block = msg.read_u16_prefixed()?;
    decode_extension_block(block, origin).map_err(|e| e.within("extensions"))
}
