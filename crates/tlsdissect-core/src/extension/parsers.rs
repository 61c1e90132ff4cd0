//! Per-type extension payload parsers.
//!
//! Each parser receives exactly the extension's payload and must consume all
//! of it. Failures are attributed to the extension by the caller.

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::message::version::ProtocolVersion;

use super::{
    AlpnData, EcPointFormatsData, ExtensionPayload, SctData, ServerNameData,
    SignatureAlgorithmsData, SupportedGroupsData, SupportedVersionsData,
};

const NAME_TYPE_HOST_NAME: u8 = 0;

/// server_name (RFC 6066 §3). The first `host_name` entry wins; other name
/// types are skipped. An empty payload is the ServerHello acknowledgement.
pub fn parse_server_name(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let mut data = ServerNameData::default();
    if payload.is_empty() {
        return Ok(ExtensionPayload::ServerName(data));
    }

    let mut list = payload.read_u16_prefixed()?;
    while !list.is_empty() {
        let name_type = list.read_u8()?;
        let name = list.read_u16_prefixed()?.rest();
        if name_type != NAME_TYPE_HOST_NAME || data.host_name.is_some() {
            continue;
        }
        let host = std::str::from_utf8(name)
            .map_err(|_| DecodeError::malformed("server_name", "host name is not UTF-8"))?;
        data.host_name = Some(host.to_string());
    }
    payload.finish("server_name list")?;

    Ok(ExtensionPayload::ServerName(data))
}

pub fn parse_supported_groups(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let groups = read_u16_list(payload.read_u16_prefixed()?, "supported_groups")?;
    payload.finish("supported_groups list")?;
    Ok(ExtensionPayload::SupportedGroups(SupportedGroupsData { groups }))
}

pub fn parse_ec_point_formats(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let formats = payload.read_u8_prefixed()?.rest().to_vec();
    payload.finish("ec_point_formats list")?;
    Ok(ExtensionPayload::EcPointFormats(EcPointFormatsData { formats }))
}

/// signature_algorithms and signature_algorithms_cert share this layout.
pub fn parse_signature_algorithms(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let algorithms = read_u16_list(payload.read_u16_prefixed()?, "signature_algorithms")?;
    payload.finish("signature algorithm list")?;
    Ok(ExtensionPayload::SignatureAlgorithms(
        SignatureAlgorithmsData { algorithms },
    ))
}

/// application_layer_protocol_negotiation (RFC 7301).
pub fn parse_alpn(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let mut list = payload.read_u16_prefixed()?;
    let mut protocols = Vec::new();
    while !list.is_empty() {
        let name = list.read_u8_prefixed()?.rest();
        let name = std::str::from_utf8(name).map_err(|_| {
            DecodeError::malformed(
                "application_layer_protocol_negotiation",
                "protocol name is not UTF-8",
            )
        })?;
        protocols.push(name.to_string());
    }
    payload.finish("protocol name list")?;
    Ok(ExtensionPayload::Alpn(AlpnData { protocols }))
}

/// signed_certificate_timestamp: only its presence matters.
pub fn parse_sct(_payload: Cursor<'_>) -> Result<ExtensionPayload> {
    Ok(ExtensionPayload::SignedCertificateTimestamp(SctData {}))
}

/// supported_versions as sent by a client: a u8-prefixed version list.
pub fn parse_supported_versions(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let versions = read_u16_list(payload.read_u8_prefixed()?, "supported_versions")?
        .into_iter()
        .map(ProtocolVersion)
        .collect();
    payload.finish("supported_versions list")?;
    Ok(ExtensionPayload::SupportedVersions(SupportedVersionsData {
        versions,
    }))
}

/// supported_versions as sent by a server: the one selected version.
pub fn parse_selected_version(mut payload: Cursor<'_>) -> Result<ExtensionPayload> {
    let version = ProtocolVersion(payload.read_u16()?);
    payload.finish("selected version")?;
    Ok(ExtensionPayload::SupportedVersions(SupportedVersionsData {
        versions: vec![version],
    }))
}

/// Fallback for every type without a dedicated parser. Never fails.
pub fn parse_unknown(payload: Cursor<'_>) -> Result<ExtensionPayload> {
    Ok(ExtensionPayload::Unknown(payload.rest().into()))
}

fn read_u16_list(mut list: Cursor<'_>, field: &'static str) -> Result<Vec<u16>> {
    if list.remaining() % 2 != 0 {
        return Err(DecodeError::malformed(
            field,
            format!("odd list length {}", list.remaining()),
        ));
    }
    let mut out = Vec::with_capacity(list.remaining() / 2);
    while !list.is_empty() {
        out.push(list.read_u16()?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sni_payload(entries: &[(u8, &[u8])]) -> Vec<u8> {
        let mut list = Vec::new();
        for (name_type, name) in entries {
            list.push(*name_type);
            list.extend_from_slice(&(name.len() as u16).to_be_bytes());
            list.extend_from_slice(name);
        }
        let mut out = (list.len() as u16).to_be_bytes().to_vec();
        out.extend(list);
        out
    }

    #[test]
    fn server_name_surfaces_host_name() {
        let payload = sni_payload(&[(0, b"example.com")]);
        let parsed = parse_server_name(Cursor::new(&payload)).unwrap();
        assert_eq!(
            parsed,
            ExtensionPayload::ServerName(ServerNameData {
                host_name: Some("example.com".into())
            })
        );
    }

    #[test]
    fn server_name_skips_other_name_types() {
        let payload = sni_payload(&[(7, b"opaque"), (0, b"first.test"), (0, b"second.test")]);
        match parse_server_name(Cursor::new(&payload)).unwrap() {
            ExtensionPayload::ServerName(d) => assert_eq!(d.host_name.as_deref(), Some("first.test")),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn server_name_empty_payload_is_acknowledgement() {
        let parsed = parse_server_name(Cursor::new(&[])).unwrap();
        assert_eq!(parsed, ExtensionPayload::ServerName(ServerNameData::default()));
    }

    #[test]
    fn server_name_list_shorter_than_payload_fails() {
        let mut payload = sni_payload(&[(0, b"a.b")]);
        payload.push(0x00);
        let err = parse_server_name(Cursor::new(&payload)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingData);
    }

    #[test]
    fn server_name_rejects_invalid_utf8() {
        let payload = sni_payload(&[(0, &[0xff, 0xfe])]);
        let err = parse_server_name(Cursor::new(&payload)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSubfield);
    }

    #[test]
    fn alpn_keeps_protocol_order() {
        let payload = [
            0x00, 0x0c, 0x02, b'h', b'2', 0x08, b'h', b't', b't', b'p', b'/', b'1', b'.', b'1',
        ];
        let parsed = parse_alpn(Cursor::new(&payload)).unwrap();
        assert_eq!(
            parsed,
            ExtensionPayload::Alpn(AlpnData {
                protocols: vec!["h2".into(), "http/1.1".into()]
            })
        );
    }

    #[test]
    fn alpn_protocol_overrunning_list_fails() {
        let payload = [0x00, 0x03, 0x05, b'h', b'2'];
        assert_eq!(
            parse_alpn(Cursor::new(&payload)).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn supported_groups_and_point_formats() {
        let groups = [0x00, 0x06, 0x00, 0x1d, 0x00, 0x17, 0x4a, 0x4a];
        assert_eq!(
            parse_supported_groups(Cursor::new(&groups)).unwrap(),
            ExtensionPayload::SupportedGroups(SupportedGroupsData {
                groups: vec![0x001d, 0x0017, 0x4a4a]
            })
        );
        let formats = [0x02, 0x00, 0x01];
        assert_eq!(
            parse_ec_point_formats(Cursor::new(&formats)).unwrap(),
            ExtensionPayload::EcPointFormats(EcPointFormatsData {
                formats: vec![0, 1]
            })
        );
    }

    #[test]
    fn supported_versions_client_and_server_forms() {
        let client = [0x04, 0x03, 0x04, 0x03, 0x03];
        assert_eq!(
            parse_supported_versions(Cursor::new(&client)).unwrap(),
            ExtensionPayload::SupportedVersions(SupportedVersionsData {
                versions: vec![ProtocolVersion::TLS13, ProtocolVersion::TLS12]
            })
        );
        let server = [0x03, 0x04];
        assert_eq!(
            parse_selected_version(Cursor::new(&server)).unwrap(),
            ExtensionPayload::SupportedVersions(SupportedVersionsData {
                versions: vec![ProtocolVersion::TLS13]
            })
        );
    }

    #[test]
    fn two_byte_client_version_list_is_not_a_selected_version() {
        // u8 length 1 is odd, so this is a broken list, not version 0x0103.
        let err = parse_supported_versions(Cursor::new(&[0x01, 0x03])).unwrap_err();
        match err {
            DecodeError::MalformedSubfield { field, .. } => assert_eq!(field, "supported_versions"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            parse_selected_version(Cursor::new(&[0x03, 0x04, 0x00])).unwrap_err().kind(),
            ErrorKind::TrailingData
        );
    }

    #[test]
    fn alpn_rejects_invalid_utf8() {
        let payload = [0x00, 0x03, 0x02, 0xc3, 0x28];
        let err = parse_alpn(Cursor::new(&payload)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSubfield);
    }

    #[test]
    fn sct_accepts_any_payload() {
        assert_eq!(
            parse_sct(Cursor::new(&[0x00, 0x01, 0xff])).unwrap(),
            ExtensionPayload::SignedCertificateTimestamp(SctData {})
        );
    }
}
