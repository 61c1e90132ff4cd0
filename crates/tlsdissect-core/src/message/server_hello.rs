use serde::Serialize;

use crate::bytes::{as_hex, RawBytes};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::extension::{decode_optional_extensions, Extension, HelloOrigin, HelloSummary};
use crate::registry::cipher_suites::CipherSuite;

use super::read_hello_prefix;
use super::version::{CompressionMethod, ProtocolVersion};

/// A decoded ServerHello. Unlike the ClientHello it names a single cipher
/// suite and compression method, and carries no fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerHelloInfo {
    pub version: ProtocolVersion,
    #[serde(serialize_with = "as_hex")]
    pub random: [u8; 32],
    pub session_id: RawBytes,
    pub cipher_suite: CipherSuite,
    pub compression_method: CompressionMethod,
    pub extensions: Vec<Extension>,
    pub info: HelloSummary,
}

pub fn decode_server_hello(body: &[u8]) -> Result<ServerHelloInfo> {
    let mut msg = Cursor::new(body);
    let prefix = read_hello_prefix(&mut msg)?;
    let cipher_suite = CipherSuite::from_code(msg.read_u16()?);
    let compression_method = CompressionMethod(msg.read_u8()?);

    let (extensions, info) = decode_optional_extensions(&mut msg, HelloOrigin::Server)?;
    msg.finish("ServerHello")?;

    Ok(ServerHelloInfo {
        version: prefix.version,
        random: prefix.random,
        session_id: prefix.session_id.into(),
        cipher_suite,
        compression_method,
        extensions,
        info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::extension::{ExtensionPayload, SupportedVersionsData};

    fn server_hello(extensions: Option<&[u8]>) -> Vec<u8> {
        let mut out = vec![0x03, 0x03];
        out.extend((0..32u8).map(|i| i ^ 0x5a));
        out.push(4);
        out.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        out.extend_from_slice(&[0xc0, 0x2f]);
        out.push(0x00);
        if let Some(block) = extensions {
            out.extend_from_slice(&(block.len() as u16).to_be_bytes());
            out.extend_from_slice(block);
        }
        out
    }

    #[test]
    fn decodes_single_suite_and_method() {
        let info = decode_server_hello(&server_hello(None)).unwrap();
        assert_eq!(info.version, ProtocolVersion::TLS12);
        assert_eq!(info.random[0], 0x5a);
        assert_eq!(&info.session_id[..], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(info.cipher_suite.code, 0xc02f);
        assert_eq!(info.cipher_suite.name, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256");
        assert_eq!(info.compression_method, CompressionMethod(0));
        assert!(info.extensions.is_empty());
    }

    #[test]
    fn decodes_tls13_style_extensions() {
        let block = [
            0x00, 0x2b, 0x00, 0x02, 0x03, 0x04, // supported_versions: TLS 1.3
            0x00, 0x00, 0x00, 0x00, // empty server_name ack
            0x00, 0x12, 0x00, 0x00, // signed_certificate_timestamp
            0x00, 0x10, 0x00, 0x05, 0x00, 0x03, 0x02, b'h', b'2', // ALPN
        ];
        let info = decode_server_hello(&server_hello(Some(&block))).unwrap();
        assert_eq!(info.extensions.len(), 4);
        assert_eq!(
            info.extensions[0].payload,
            ExtensionPayload::SupportedVersions(SupportedVersionsData {
                versions: vec![ProtocolVersion::TLS13]
            })
        );
        assert_eq!(info.info.server_name, None);
        assert!(info.info.scts);
        assert_eq!(info.info.protocols, vec!["h2".to_string()]);
    }

    #[test]
    fn rejects_trailing_and_truncated_input() {
        let mut body = server_hello(None);
        body.push(0x01);
        assert_eq!(
            decode_server_hello(&body).unwrap_err().kind(),
            ErrorKind::TrailingData
        );

        let mut body = server_hello(Some(&[]));
        body.push(0xff);
        assert_eq!(
            decode_server_hello(&body).unwrap_err().kind(),
            ErrorKind::TrailingData
        );

        let body = server_hello(None);
        assert_eq!(
            decode_server_hello(&body[..body.len() - 1]).unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }
}
