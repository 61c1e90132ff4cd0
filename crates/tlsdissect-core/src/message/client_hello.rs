use serde::Serialize;

use crate::bytes::{as_hex, RawBytes};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::extension::{decode_optional_extensions, Extension, HelloOrigin, HelloSummary};
use crate::fingerprint::ja3::compute_ja3;
use crate::registry::cipher_suites::CipherSuite;

use super::read_hello_prefix;
use super::version::{CompressionMethod, ProtocolVersion};

/// A decoded ClientHello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientHelloInfo {
    pub version: ProtocolVersion,
    #[serde(serialize_with = "as_hex")]
    pub random: [u8; 32],
    pub session_id: RawBytes,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<CompressionMethod>,
    pub extensions: Vec<Extension>,
    pub info: ClientHelloSummary,
}

/// Extension-derived facts plus the JA3 fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientHelloSummary {
    #[serde(flatten)]
    pub hello: HelloSummary,
    pub ja3_string: String,
    pub ja3_fingerprint: String,
}

/// Decode a ClientHello body (everything after the 4-byte handshake header).
///
/// All of `body` must be consumed; the JA3 fingerprint is computed only once
/// the message has decoded completely.
pub fn decode_client_hello(body: &[u8]) -> Result<ClientHelloInfo> {
    let mut msg = Cursor::new(body);
    let prefix = read_hello_prefix(&mut msg)?;

    let cipher_suites = msg.read_u16_prefixed()?.parse_all("cipher_suites", |list| {
        let mut suites = Vec::with_capacity(list.remaining() / 2);
        while !list.is_empty() {
            suites.push(CipherSuite::from_code(list.read_u16()?));
        }
        Ok(suites)
    })?;

    let compression_methods = msg
        .read_u8_prefixed()?
        .rest()
        .iter()
        .copied()
        .map(CompressionMethod)
        .collect();

    let (extensions, hello) = decode_optional_extensions(&mut msg, HelloOrigin::Client)?;
    msg.finish("ClientHello")?;

    let mut info = ClientHelloInfo {
        version: prefix.version,
        random: prefix.random,
        session_id: prefix.session_id.into(),
        cipher_suites,
        compression_methods,
        extensions,
        info: ClientHelloSummary {
            hello,
            ..Default::default()
        },
    };
    let ja3 = compute_ja3(&info);
    info.info.ja3_string = ja3.raw_string;
    info.info.ja3_fingerprint = ja3.hash;
    Ok(info)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{DecodeError, ErrorKind};
    use crate::extension::{ExtensionPayload, ALPN, SERVER_NAME};

    /// Builds ClientHello bodies for tests.
    pub(crate) struct HelloBuilder {
        pub version: u16,
        pub session_id: Vec<u8>,
        pub ciphers: Vec<u16>,
        pub compression: Vec<u8>,
        pub extensions: Option<Vec<(u16, Vec<u8>)>>,
    }

    impl Default for HelloBuilder {
        fn default() -> Self {
            Self {
                version: 0x0303,
                session_id: Vec::new(),
                ciphers: vec![0x1301],
                compression: vec![0x00],
                extensions: None,
            }
        }
    }

    impl HelloBuilder {
        pub(crate) fn body(&self) -> Vec<u8> {
            let mut out = self.version.to_be_bytes().to_vec();
            out.extend_from_slice(&[0u8; 32]);
            out.push(self.session_id.len() as u8);
            out.extend_from_slice(&self.session_id);
            out.extend_from_slice(&((self.ciphers.len() * 2) as u16).to_be_bytes());
            for c in &self.ciphers {
                out.extend_from_slice(&c.to_be_bytes());
            }
            out.push(self.compression.len() as u8);
            out.extend_from_slice(&self.compression);
            if let Some(exts) = &self.extensions {
                let mut block = Vec::new();
                for (t, data) in exts {
                    block.extend_from_slice(&t.to_be_bytes());
                    block.extend_from_slice(&(data.len() as u16).to_be_bytes());
                    block.extend_from_slice(data);
                }
                out.extend_from_slice(&(block.len() as u16).to_be_bytes());
                out.extend(block);
            }
            out
        }
    }

    pub(crate) fn sni(host: &str) -> Vec<u8> {
        let mut entry = vec![0x00];
        entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
        entry.extend_from_slice(host.as_bytes());
        let mut out = (entry.len() as u16).to_be_bytes().to_vec();
        out.extend(entry);
        out
    }

    pub(crate) fn alpn(protocols: &[&str]) -> Vec<u8> {
        let mut list = Vec::new();
        for p in protocols {
            list.push(p.len() as u8);
            list.extend_from_slice(p.as_bytes());
        }
        let mut out = (list.len() as u16).to_be_bytes().to_vec();
        out.extend(list);
        out
    }

    pub(crate) fn example_hello() -> HelloBuilder {
        HelloBuilder {
            ciphers: vec![0x1301, 0x0A0A],
            extensions: Some(vec![
                (SERVER_NAME, sni("example.com")),
                (ALPN, alpn(&["h2", "http/1.1"])),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_sni_and_alpn_scenario() {
        let info = decode_client_hello(&example_hello().body()).unwrap();

        assert_eq!(info.version, ProtocolVersion::TLS12);
        assert_eq!(info.random, [0u8; 32]);
        assert!(info.session_id.is_empty());
        assert_eq!(info.cipher_suites.len(), 2);
        assert!(info.cipher_suites[1].grease);
        assert_eq!(info.compression_methods, vec![CompressionMethod(0)]);
        assert_eq!(info.info.hello.server_name.as_deref(), Some("example.com"));
        assert_eq!(info.info.hello.protocols, vec!["h2", "http/1.1"]);
        assert!(!info.info.hello.scts);

        // 0x1301 = 4865; the GREASE suite is absent from the cipher segment.
        assert_eq!(info.info.ja3_string, "771,4865,0-16,,");
        assert_eq!(info.info.ja3_fingerprint.len(), 32);
    }

    #[test]
    fn extensions_keep_wire_order() {
        let info = decode_client_hello(&example_hello().body()).unwrap();
        let types: Vec<u16> = info.extensions.iter().map(|e| e.ext_type).collect();
        assert_eq!(types, vec![SERVER_NAME, ALPN]);
        assert!(matches!(
            info.extensions[0].payload,
            ExtensionPayload::ServerName(_)
        ));
    }

    #[test]
    fn missing_extensions_field_is_valid() {
        let body = HelloBuilder::default().body();
        let info = decode_client_hello(&body).unwrap();
        assert!(info.extensions.is_empty());
        assert_eq!(info.info.hello.server_name, None);
        assert_eq!(info.info.ja3_string, "771,4865,,,");
    }

    #[test]
    fn empty_cipher_list_is_valid() {
        let body = HelloBuilder {
            ciphers: vec![],
            ..Default::default()
        }
        .body();
        assert!(decode_client_hello(&body).unwrap().cipher_suites.is_empty());
    }

    #[test]
    fn session_id_is_preserved() {
        let body = HelloBuilder {
            session_id: (0..32).collect(),
            ..Default::default()
        }
        .body();
        let info = decode_client_hello(&body).unwrap();
        assert_eq!(&info.session_id[..], &(0..32).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn trailing_byte_is_rejected() {
        // With and without an extensions block.
        for builder in [example_hello(), HelloBuilder::default()] {
            let mut body = builder.body();
            body.push(0x00);
            let err = decode_client_hello(&body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TrailingData, "{err}");
        }
    }

    #[test]
    fn dropping_the_last_byte_truncates() {
        for builder in [example_hello(), HelloBuilder::default()] {
            let body = builder.body();
            let err = decode_client_hello(&body[..body.len() - 1]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedInput, "{err}");
        }
    }

    #[test]
    fn every_proper_prefix_fails() {
        let body = example_hello().body();
        // Cutting right after the compression methods leaves a valid hello
        // without extensions; every other cut must fail.
        let no_ext_len = HelloBuilder {
            ciphers: vec![0x1301, 0x0A0A],
            ..Default::default()
        }
        .body()
        .len();
        for cut in 0..body.len() {
            let res = decode_client_hello(&body[..cut]);
            if cut == no_ext_len {
                assert!(res.is_ok());
            } else {
                assert!(res.is_err(), "prefix of {cut} bytes decoded");
            }
        }
    }

    #[test]
    fn odd_cipher_list_is_malformed() {
        let mut body = HelloBuilder::default().body();
        // cipher list length lives right after version, random and the
        // empty session id
        body[35] = 0x00;
        body[36] = 0x01;
        body.insert(37, 0x13);
        let err = decode_client_hello(&body).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedSubfield {
                field: "cipher_suites",
                ..
            }
        ));
    }

    #[test]
    fn malformed_extension_fails_whole_message() {
        let body = HelloBuilder {
            extensions: Some(vec![(ALPN, vec![0x00, 0x05, 0x02, b'h', b'2'])]),
            ..Default::default()
        }
        .body();
        let err = decode_client_hello(&body).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedSubfield {
                field: "application_layer_protocol_negotiation",
                ..
            }
        ));
    }

    #[test]
    fn decoding_is_deterministic() {
        let body = example_hello().body();
        let a = decode_client_hello(&body).unwrap();
        let b = decode_client_hello(&body).unwrap();
        assert_eq!(a.info.ja3_string, b.info.ja3_string);
        assert_eq!(a.info.ja3_fingerprint, b.info.ja3_fingerprint);
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let info = decode_client_hello(&example_hello().body()).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["version"], serde_json::json!([3, 3]));
        assert_eq!(json["random"], serde_json::json!("00".repeat(32)));
        assert_eq!(json["session_id"], serde_json::json!(""));
        assert_eq!(json["cipher_suites"][0]["code"], 0x1301);
        assert_eq!(json["cipher_suites"][1]["grease"], true);
        assert_eq!(json["compression_methods"], serde_json::json!([0]));
        assert_eq!(json["extensions"][0]["type"], 0);
        assert_eq!(
            json["extensions"][0]["payload"]["host_name"],
            "example.com"
        );
        assert_eq!(
            json["extensions"][1]["payload"]["protocols"],
            serde_json::json!(["h2", "http/1.1"])
        );
        assert_eq!(json["info"]["server_name"], "example.com");
        assert_eq!(json["info"]["scts"], false);
        assert_eq!(json["info"]["ja3_string"], "771,4865,0-16,,");
    }

    #[test]
    fn agrees_with_tls_parser() {
        use tls_parser::{parse_tls_plaintext, TlsMessage, TlsMessageHandshake};

        let body = HelloBuilder {
            ciphers: vec![0x1301, 0x1302, 0xC02B, 0x0A0A],
            extensions: Some(vec![
                (SERVER_NAME, sni("example.com")),
                (0x000a, vec![0x00, 0x04, 0x00, 0x1d, 0x00, 0x17]),
                (0x000b, vec![0x01, 0x00]),
                (ALPN, alpn(&["h2"])),
            ]),
            ..Default::default()
        }
        .body();

        let mut record = vec![0x16, 0x03, 0x01];
        record.extend_from_slice(&((body.len() + 4) as u16).to_be_bytes());
        record.push(0x01);
        record.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
        record.extend_from_slice(&body);

        let (_, plaintext) = parse_tls_plaintext(&record).unwrap();
        let theirs = match &plaintext.msg[0] {
            TlsMessage::Handshake(TlsMessageHandshake::ClientHello(ch)) => ch,
            other => panic!("unexpected message {other:?}"),
        };

        let ours = decode_client_hello(&body).unwrap();
        assert_eq!(ours.version.0, theirs.version.0);
        let our_ciphers: Vec<u16> = ours.cipher_suites.iter().map(|c| c.code).collect();
        let their_ciphers: Vec<u16> = theirs.ciphers.iter().map(|c| c.0).collect();
        assert_eq!(our_ciphers, their_ciphers);
        assert_eq!(ours.info.ja3_string, "771,4865-4866-49195,0-10-11-16,29-23,0");
    }
}
