use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::bytes::RawBytes;
use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::message::certificate::{
    decode_certificate, decode_certificate_request, decode_ibc_certificate, CertificateInfo,
    CertificateRequestInfo, IbcCertificateInfo,
};
use crate::message::client_hello::{decode_client_hello, ClientHelloInfo};
use crate::message::server_hello::{decode_server_hello, ServerHelloInfo};

/// Size of the handshake header: 1 byte type, 3 bytes length.
pub const HANDSHAKE_HEADER_LEN: usize = 4;

/// Handshake message type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandshakeType(pub u8);

impl HandshakeType {
    pub const ENCRYPTED: Self = Self(0);
    pub const CLIENT_HELLO: Self = Self(1);
    pub const SERVER_HELLO: Self = Self(2);
    pub const CERTIFICATE: Self = Self(11);
    pub const SERVER_KEY_EXCHANGE: Self = Self(12);
    pub const CERTIFICATE_REQUEST: Self = Self(13);
    pub const SERVER_HELLO_DONE: Self = Self(14);
    pub const CERTIFICATE_VERIFY: Self = Self(15);
    pub const CLIENT_KEY_EXCHANGE: Self = Self(16);
    pub const FINISHED: Self = Self(20);

    /// Human-readable name, or `None` for unassigned types.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::ENCRYPTED => "Encrypted Handshake Message",
            Self::CLIENT_HELLO => "Client Hello",
            Self::SERVER_HELLO => "Server Hello",
            Self::CERTIFICATE => "Certificate",
            Self::SERVER_KEY_EXCHANGE => "Server Key Exchange",
            Self::CERTIFICATE_REQUEST => "Certificate Request",
            Self::SERVER_HELLO_DONE => "Server Hello Done",
            Self::CERTIFICATE_VERIFY => "Certificate Verify",
            Self::CLIENT_KEY_EXCHANGE => "Client Key Exchange",
            Self::FINISHED => "Finished",
            _ => return None,
        })
    }
}

impl fmt::Display for HandshakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown Handshake Message({})", self.0),
        }
    }
}

impl Serialize for HandshakeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// How a Certificate (type 11) message body is framed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificateFormat {
    /// Standard list of u24-prefixed certificates.
    #[default]
    X509,
    /// TLCP IBC framing: u16-prefixed ID, u24-prefixed parameter.
    Ibc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub certificate_format: CertificateFormat,
}

/// One decoded handshake message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandshakeRecord {
    pub handshake_type: HandshakeType,
    pub length: u32,
    #[serde(flatten)]
    pub body: HandshakeBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeBody {
    ClientHello(ClientHelloInfo),
    ServerHello(ServerHelloInfo),
    Certificate(CertificateInfo),
    IbcCertificate(IbcCertificateInfo),
    CertificateRequest(CertificateRequestInfo),
    /// Body of a type whose structure is not decoded.
    Raw(RawBytes),
}

/// Decode one handshake message with default options.
///
/// `record_len` is the total message length declared by the record layer;
/// `buf` starts at the handshake type byte.
pub fn decode_handshake(record_len: usize, buf: &[u8]) -> Result<HandshakeRecord> {
    decode_handshake_with(&DecodeOptions::default(), record_len, buf)
}

pub fn decode_handshake_with(
    options: &DecodeOptions,
    record_len: usize,
    buf: &[u8],
) -> Result<HandshakeRecord> {
    let mut cursor = Cursor::new(buf);
    if cursor.remaining() < HANDSHAKE_HEADER_LEN {
        return Err(DecodeError::TruncatedInput {
            needed: HANDSHAKE_HEADER_LEN,
            remaining: cursor.remaining(),
        });
    }

    let handshake_type = HandshakeType(cursor.read_u8()?);
    let length = cursor.read_u24()?;
    if length as usize + HANDSHAKE_HEADER_LEN != record_len {
        return Err(DecodeError::LengthMismatch {
            declared: length as usize,
            record: record_len,
        });
    }

    let body = cursor.read_bytes(length as usize)?;
    cursor.finish("handshake message")?;
    trace!(%handshake_type, length, "decoding handshake message");

    let body = match handshake_type {
        HandshakeType::CLIENT_HELLO => HandshakeBody::ClientHello(decode_client_hello(body)?),
        HandshakeType::SERVER_HELLO => HandshakeBody::ServerHello(decode_server_hello(body)?),
        HandshakeType::CERTIFICATE => match options.certificate_format {
            CertificateFormat::X509 => HandshakeBody::Certificate(decode_certificate(body)?),
            CertificateFormat::Ibc => HandshakeBody::IbcCertificate(decode_ibc_certificate(body)?),
        },
        HandshakeType::CERTIFICATE_REQUEST => {
            HandshakeBody::CertificateRequest(decode_certificate_request(body)?)
        }
        other => {
            debug!(handshake_type = %other, length, "capturing undecoded handshake body");
            HandshakeBody::Raw(body.into())
        }
    };

    Ok(HandshakeRecord {
        handshake_type,
        length,
        body,
    })
}
