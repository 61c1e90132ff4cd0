//! Decoder for TLS handshake messages with JA3 fingerprinting.
//!
//! The entry point is [`decode_handshake`], which takes one handshake message
//! (starting at its type byte) plus the length the record layer declared for
//! it, and returns a structured [`HandshakeRecord`].

pub mod bytes;
pub mod cursor;
pub mod error;
pub mod extension;
pub mod fingerprint;
pub mod handshake;
pub mod message;
pub mod registry;

pub use error::{DecodeError, ErrorKind};
pub use handshake::{
    decode_handshake, decode_handshake_with, CertificateFormat, DecodeOptions, HandshakeBody,
    HandshakeRecord, HandshakeType,
};
