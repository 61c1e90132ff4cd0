use crate::cursor::Cursor;
use crate::error::Result;
use crate::extension::parsers;
use crate::extension::{ExtensionPayload, HelloOrigin};

use super::grease::is_grease_u16;

/// Decodes one extension's isolated payload into its typed variant.
pub type PayloadParser = fn(Cursor<'_>) -> Result<ExtensionPayload>;

/// What the registry knows about an extension type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    pub name: &'static str,
    pub grease: bool,
    pub private: bool,
}

struct ExtensionEntry {
    code: u16,
    name: &'static str,
    parser: Option<PayloadParser>,
    /// Overrides `parser` inside a ServerHello.
    server_parser: Option<PayloadParser>,
}

const fn entry(code: u16, name: &'static str) -> ExtensionEntry {
    ExtensionEntry {
        code,
        name,
        parser: None,
        server_parser: None,
    }
}

const fn parsed(code: u16, name: &'static str, parser: PayloadParser) -> ExtensionEntry {
    ExtensionEntry {
        code,
        name,
        parser: Some(parser),
        server_parser: None,
    }
}

const fn by_origin(
    code: u16,
    name: &'static str,
    client: PayloadParser,
    server: PayloadParser,
) -> ExtensionEntry {
    ExtensionEntry {
        code,
        name,
        parser: Some(client),
        server_parser: Some(server),
    }
}

fn find(code: u16) -> Option<&'static ExtensionEntry> {
    EXTENSIONS
        .binary_search_by_key(&code, |e| e.code)
        .ok()
        .map(|i| &EXTENSIONS[i])
}

/// Resolve an extension type code. Never fails: unassigned codes come back
/// as `"Unknown"` (or private-use, for `0xFF00..=0xFFFF`).
pub fn lookup_extension(code: u16) -> ExtensionDescriptor {
    if is_grease_u16(code) {
        return ExtensionDescriptor {
            name: "Reserved (GREASE)",
            grease: true,
            private: false,
        };
    }
    match find(code) {
        Some(e) => ExtensionDescriptor {
            name: e.name,
            grease: false,
            private: false,
        },
        None if code >= 0xFF00 => ExtensionDescriptor {
            name: "Reserved for Private Use",
            grease: false,
            private: true,
        },
        None => ExtensionDescriptor {
            name: "Unknown",
            grease: false,
            private: false,
        },
    }
}

/// The payload parser registered for `code` in a hello from `origin`, or
/// the raw-bytes fallback.
pub fn payload_parser(code: u16, origin: HelloOrigin) -> PayloadParser {
    find(code)
        .and_then(|e| match origin {
            HelloOrigin::Server => e.server_parser.or(e.parser),
            HelloOrigin::Client => e.parser,
        })
        .unwrap_or(parsers::parse_unknown)
}

// Sorted by code.
static EXTENSIONS: &[ExtensionEntry] = &[
    parsed(0, "server_name", parsers::parse_server_name),
    entry(1, "max_fragment_length"),
    entry(2, "client_certificate_url"),
    entry(3, "trusted_ca_keys"),
    entry(4, "truncated_hmac"),
    entry(5, "status_request"),
    entry(6, "user_mapping"),
    entry(7, "client_authz"),
    entry(8, "server_authz"),
    entry(9, "cert_type"),
    parsed(10, "supported_groups", parsers::parse_supported_groups),
    parsed(11, "ec_point_formats", parsers::parse_ec_point_formats),
    entry(12, "srp"),
    parsed(13, "signature_algorithms", parsers::parse_signature_algorithms),
    entry(14, "use_srtp"),
    entry(15, "heartbeat"),
    parsed(16, "application_layer_protocol_negotiation", parsers::parse_alpn),
    entry(17, "status_request_v2"),
    parsed(18, "signed_certificate_timestamp", parsers::parse_sct),
    entry(19, "client_certificate_type"),
    entry(20, "server_certificate_type"),
    entry(21, "padding"),
    entry(22, "encrypt_then_mac"),
    entry(23, "extended_master_secret"),
    entry(24, "token_binding"),
    entry(25, "cached_info"),
    entry(26, "tls_lts"),
    entry(27, "compress_certificate"),
    entry(28, "record_size_limit"),
    entry(29, "pwd_protect"),
    entry(30, "pwd_clear"),
    entry(31, "password_salt"),
    entry(32, "ticket_pinning"),
    entry(33, "tls_cert_with_extern_psk"),
    entry(34, "delegated_credential"),
    entry(35, "session_ticket"),
    entry(36, "TLMSP"),
    entry(37, "TLMSP_proxying"),
    entry(38, "TLMSP_delegate"),
    entry(39, "supported_ekt_ciphers"),
    entry(41, "pre_shared_key"),
    entry(42, "early_data"),
    by_origin(
        43,
        "supported_versions",
        parsers::parse_supported_versions,
        parsers::parse_selected_version,
    ),
    entry(44, "cookie"),
    entry(45, "psk_key_exchange_modes"),
    entry(47, "certificate_authorities"),
    entry(48, "oid_filters"),
    entry(49, "post_handshake_auth"),
    parsed(
        50,
        "signature_algorithms_cert",
        parsers::parse_signature_algorithms,
    ),
    entry(51, "key_share"),
    entry(52, "transparency_info"),
    entry(53, "connection_id_deprecated"),
    entry(54, "connection_id"),
    entry(55, "external_id_hash"),
    entry(56, "external_session_id"),
    entry(57, "quic_transport_parameters"),
    entry(58, "ticket_request"),
    entry(59, "dnssec_chain"),
    entry(60, "sequence_number_encryption_algorithms"),
    entry(61, "rrc"),
    entry(0x3374, "next_protocol_negotiation"),
    entry(0x4469, "application_settings"),
    entry(0xFE0D, "encrypted_client_hello"),
    entry(0xFF01, "renegotiation_info"),
];
