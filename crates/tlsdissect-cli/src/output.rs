use serde::Serialize;

use tlsdissect_core::extension::{Extension, ExtensionPayload};
use tlsdissect_core::message::version::ProtocolVersion;
use tlsdissect_core::{HandshakeBody, HandshakeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    index: usize,
    message: String,
    #[serde(flatten)]
    record: &'a HandshakeRecord,
}

pub fn print_record(
    index: usize,
    record: &HandshakeRecord,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            print!("{}", render_text(index, record, verbose));
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", render_json(index, record)?);
            Ok(())
        }
    }
}

fn render_json(index: usize, record: &HandshakeRecord) -> anyhow::Result<String> {
    let line = JsonRecord {
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        index,
        message: record.handshake_type.to_string(),
        record,
    };
    Ok(serde_json::to_string(&line)?)
}

const HEAVY_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const LIGHT_RULE: &str = "  ──────────────────────────────────────────────────";

fn render_text(index: usize, record: &HandshakeRecord, verbose: bool) -> String {
    let mut out = Vec::new();
    out.push(HEAVY_RULE.to_string());
    out.push(format!(
        "  #{:<9} {} ({} bytes)",
        index, record.handshake_type, record.length
    ));
    out.push(LIGHT_RULE.to_string());

    match &record.body {
        HandshakeBody::ClientHello(ch) => {
            out.push(format!(
                "  SNI:        {}",
                ch.info.hello.server_name.as_deref().unwrap_or("(none)")
            ));
            out.push(format!("  TLS ver:    {}", version_label(ch.version)));
            push_supported_versions(&mut out, &ch.extensions);
            out.push(format!("  Ciphers:    {} suites", ch.cipher_suites.len()));
            if verbose {
                for suite in &ch.cipher_suites {
                    out.push(format!("    0x{:04x}  {}", suite.code, suite.name));
                }
            }
            out.push(format!("  Extensions: {} types", ch.extensions.len()));
            if verbose {
                push_extension_names(&mut out, &ch.extensions);
            }
            if !ch.info.hello.protocols.is_empty() {
                out.push(format!("  ALPN:       {}", ch.info.hello.protocols.join(", ")));
            }
            if ch.info.hello.scts {
                out.push("  SCT:        requested".to_string());
            }
            out.push(LIGHT_RULE.to_string());
            out.push(format!("  JA3:        {}", ch.info.ja3_fingerprint));
            if verbose {
                out.push(format!("  JA3 raw:    {}", ch.info.ja3_string));
            }
        }
        HandshakeBody::ServerHello(sh) => {
            out.push(format!("  TLS ver:    {}", version_label(sh.version)));
            push_supported_versions(&mut out, &sh.extensions);
            out.push(format!(
                "  Cipher:     0x{:04x} {}",
                sh.cipher_suite.code, sh.cipher_suite.name
            ));
            out.push(format!(
                "  Compress:   {}",
                sh.compression_method.name()
            ));
            out.push(format!("  Extensions: {} types", sh.extensions.len()));
            if verbose {
                push_extension_names(&mut out, &sh.extensions);
            }
            if !sh.info.protocols.is_empty() {
                out.push(format!("  ALPN:       {}", sh.info.protocols.join(", ")));
            }
        }
        HandshakeBody::Certificate(cert) => {
            out.push(format!("  Certs:      {}", cert.certificates.len()));
            for (i, c) in cert.certificates.iter().enumerate() {
                out.push(format!("    [{}] {} bytes", i, c.len()));
            }
        }
        HandshakeBody::IbcCertificate(ibc) => {
            out.push(format!("  IBC id:     {} bytes", ibc.id.len()));
            out.push(format!("  IBC param:  {} bytes", ibc.parameter.len()));
        }
        HandshakeBody::CertificateRequest(req) => {
            out.push(format!("  Cert types: {}", hex::encode(&req.certificate_types[..])));
            out.push(format!(
                "  CAs:        {} bytes",
                req.certificate_authorities.len()
            ));
        }
        HandshakeBody::Raw(raw) => {
            out.push(format!("  Body:       {} bytes (not decoded)", raw.len()));
            if verbose && !raw.is_empty() {
                out.push(format!("  Raw:        {}", hex::encode(&raw[..])));
            }
        }
    }

    out.push(format!("{}\n", HEAVY_RULE));
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn version_label(version: ProtocolVersion) -> String {
    format!("{} (0x{:04x})", version, version.0)
}

fn push_supported_versions(out: &mut Vec<String>, extensions: &[Extension]) {
    for ext in extensions {
        if let ExtensionPayload::SupportedVersions(data) = &ext.payload {
            let vers: Vec<String> = data
                .versions
                .iter()
                .map(|v| format!("0x{:04x}", v.0))
                .collect();
            out.push(format!("  Sup. vers:  {}", vers.join(", ")));
        }
    }
}

fn push_extension_names(out: &mut Vec<String>, extensions: &[Extension]) {
    for ext in extensions {
        out.push(format!("    0x{:04x}  {}", ext.ext_type, ext.name));
    }
}
