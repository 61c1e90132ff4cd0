use md5::{Digest, Md5};

use crate::extension::ExtensionPayload;
use crate::fingerprint::types::Ja3Result;
use crate::message::client_hello::ClientHelloInfo;
use crate::registry::grease::without_grease;

/// Compute the JA3 fingerprint from a decoded ClientHello.
///
/// JA3 format: MD5(SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats)
///
/// - Fields separated by commas
/// - Values within each field separated by dashes
/// - GREASE values filtered from ciphers, extensions and curves
/// - All values in decimal, wire order, duplicates kept
pub fn compute_ja3(hello: &ClientHelloInfo) -> Ja3Result {
    let version = hello.version.0.to_string();

    let ciphers = join_dashed(
        hello
            .cipher_suites
            .iter()
            .filter(|c| !c.grease)
            .map(|c| c.code),
    );

    let extensions = join_dashed(
        hello
            .extensions
            .iter()
            .filter(|e| !e.grease)
            .map(|e| e.ext_type),
    );

    let mut curves = Vec::new();
    let mut point_formats = Vec::new();
    for ext in &hello.extensions {
        match &ext.payload {
            ExtensionPayload::SupportedGroups(data) => curves = without_grease(&data.groups),
            ExtensionPayload::EcPointFormats(data) => point_formats = data.formats.clone(),
            _ => {}
        }
    }

    let raw_string = format!(
        "{},{},{},{},{}",
        version,
        ciphers,
        extensions,
        join_dashed(curves),
        join_dashed(point_formats)
    );

    Ja3Result {
        hash: ja3_digest(&raw_string),
        raw_string,
    }
}

/// MD5 of a JA3 string, as 32 lowercase hex characters.
pub fn ja3_digest(raw_string: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(raw_string.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn join_dashed<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
