//! Certificate, CertificateRequest and the TLCP IBC certificate variant.
//! Contents are carried as raw bytes; nothing here parses X.509.

use serde::Serialize;

use crate::bytes::RawBytes;
use crate::cursor::Cursor;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    pub certificates: Vec<RawBytes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertificateRequestInfo {
    pub certificate_types: RawBytes,
    pub certificate_authorities: RawBytes,
}

/// Certificate message used by GM/T 0024 IBC and IBSDH suites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IbcCertificateInfo {
    pub id: RawBytes,
    pub parameter: RawBytes,
}

/// u24-prefixed list of u24-prefixed certificate entries.
pub fn decode_certificate(body: &[u8]) -> Result<CertificateInfo> {
    let mut msg = Cursor::new(body);
    let certificates = msg.read_u24_prefixed()?.parse_all("certificate_list", |list| {
        let mut certs = Vec::new();
        while !list.is_empty() {
            certs.push(list.read_u24_prefixed()?.rest().into());
        }
        Ok(certs)
    })?;
    msg.finish("Certificate")?;
    Ok(CertificateInfo { certificates })
}

pub fn decode_certificate_request(body: &[u8]) -> Result<CertificateRequestInfo> {
    let mut msg = Cursor::new(body);
    let certificate_types = msg.read_u8_prefixed()?.rest().into();
    let certificate_authorities = msg.read_u16_prefixed()?.rest().into();
    msg.finish("CertificateRequest")?;
    Ok(CertificateRequestInfo {
        certificate_types,
        certificate_authorities,
    })
}

pub fn decode_ibc_certificate(body: &[u8]) -> Result<IbcCertificateInfo> {
    let mut msg = Cursor::new(body);
    let id = msg.read_u16_prefixed()?.rest().into();
    let parameter = msg.read_u24_prefixed()?.rest().into();
    msg.finish("IBC Certificate")?;
    Ok(IbcCertificateInfo { id, parameter })
}
