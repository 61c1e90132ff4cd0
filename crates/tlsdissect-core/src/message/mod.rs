pub mod certificate;
pub mod client_hello;
pub mod server_hello;
pub mod version;

use crate::cursor::Cursor;
use crate::error::Result;

/// Fields shared by the start of ClientHello and ServerHello.
pub(crate) struct HelloPrefix<'a> {
    pub version: version::ProtocolVersion,
    pub random: [u8; 32],
    pub session_id: &'a [u8],
}

pub(crate) fn read_hello_prefix<'a>(msg: &mut Cursor<'a>) -> Result<HelloPrefix<'a>> {
    let version = version::ProtocolVersion(msg.read_u16()?);
    let random = msg.read_array::<32>()?;
    let session_id = msg.read_u8_prefixed()?.rest();
    Ok(HelloPrefix {
        version,
        random,
        session_id,
    })
}
