use tracing::{debug, warn};

/// TLS record content types.
pub const CONTENT_CHANGE_CIPHER_SPEC: u8 = 0x14;
pub const CONTENT_HANDSHAKE: u8 = 0x16;

const RECORD_HEADER_LEN: usize = 5;
const HANDSHAKE_HEADER_LEN: usize = 4;
/// Largest handshake message we are willing to buffer across records.
const DEFAULT_MAX_MESSAGE: usize = 256 * 1024;

/// One TLS record sliced out of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub content_type: u8,
    pub version: u16,
    pub body: &'a [u8],
}

/// Split a byte stream into TLS records.
///
/// Returns the complete records and the number of bytes left over at the
/// end (a partial header or a record whose body is cut short).
pub fn split_records(mut data: &[u8]) -> (Vec<Record<'_>>, usize) {
    let mut records = Vec::new();
    while data.len() >= RECORD_HEADER_LEN {
        let record_len = u16::from_be_bytes([data[3], data[4]]) as usize;
        let total = RECORD_HEADER_LEN + record_len;
        if data.len() < total {
            debug!(
                "Record cut short: have {} bytes, need {}",
                data.len(),
                total
            );
            break;
        }
        records.push(Record {
            content_type: data[0],
            version: u16::from_be_bytes([data[1], data[2]]),
            body: &data[RECORD_HEADER_LEN..total],
        });
        data = &data[total..];
    }
    (records, data.len())
}

/// A handshake message framed by the record layer, ready for the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeFrame {
    /// Total length the record layer attributes to this message.
    pub declared_len: usize,
    /// Message bytes starting at the handshake type.
    pub bytes: Vec<u8>,
}

/// Outcome of feeding one record into the [`HandshakeReassembler`].
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Zero or more complete handshake messages.
    Messages(Vec<HandshakeFrame>),
    /// Record was not handshake plaintext.
    Skipped,
}

/// Reassembles handshake messages that span or share records.
///
/// Handshake records seen after a ChangeCipherSpec are encrypted and are
/// skipped rather than framed.
pub struct HandshakeReassembler {
    pending: Vec<u8>,
    /// Bytes of a dropped oversized message not yet seen.
    discard: usize,
    encrypted: bool,
    max_message: usize,
}

impl HandshakeReassembler {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            discard: 0,
            encrypted: false,
            max_message: DEFAULT_MAX_MESSAGE,
        }
    }

    pub fn process(&mut self, record: &Record<'_>) -> ProcessResult {
        match record.content_type {
            CONTENT_CHANGE_CIPHER_SPEC => {
                self.encrypted = true;
                ProcessResult::Skipped
            }
            CONTENT_HANDSHAKE if !self.encrypted => {
                let skip = self.discard.min(record.body.len());
                self.discard -= skip;
                if skip > 0 {
                    debug!(
                        "Discarding {} bytes of an oversized message (record version 0x{:04x})",
                        skip, record.version
                    );
                }
                self.pending.extend_from_slice(&record.body[skip..]);
                ProcessResult::Messages(self.drain_complete())
            }
            _ => ProcessResult::Skipped,
        }
    }

    /// Hand out whatever is still buffered once the input ends. The frame's
    /// declared length comes from its own header, so a cut-short message
    /// reaches the decoder as truncated input.
    pub fn finish(mut self) -> Option<HandshakeFrame> {
        if self.pending.is_empty() {
            return None;
        }
        let declared_len = match Self::message_len(&self.pending) {
            Some(len) => len,
            None => HANDSHAKE_HEADER_LEN,
        };
        Some(HandshakeFrame {
            declared_len,
            bytes: std::mem::take(&mut self.pending),
        })
    }

    fn drain_complete(&mut self) -> Vec<HandshakeFrame> {
        let mut out = Vec::new();
        while let Some(total) = Self::message_len(&self.pending) {
            if total > self.max_message {
                warn!(
                    "Handshake message too large to buffer: {} bytes (max {}), skipping it",
                    total,
                    self.max_message
                );
                let dropped = self.pending.len().min(total);
                self.discard = total - dropped;
                self.pending.drain(..dropped);
                continue;
            }
            if self.pending.len() < total {
                debug!(
                    "Buffering handshake message: {}/{} bytes",
                    self.pending.len(),
                    total
                );
                break;
            }
            let rest = self.pending.split_off(total);
            let bytes = std::mem::replace(&mut self.pending, rest);
            out.push(HandshakeFrame {
                declared_len: total,
                bytes,
            });
        }
        out
    }

    fn message_len(buf: &[u8]) -> Option<usize> {
        if buf.len() < HANDSHAKE_HEADER_LEN {
            return None;
        }
        let len = u32::from_be_bytes([0, buf[1], buf[2], buf[3]]) as usize;
        Some(HANDSHAKE_HEADER_LEN + len)
    }
}

impl Default for HandshakeReassembler {
    fn default() -> Self {
        Self::new()
    }
}
