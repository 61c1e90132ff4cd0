use crate::error::{DecodeError, Result};

/// Forward-only reader over a borrowed byte slice.
///
/// Reads never go past the end of the slice: a read that needs more bytes
/// than remain fails with [`DecodeError::TruncatedInput`] before anything is
/// copied or allocated.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unread bytes, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(DecodeError::TruncatedInput {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        let [a, b, c] = self.read_array()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_u8_prefixed(&mut self) -> Result<Cursor<'a>> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len).map(Cursor::new)
    }

    pub fn read_u16_prefixed(&mut self) -> Result<Cursor<'a>> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len).map(Cursor::new)
    }

    pub fn read_u24_prefixed(&mut self) -> Result<Cursor<'a>> {
        let len = self.read_u24()? as usize;
        self.read_bytes(len).map(Cursor::new)
    }

    /// Fail with [`DecodeError::TrailingData`] unless every byte was read.
    pub fn finish(self, context: &'static str) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingData {
                context,
                remaining: self.buf.len(),
            })
        }
    }

    /// Decode an isolated nested span with `f`, requiring it to be consumed
    /// completely. Any failure is reported as a malformed `field`.
    pub fn parse_all<T>(
        mut self,
        field: &'static str,
        f: impl FnOnce(&mut Cursor<'a>) -> Result<T>,
    ) -> Result<T> {
        let value = f(&mut self).map_err(|e| e.within(field))?;
        self.finish(field).map_err(|e| e.within(field))?;
        Ok(value)
    }
}
