use std::fmt;
use std::ops::Deref;

use serde::{Serialize, Serializer};

/// Opaque bytes carried through undecoded. Serialized as lowercase hex.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawBytes(pub Vec<u8>);

impl RawBytes {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for RawBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for RawBytes {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl fmt::Debug for RawBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawBytes({})", hex::encode(&self.0))
    }
}

impl Serialize for RawBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        as_hex(&self.0, serializer)
    }
}

pub(crate) fn as_hex<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes.as_ref()))
}
