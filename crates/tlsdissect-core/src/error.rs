use thiserror::Error;

/// Why a handshake message could not be decoded.
///
/// Every variant is fatal to the message being decoded and to nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated input: need {needed} bytes, {remaining} remain")]
    TruncatedInput { needed: usize, remaining: usize },
    #[error("handshake length mismatch: header declares {declared} bytes, record carries {record}")]
    LengthMismatch { declared: usize, record: usize },
    #[error("{remaining} trailing bytes after {context}")]
    TrailingData {
        context: &'static str,
        remaining: usize,
    },
    #[error("malformed {field}: {reason}")]
    MalformedSubfield { field: &'static str, reason: String },
}

/// Classification of a [`DecodeError`] without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TruncatedInput,
    LengthMismatch,
    TrailingData,
    MalformedSubfield,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::TrailingData { .. } => ErrorKind::TrailingData,
            Self::MalformedSubfield { .. } => ErrorKind::MalformedSubfield,
        }
    }

    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedSubfield {
            field,
            reason: reason.into(),
        }
    }

    /// Reclassify a failure that happened inside an already isolated span.
    ///
    /// The bytes of such a span are all present, so running short or having
    /// leftovers means the field's own structure is inconsistent.
    pub(crate) fn within(self, field: &'static str) -> Self {
        match self {
            Self::MalformedSubfield { .. } => self,
            other => Self::malformed(field, other.to_string()),
        }
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
