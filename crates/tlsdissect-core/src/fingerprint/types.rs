/// Result of a JA3 fingerprint computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Result {
    /// 32-character MD5 hex hash
    pub hash: String,
    /// The raw string before hashing
    pub raw_string: String,
}
