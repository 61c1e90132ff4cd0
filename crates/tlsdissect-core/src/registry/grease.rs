/// Check if a u16 codepoint is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both bytes are identical:
/// 0x0A0A, 0x1A1A, 0x2A2A, ..., 0xFAFA. The same reserved set is used for
/// cipher suites, extension types, named groups and signature schemes.
pub const fn is_grease_u16(val: u16) -> bool {
    let hi = (val >> 8) as u8;
    let lo = val as u8;
    hi == lo && (hi & 0x0F) == 0x0A
}

/// Copy `values` in order, leaving out GREASE codepoints.
pub fn without_grease(values: &[u16]) -> Vec<u16> {
    values.iter().copied().filter(|v| !is_grease_u16(*v)).collect()
}
