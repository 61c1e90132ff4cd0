//! Static lookup tables for cipher suites and extension types.

pub mod cipher_suites;
pub mod extensions;
pub mod grease;
