//! Key management for the compliance-archive SDK.
//!
//! Each archived message carries a symmetric key wrapped with one of
//! several versioned RSA public keys. This crate holds the matching
//! private keys — some versions may be absent — and performs the
//! PKCS#1 v1.5 unwrap with fresh blinding randomness per call.

#![deny(unsafe_code)]

mod key_ring;

pub use key_ring::{Decryptor, KeyImportError, KeyRing, UnwrapError};
