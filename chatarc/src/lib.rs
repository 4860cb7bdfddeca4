//! # chatarc — compliance-archive retrieval & decryption SDK
//!
//! `chatarc` retrieves an organization's archived chat history from a
//! remote compliance-archive service and returns it decrypted and
//! structured. Records are end-to-end encrypted with a hybrid scheme: a
//! per-message symmetric key is wrapped with one of several versioned RSA
//! public keys, and the organization holds the matching private keys.
//! It consists of three focused sub-crates wired together here:
//!
//! | Sub-crate        | Role                                             |
//! |------------------|--------------------------------------------------|
//! | `chatarc-crypto` | Versioned key ring, PKCS#1 v1.5 symmetric unwrap |
//! | `chatarc-native` | Native archive SDK binding and backend trait     |
//! | `chatarc-client` | Session, decryption pipeline, media reassembly   |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chatarc::{ArchiveSession, KeyRing, SessionOptions};
//!
//! let keys = KeyRing::new([
//!     None, // v1 private key was never exported
//!     Some(std::fs::read_to_string("v2.pem")?),
//! ])?;
//!
//! let session = ArchiveSession::connect(
//!     "libWeWorkFinanceSdk_C.so",
//!     "CORP_ID",
//!     "CORP_SECRET",
//!     keys,
//!     SessionOptions::default(),
//! )?;
//!
//! // Page through the archive from the beginning.
//! let mut seq = 0;
//! loop {
//!     let batch = session.fetch_chat_batch(seq, 1000)?;
//!     if batch.is_empty() {
//!         break;
//!     }
//!     for record in &batch {
//!         println!("seq {}: {}", record.seq(), record.payload);
//!     }
//!     seq = batch.last().map(|r| r.seq() + 1).unwrap_or(seq);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

/// Re-export of [`chatarc_crypto`] — key ring and RSA unwrap.
pub use chatarc_crypto as crypto;

/// Re-export of [`chatarc_native`] — native SDK binding and backend trait.
pub use chatarc_native as native;

/// Re-export of [`chatarc_client`] — session, pipeline, media, errors.
pub use chatarc_client as client;

// ─── Convenience re-exports ───────────────────────────────────────────────────

pub use chatarc_client::{
    ArchiveError, ArchiveSession, DecryptedChatRecord, MAX_BATCH_LIMIT, MediaIter,
    RawChatRecord, SessionOptions,
};
pub use chatarc_crypto::{Decryptor, KeyImportError, KeyRing, UnwrapError};
pub use chatarc_native::{ArchiveBackend, FfiClient, MediaChunk, NativeError, ProxyConfig};
