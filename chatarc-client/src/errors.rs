//! Error types for chatarc-client.
//!
//! Every nonzero native return code becomes a typed error carrying that
//! code; nothing is swallowed. No retries happen here — callers own the
//! retry policy.

use std::fmt;

use chatarc_crypto::UnwrapError;
use chatarc_native::NativeError;

/// The error type returned by every [`crate::ArchiveSession`] operation.
#[derive(Debug)]
pub enum ArchiveError {
    /// Native SDK initialization failed; the session is unusable.
    Init(NativeError),
    /// `limit` exceeded [`crate::MAX_BATCH_LIMIT`]. Rejected before any
    /// native call is issued — distinct from [`ArchiveError::ChatFetch`].
    InvalidLimit(u32),
    /// The native chat-data fetch failed.
    ChatFetch(NativeError),
    /// The outer chat envelope was not valid JSON.
    Envelope(serde_json::Error),
    /// No private key is loaded for this record's key version.
    KeyNotLoaded(u32),
    /// The wrapped symmetric key was not valid base64.
    WrappedKeyEncoding(base64::DecodeError),
    /// RSA unwrap of the symmetric key failed (bad padding, or the record
    /// was wrapped with a different key pair).
    KeyUnwrap(UnwrapError),
    /// The native payload decryption failed.
    PayloadDecrypt(NativeError),
    /// The decrypted payload was not valid JSON.
    PayloadParse(serde_json::Error),
    /// A native media-chunk fetch failed. The partial accumulator is
    /// discarded; no partial media object is ever returned.
    MediaFetch(NativeError),
    /// A media fetch exceeded the configured chunk or byte budget.
    MediaBudget {
        /// Chunks fetched when the budget tripped.
        chunks: usize,
        /// Bytes accumulated when the budget tripped.
        bytes: usize,
    },
}

impl ArchiveError {
    /// The originating native status code, if this error came out of a
    /// native call. Codes are library-defined; `0` never appears here.
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Self::Init(e) | Self::ChatFetch(e) | Self::PayloadDecrypt(e) | Self::MediaFetch(e) => {
                Some(e.code())
            }
            _ => None,
        }
    }

    /// `true` for the errors that mean "this record could not be
    /// decrypted" — useful for callers that relax the fail-fast batch
    /// policy and drive [`crate::pipeline::decrypt_record`] themselves.
    pub fn is_decrypt_failure(&self) -> bool {
        matches!(
            self,
            Self::KeyNotLoaded(_)
                | Self::WrappedKeyEncoding(_)
                | Self::KeyUnwrap(_)
                | Self::PayloadDecrypt(_)
                | Self::PayloadParse(_)
        )
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "sdk init failed: {e}"),
            Self::InvalidLimit(limit) => {
                write!(f, "limit {limit} exceeds maximum of {}", crate::MAX_BATCH_LIMIT)
            }
            Self::ChatFetch(e) => write!(f, "chat fetch failed: {e}"),
            Self::Envelope(e) => write!(f, "malformed chat envelope: {e}"),
            Self::KeyNotLoaded(version) => {
                write!(f, "no private key loaded for version {version}")
            }
            Self::WrappedKeyEncoding(e) => write!(f, "wrapped key is not valid base64: {e}"),
            Self::KeyUnwrap(e) => write!(f, "{e}"),
            Self::PayloadDecrypt(e) => write!(f, "payload decryption failed: {e}"),
            Self::PayloadParse(e) => write!(f, "decrypted payload is not valid JSON: {e}"),
            Self::MediaFetch(e) => write!(f, "media fetch failed: {e}"),
            Self::MediaBudget { chunks, bytes } => {
                write!(f, "media fetch exceeded budget after {chunks} chunk(s), {bytes} byte(s)")
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Init(e) | Self::ChatFetch(e) | Self::PayloadDecrypt(e) | Self::MediaFetch(e) => {
                Some(e)
            }
            Self::Envelope(e) | Self::PayloadParse(e) => Some(e),
            Self::WrappedKeyEncoding(e) => Some(e),
            Self::KeyUnwrap(e) => Some(e),
            Self::InvalidLimit(_) | Self::KeyNotLoaded(_) | Self::MediaBudget { .. } => None,
        }
    }
}
