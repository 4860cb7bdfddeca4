//! Binding layer for the native archive SDK.
//!
//! The remote compliance-archive service is only reachable through a
//! proprietary shared library with a fixed four-call C ABI. This crate
//! captures that call contract as the [`ArchiveBackend`] trait so the rest
//! of the stack (and its tests) can swap the real binding for a scripted
//! one, and provides [`FfiClient`] — the real implementation, loading the
//! library at runtime.
//!
//! All native status codes are small integers: `0` is success, anything
//! else is failure. The exact mapping is library-defined and treated as
//! opaque beyond zero/nonzero; codes are carried intact through
//! [`NativeError`] so operators can cross-reference the SDK documentation.

pub mod sdk;

pub use sdk::{FfiClient, ProxyConfig};

use std::fmt;
use std::time::Duration;

// ─── MediaChunk ───────────────────────────────────────────────────────────────

/// One step of a chunked media pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaChunk {
    /// Chunk payload, copied out of native-owned memory.
    pub data: Vec<u8>,
    /// Opaque continuation cursor for the next call.
    pub cursor: String,
    /// Set by the native layer on the final chunk.
    pub finished: bool,
}

// ─── ArchiveBackend ───────────────────────────────────────────────────────────

/// The fixed call contract of the native archive SDK.
///
/// All operations are synchronous and blocking; each carries its own
/// timeout and there is no mid-call cancellation. Implementations must
/// hand out owned copies only — nothing returned may reference memory
/// that the next native call invalidates.
pub trait ArchiveBackend: Send + Sync {
    /// Fetch one batch of raw (still encrypted) chat records starting at `seq`.
    fn get_chat_data(
        &self,
        seq: u64,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, NativeError>;

    /// Decrypt one message blob with an already-unwrapped symmetric key.
    fn decrypt_payload(&self, key: &[u8], encrypted: &[u8]) -> Result<Vec<u8>, NativeError>;

    /// Pull the next media chunk for `file_id`; `cursor` is `None` on the
    /// first call and the previous chunk's cursor afterwards.
    fn get_media_chunk(
        &self,
        cursor: Option<&str>,
        file_id: &str,
        timeout: Duration,
    ) -> Result<MediaChunk, NativeError>;

    /// Human-readable name of this backend (for log messages).
    fn name(&self) -> &str;
}

// ─── NativeError ──────────────────────────────────────────────────────────────

/// Failure raised by the binding layer.
#[derive(Debug)]
pub enum NativeError {
    /// The shared library or one of its symbols could not be loaded.
    Load(libloading::Error),
    /// An argument contained an interior NUL and cannot cross the C boundary.
    Nul(std::ffi::NulError),
    /// A native call returned a nonzero status code.
    Call {
        /// Name of the native function that failed.
        func: &'static str,
        /// The status code as returned, untranslated.
        code: i32,
    },
}

impl NativeError {
    /// The native status code, or `-1` for failures outside a native call.
    pub fn code(&self) -> i32 {
        match self {
            Self::Call { code, .. } => *code,
            _ => -1,
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "archive library load failed: {e}"),
            Self::Nul(e) => write!(f, "argument not representable as C string: {e}"),
            Self::Call { func, code } => write!(f, "native {func} failed with code {code}"),
        }
    }
}

impl std::error::Error for NativeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Nul(e) => Some(e),
            Self::Call { .. } => None,
        }
    }
}

impl From<libloading::Error> for NativeError {
    fn from(e: libloading::Error) -> Self {
        Self::Load(e)
    }
}

impl From<std::ffi::NulError> for NativeError {
    fn from(e: std::ffi::NulError) -> Self {
        Self::Nul(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_error_keeps_native_code() {
        let err = NativeError::Call { func: "GetChatData", code: 10001 };
        assert_eq!(err.code(), 10001);
        assert_eq!(err.to_string(), "native GetChatData failed with code 10001");
    }

    #[test]
    fn non_call_errors_report_minus_one() {
        let nul = std::ffi::CString::new(&b"a\0b"[..]).unwrap_err();
        assert_eq!(NativeError::Nul(nul).code(), -1);
    }
}
