//! # chatarc-client
//!
//! High-level session over an organization's compliance archive.
//!
//! ## Features
//! - One native handle + one key ring per session, released on drop
//! - Paginated chat-record fetch with per-record key-versioned decryption
//! - Strict service ordering — records are never re-sorted locally
//! - Fail-fast batches: no partial batch is ever silently returned
//! - Chunked media reassembly with optional chunk/byte budgets
//! - Typed errors carrying the native status code intact
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chatarc_client::{ArchiveSession, KeyRing, SessionOptions};
//!
//! let keys = KeyRing::new([None, Some(std::fs::read_to_string("v2.pem")?)])?;
//! let session = ArchiveSession::connect(
//!     "libWeWorkFinanceSdk_C.so",
//!     "CORP_ID",
//!     "CORP_SECRET",
//!     keys,
//!     SessionOptions::default(),
//! )?;
//!
//! for record in session.fetch_chat_batch(0, 1000)? {
//!     println!("seq {}: {}", record.seq(), record.payload);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

mod errors;
mod media;
pub mod pipeline;
mod records;

pub use chatarc_crypto::{Decryptor, KeyImportError, KeyRing, UnwrapError};
pub use chatarc_native::{ArchiveBackend, FfiClient, MediaChunk, NativeError, ProxyConfig};
pub use errors::ArchiveError;
pub use media::MediaIter;
pub use records::{DecryptedChatRecord, RawChatRecord};

use std::path::Path;
use std::time::Duration;

// ─── Constants ────────────────────────────────────────────────────────────────

/// Maximum number of records one chat-data fetch may request.
///
/// The remote service rejects anything larger, so the session refuses such
/// limits up front, before a native call is issued.
pub const MAX_BATCH_LIMIT: u32 = 1000;

// ─── SessionOptions ───────────────────────────────────────────────────────────

/// Tunables for an [`ArchiveSession`].
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Per-native-call timeout. Whole seconds on the wire.
    pub timeout: Duration,
    /// Abort a media fetch still unfinished after this many chunks; no
    /// further native call is made. `None` = unbounded, which trusts the
    /// native layer to eventually set its completion flag.
    pub media_max_chunks: Option<usize>,
    /// Abort a media fetch still unfinished once the accumulator exceeds
    /// this many bytes. A fetch that completes is never rejected on size.
    pub media_max_bytes: Option<usize>,
    /// Log unwrapped key material at debug level. Never enable this
    /// outside of local debugging.
    pub trace_key_material: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            media_max_chunks: None,
            media_max_bytes: None,
            trace_key_material: false,
        }
    }
}

// ─── ArchiveSession ───────────────────────────────────────────────────────────

/// A live connection to the archive service for one organization.
///
/// Binds one corp identity and one [`KeyRing`] to one backend handle for
/// its entire lifetime; the native handle is released exactly once when
/// the session is dropped. Operations are synchronous and blocking — a
/// host wanting concurrency must wrap the session itself.
pub struct ArchiveSession<B: ArchiveBackend> {
    backend: B,
    keys: KeyRing,
    opts: SessionOptions,
}

impl ArchiveSession<FfiClient> {
    /// Load the native archive library and initialize a session with the
    /// organization's credentials.
    pub fn connect(
        lib_path: impl AsRef<Path>,
        corp_id: &str,
        corp_secret: &str,
        keys: KeyRing,
        opts: SessionOptions,
    ) -> Result<Self, ArchiveError> {
        let backend = FfiClient::connect(lib_path, corp_id, corp_secret, None)
            .map_err(ArchiveError::Init)?;
        Ok(Self::with_backend(backend, keys, opts))
    }

    /// Like [`ArchiveSession::connect`], routing the SDK's traffic
    /// through a proxy.
    pub fn connect_via_proxy(
        lib_path: impl AsRef<Path>,
        corp_id: &str,
        corp_secret: &str,
        proxy: ProxyConfig,
        keys: KeyRing,
        opts: SessionOptions,
    ) -> Result<Self, ArchiveError> {
        let backend = FfiClient::connect(lib_path, corp_id, corp_secret, Some(proxy))
            .map_err(ArchiveError::Init)?;
        Ok(Self::with_backend(backend, keys, opts))
    }
}

impl<B: ArchiveBackend> ArchiveSession<B> {
    /// Build a session over an already-initialized backend.
    pub fn with_backend(backend: B, keys: KeyRing, opts: SessionOptions) -> Self {
        log::debug!(
            "archive session over '{}' backend, {} key slot(s)",
            backend.name(),
            keys.len()
        );
        Self { backend, keys, opts }
    }

    /// Fetch and decrypt one batch of chat records starting at `seq`.
    ///
    /// Makes one native fetch, then decrypts each record in the order the
    /// service returned it. The call fails as a whole on the first record
    /// that cannot be decrypted; no partial batch is returned. Callers
    /// needing partial-result tolerance can pull the raw envelope apart
    /// through [`pipeline::decrypt_record`] themselves.
    pub fn fetch_chat_batch(
        &self,
        seq: u64,
        limit: u32,
    ) -> Result<Vec<DecryptedChatRecord>, ArchiveError> {
        if limit > MAX_BATCH_LIMIT {
            return Err(ArchiveError::InvalidLimit(limit));
        }
        let raw = self
            .backend
            .get_chat_data(seq, limit, self.opts.timeout)
            .map_err(ArchiveError::ChatFetch)?;
        let envelope: records::ChatEnvelope =
            serde_json::from_slice(&raw).map_err(ArchiveError::Envelope)?;
        log::debug!("chat batch at seq {}: {} record(s)", seq, envelope.chatdata.len());

        envelope
            .chatdata
            .into_iter()
            .map(|r| pipeline::decrypt_record(r, &self.keys, &self.backend, &self.opts))
            .collect()
    }

    /// Download all bytes of one media object.
    ///
    /// Chunks are appended strictly in fetch order until the native layer
    /// reports completion. Any failure discards the accumulator; the
    /// optional budgets in [`SessionOptions`] guard against a native layer
    /// that never finishes. They apply only while the fetch is unfinished;
    /// a fetch that runs to completion is returned whole, whatever its size.
    pub fn fetch_media(&self, file_id: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut data = Vec::new();
        let mut chunks = 0usize;
        let mut iter = self.iter_media(file_id);
        while let Some(chunk) = iter.next()? {
            data.extend_from_slice(&chunk);
            chunks += 1;
            if iter.finished() {
                break;
            }
            if let Some(max) = self.opts.media_max_chunks {
                if chunks >= max {
                    return Err(ArchiveError::MediaBudget { chunks, bytes: data.len() });
                }
            }
            if let Some(max) = self.opts.media_max_bytes {
                if data.len() > max {
                    return Err(ArchiveError::MediaBudget { chunks, bytes: data.len() });
                }
            }
        }
        log::debug!("media {file_id}: {} byte(s) in {} chunk(s)", data.len(), chunks);
        Ok(data)
    }

    /// Pull one media object chunk by chunk.
    ///
    /// Unlike [`ArchiveSession::fetch_media`], the iterator applies no
    /// chunk/byte budget — the caller sees every chunk as it arrives.
    pub fn iter_media(&self, file_id: &str) -> MediaIter<'_, B> {
        MediaIter::new(&self.backend, file_id, self.opts.timeout)
    }

    /// The session's key ring.
    pub fn key_ring(&self) -> &KeyRing {
        &self.keys
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The session's options.
    pub fn options(&self) -> &SessionOptions {
        &self.opts
    }
}
