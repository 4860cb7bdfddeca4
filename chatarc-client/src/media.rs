//! Chunked media retrieval.
//!
//! [`MediaIter`] pulls one native chunk per call and threads the opaque
//! continuation cursor between calls; [`crate::ArchiveSession::fetch_media`]
//! drains it into a single buffer.

use std::time::Duration;

use chatarc_native::ArchiveBackend;

use crate::errors::ArchiveError;

/// Iterator that pulls one media object chunk by chunk.
///
/// Call [`MediaIter::next`] in a loop until it returns `None`. Chunks come
/// back strictly in fetch order; the loop terminates when the native layer
/// sets its completion flag.
pub struct MediaIter<'a, B: ArchiveBackend> {
    backend: &'a B,
    file_id: String,
    cursor: Option<String>,
    timeout: Duration,
    done: bool,
}

impl<'a, B: ArchiveBackend> MediaIter<'a, B> {
    pub(crate) fn new(backend: &'a B, file_id: &str, timeout: Duration) -> Self {
        Self {
            backend,
            file_id: file_id.to_string(),
            cursor: None,
            timeout,
            done: false,
        }
    }

    /// Whether the native layer has reported completion.
    pub fn finished(&self) -> bool {
        self.done
    }

    /// Fetch the next chunk. Returns `None` once the native layer has
    /// reported completion.
    ///
    /// The final chunk may be empty — a media object whose very first
    /// chunk is empty and finished is simply empty, not an error.
    pub fn next(&mut self) -> Result<Option<Vec<u8>>, ArchiveError> {
        if self.done {
            return Ok(None);
        }
        let chunk = self
            .backend
            .get_media_chunk(self.cursor.as_deref(), &self.file_id, self.timeout)
            .map_err(ArchiveError::MediaFetch)?;
        if chunk.finished {
            self.done = true;
        } else {
            self.cursor = Some(chunk.cursor);
        }
        Ok(Some(chunk.data))
    }
}
