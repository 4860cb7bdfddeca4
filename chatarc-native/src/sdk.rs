//! Runtime binding of the proprietary archive shared library.
//!
//! Mirrors the SDK's C ABI one to one: an opaque handle from `NewSdk`,
//! `Init` with the corp credentials, three data calls filling out-structs,
//! and `DestroySdk` at teardown. Buffers the library hands back stay valid
//! only until the next call on the same handle, so every result is copied
//! into owned memory before control returns to the caller.

use std::ffi::{CString, c_char, c_int, c_uint, c_ulonglong, c_void};
use std::fmt;
use std::path::Path;
use std::ptr;
use std::slice;
use std::sync::Mutex;
use std::time::Duration;

use libloading::{Library, Symbol};

use crate::{ArchiveBackend, MediaChunk, NativeError};

// ─── C ABI ────────────────────────────────────────────────────────────────────

/// Out-buffer filled by `GetChatData` and `DecryptData`.
#[repr(C)]
struct RawSlice {
    buf: *const c_void,
    len: c_int,
}

impl RawSlice {
    fn empty() -> Self {
        Self { buf: ptr::null(), len: 0 }
    }

    /// Copy the native buffer into owned memory.
    ///
    /// # Safety
    /// `buf`/`len` must describe a live native allocation (or be
    /// null/zero), as filled in by the native call that just returned.
    unsafe fn copy_out(&self) -> Vec<u8> {
        if self.buf.is_null() || self.len <= 0 {
            return Vec::new();
        }
        unsafe { slice::from_raw_parts(self.buf as *const u8, self.len as usize) }.to_vec()
    }
}

/// Out-struct filled by `GetMediaData`.
#[repr(C)]
struct RawMedia {
    out_index_buf: *const c_void,
    out_len: c_int,
    data: *const c_void,
    data_len: c_int,
    is_finish: c_int,
}

impl RawMedia {
    fn empty() -> Self {
        Self {
            out_index_buf: ptr::null(),
            out_len: 0,
            data: ptr::null(),
            data_len: 0,
            is_finish: 0,
        }
    }
}

type NewSdkFn = unsafe extern "C" fn() -> *mut c_void;
type InitFn = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char) -> c_int;
type GetChatDataFn = unsafe extern "C" fn(
    *mut c_void,
    c_ulonglong,
    c_uint,
    *const c_char,
    *const c_char,
    c_int,
    *mut RawSlice,
) -> c_int;
type DecryptDataFn = unsafe extern "C" fn(*const c_char, *const c_char, *mut RawSlice) -> c_int;
type GetMediaDataFn = unsafe extern "C" fn(
    *mut c_void,
    *const c_char,
    *const c_char,
    *const c_char,
    *const c_char,
    c_int,
    *mut RawMedia,
) -> c_int;
type DestroySdkFn = unsafe extern "C" fn(*mut c_void);

fn timeout_secs(timeout: Duration) -> c_int {
    timeout.as_secs().min(c_int::MAX as u64) as c_int
}

// ─── ProxyConfig ──────────────────────────────────────────────────────────────

/// Outbound proxy for the native SDK's own traffic.
///
/// Forwarded verbatim to every data call; the SDK interprets the values.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Proxy address, e.g. `socks5://10.0.0.1:1080`.
    pub address: String,
    /// Proxy credentials in the form the SDK expects (`user:password`).
    pub password: String,
}

// ─── FfiClient ────────────────────────────────────────────────────────────────

/// The real [`ArchiveBackend`]: one loaded library plus one live handle.
///
/// The handle is a scarce resource — created once by [`FfiClient::connect`]
/// and released exactly once on drop. The library's thread-safety is not
/// documented, so every call on the handle is serialized through an
/// internal lock.
pub struct FfiClient {
    lib: Library,
    handle: *mut c_void,
    proxy: Option<(CString, CString)>,
    call_lock: Mutex<()>,
}

// The raw handle makes this type !Send/!Sync by default. All access to it
// goes through `call_lock`, and the handle is never shared outside `self`.
unsafe impl Send for FfiClient {}
unsafe impl Sync for FfiClient {}

impl fmt::Debug for FfiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose the proxy credentials through Debug.
        f.debug_struct("FfiClient")
            .field("handle", &self.handle)
            .field("proxy", &self.proxy.is_some())
            .finish_non_exhaustive()
    }
}

impl FfiClient {
    /// Load the archive library, create a handle and initialize it with
    /// the organization's credentials.
    ///
    /// A nonzero `Init` return surfaces as `NativeError::Call` with the
    /// code intact; the handle is destroyed before the error is returned,
    /// so no resource outlives a failed construction.
    pub fn connect(
        lib_path: impl AsRef<Path>,
        corp_id: &str,
        corp_secret: &str,
        proxy: Option<ProxyConfig>,
    ) -> Result<Self, NativeError> {
        let lib = unsafe { Library::new(lib_path.as_ref()) }?;

        // Resolve everything up front: a missing symbol must fail before a
        // handle exists, never after.
        unsafe {
            lib.get::<NewSdkFn>(b"NewSdk\0")?;
            lib.get::<InitFn>(b"Init\0")?;
            lib.get::<GetChatDataFn>(b"GetChatData\0")?;
            lib.get::<DecryptDataFn>(b"DecryptData\0")?;
            lib.get::<GetMediaDataFn>(b"GetMediaData\0")?;
            lib.get::<DestroySdkFn>(b"DestroySdk\0")?;
        }

        let corp_id = CString::new(corp_id)?;
        let corp_secret = CString::new(corp_secret)?;
        let proxy = match proxy {
            Some(p) => Some((CString::new(p.address)?, CString::new(p.password)?)),
            None => None,
        };

        let handle = unsafe {
            let new_sdk: Symbol<NewSdkFn> = lib.get(b"NewSdk\0")?;
            new_sdk()
        };

        let ret = unsafe {
            let init: Symbol<InitFn> = lib.get(b"Init\0")?;
            init(handle, corp_id.as_ptr(), corp_secret.as_ptr())
        };
        if ret != 0 {
            unsafe {
                if let Ok(destroy) = lib.get::<DestroySdkFn>(b"DestroySdk\0") {
                    destroy(handle);
                }
            }
            log::error!("native sdk init failed with code {ret}");
            return Err(NativeError::Call { func: "Init", code: ret });
        }

        log::debug!("native sdk initialized");
        Ok(Self { lib, handle, proxy, call_lock: Mutex::new(()) })
    }

    fn proxy_ptrs(&self) -> (*const c_char, *const c_char) {
        match &self.proxy {
            Some((addr, passwd)) => (addr.as_ptr(), passwd.as_ptr()),
            None => (ptr::null(), ptr::null()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.call_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ArchiveBackend for FfiClient {
    fn get_chat_data(
        &self,
        seq: u64,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, NativeError> {
        let _guard = self.lock();
        let (proxy, passwd) = self.proxy_ptrs();
        let mut out = RawSlice::empty();
        let ret = unsafe {
            let f: Symbol<GetChatDataFn> = self.lib.get(b"GetChatData\0")?;
            f(
                self.handle,
                seq as c_ulonglong,
                limit as c_uint,
                proxy,
                passwd,
                timeout_secs(timeout),
                &mut out,
            )
        };
        if ret != 0 {
            log::error!("GetChatData(seq {seq}, limit {limit}) failed with code {ret}");
            return Err(NativeError::Call { func: "GetChatData", code: ret });
        }
        Ok(unsafe { out.copy_out() })
    }

    fn decrypt_payload(&self, key: &[u8], encrypted: &[u8]) -> Result<Vec<u8>, NativeError> {
        let _guard = self.lock();
        let key = CString::new(key)?;
        let encrypted = CString::new(encrypted)?;
        let mut out = RawSlice::empty();
        let ret = unsafe {
            let f: Symbol<DecryptDataFn> = self.lib.get(b"DecryptData\0")?;
            f(key.as_ptr(), encrypted.as_ptr(), &mut out)
        };
        if ret != 0 {
            log::error!("DecryptData failed with code {ret}");
            return Err(NativeError::Call { func: "DecryptData", code: ret });
        }
        Ok(unsafe { out.copy_out() })
    }

    fn get_media_chunk(
        &self,
        cursor: Option<&str>,
        file_id: &str,
        timeout: Duration,
    ) -> Result<MediaChunk, NativeError> {
        let _guard = self.lock();
        let file_id_c = CString::new(file_id)?;
        let cursor_c = match cursor {
            Some(c) => Some(CString::new(c)?),
            None => None,
        };
        let (proxy, passwd) = self.proxy_ptrs();
        let mut out = RawMedia::empty();
        let ret = unsafe {
            let f: Symbol<GetMediaDataFn> = self.lib.get(b"GetMediaData\0")?;
            f(
                self.handle,
                cursor_c.as_ref().map_or(ptr::null(), |c| c.as_ptr()),
                file_id_c.as_ptr(),
                proxy,
                passwd,
                timeout_secs(timeout),
                &mut out,
            )
        };
        if ret != 0 {
            log::error!("GetMediaData({file_id}) failed with code {ret}");
            return Err(NativeError::Call { func: "GetMediaData", code: ret });
        }

        // Both the data and the continuation cursor live in native memory;
        // copy them out before anything else touches the handle.
        let data = unsafe {
            RawSlice { buf: out.data, len: out.data_len }.copy_out()
        };
        let cursor = unsafe {
            RawSlice { buf: out.out_index_buf, len: out.out_len }.copy_out()
        };
        Ok(MediaChunk {
            data,
            cursor: String::from_utf8_lossy(&cursor).into_owned(),
            finished: out.is_finish != 0,
        })
    }

    fn name(&self) -> &str {
        "native-ffi"
    }
}

impl Drop for FfiClient {
    fn drop(&mut self) {
        // SAFETY: the handle came from NewSdk, is destroyed here exactly
        // once, and nothing can use it afterwards.
        unsafe {
            if let Ok(destroy) = self.lib.get::<DestroySdkFn>(b"DestroySdk\0") {
                destroy(self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_is_a_load_error() {
        let err = FfiClient::connect("/nonexistent/libarchive.so", "corp", "secret", None)
            .unwrap_err();
        assert!(matches!(err, NativeError::Load(_)));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn timeout_is_whole_seconds() {
        assert_eq!(timeout_secs(Duration::from_secs(10)), 10);
        assert_eq!(timeout_secs(Duration::from_millis(2500)), 2);
    }
}
