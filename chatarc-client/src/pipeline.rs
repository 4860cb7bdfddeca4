//! Per-record decryption: symmetric-key unwrap plus native payload
//! decryption.
//!
//! [`decrypt_record`] is exported so callers that want to tolerate
//! per-record failures (the session itself is fail-fast) can drive raw
//! records through it one at a time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chatarc_crypto::KeyRing;
use chatarc_native::ArchiveBackend;

use crate::SessionOptions;
use crate::errors::ArchiveError;
use crate::records::{DecryptedChatRecord, RawChatRecord};

/// Decrypt a single raw record.
///
/// Steps: base64-decode the wrapped key, look up the decryptor for the
/// record's key version, unwrap with fresh blinding randomness, hand the
/// unwrapped key to the native decryption primitive, parse the result as
/// JSON. A record whose key version has no private key loaded fails with
/// [`ArchiveError::KeyNotLoaded`] — a wrong-version key is never tried.
pub fn decrypt_record<B: ArchiveBackend>(
    raw: RawChatRecord,
    keys: &KeyRing,
    backend: &B,
    opts: &SessionOptions,
) -> Result<DecryptedChatRecord, ArchiveError> {
    let wrapped = BASE64
        .decode(&raw.encrypt_random_key)
        .map_err(ArchiveError::WrappedKeyEncoding)?;

    let decryptor = match keys.decryptor(raw.publickey_ver) {
        Some(d) => d,
        None => {
            log::warn!(
                "no private key loaded for v{}, cannot decrypt seq {}",
                raw.publickey_ver,
                raw.seq
            );
            return Err(ArchiveError::KeyNotLoaded(raw.publickey_ver));
        }
    };

    let key = decryptor.unwrap_key(&wrapped).map_err(ArchiveError::KeyUnwrap)?;
    if opts.trace_key_material {
        // Explicit opt-in only; key material stays out of logs otherwise.
        log::debug!(
            "seq {} v{} unwrapped key {}",
            raw.seq,
            raw.publickey_ver,
            hex(&key)
        );
    }

    let plain = backend
        .decrypt_payload(&key, raw.encrypt_chat_msg.as_bytes())
        .map_err(ArchiveError::PayloadDecrypt)?;
    let payload = serde_json::from_slice(&plain).map_err(ArchiveError::PayloadParse)?;

    Ok(DecryptedChatRecord { raw, payload })
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formats_lowercase_pairs() {
        assert_eq!(hex(&[0x00, 0xab, 0x5a]), "00ab5a");
    }
}
