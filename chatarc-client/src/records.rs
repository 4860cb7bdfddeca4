//! Wire shape of the remote chat envelope and its decrypted form.

use serde::Deserialize;

/// Outer envelope returned by the native chat-data fetch.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatEnvelope {
    pub chatdata: Vec<RawChatRecord>,
}

/// One archived chat record, still encrypted, as returned by the service.
#[derive(Clone, Debug, Deserialize)]
pub struct RawChatRecord {
    /// Message sequence number, in service order.
    pub seq: u64,
    /// Version of the public key that wrapped this record's symmetric key.
    pub publickey_ver: u32,
    /// Base64-encoded wrapped symmetric key.
    pub encrypt_random_key: String,
    /// Encrypted message blob, opaque to this crate.
    pub encrypt_chat_msg: String,
}

/// A [`RawChatRecord`] together with its decrypted, parsed payload.
#[derive(Debug)]
pub struct DecryptedChatRecord {
    /// The record as it arrived from the service.
    pub raw: RawChatRecord,
    /// The decrypted message payload.
    pub payload: serde_json::Value,
}

impl DecryptedChatRecord {
    /// The record's sequence number.
    pub fn seq(&self) -> u64 {
        self.raw.seq
    }

    /// The key version this record was wrapped with.
    pub fn key_version(&self) -> u32 {
        self.raw.publickey_ver
    }
}
