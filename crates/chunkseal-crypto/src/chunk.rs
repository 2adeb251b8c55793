//! Wire encoding of one encrypted chunk
//!
//! Encrypted chunk format (binary):
//! ```text
//! [24 bytes: nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! AAD = chunk_index (8 bytes, big-endian)
//! ```
//!
//! The chunk index is not stored. It is the chunk's position in the
//! encrypted set, recomputed on decryption, so a chunk moved to another
//! position fails authentication.

use chunkseal_core::{NONCE_SIZE, TAG_SIZE};

/// A single `nonce || ciphertext || tag` chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct WireChunk {
    bytes: Vec<u8>,
}

impl WireChunk {
    /// Smallest well-formed chunk: a nonce plus the tag of an empty plaintext.
    pub const MIN_LEN: usize = NONCE_SIZE + TAG_SIZE;

    /// Wrap raw bytes received from storage or transport.
    ///
    /// Not validated here; `Cipher::decrypt_chunks` rejects short chunks.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The nonce prefix (shorter than 24 bytes only for a malformed chunk).
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[..NONCE_SIZE.min(self.bytes.len())]
    }

    /// Ciphertext followed by the tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[NONCE_SIZE.min(self.bytes.len())..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Plaintext length this chunk decrypts to, if well-formed.
    pub fn plaintext_len(&self) -> Option<usize> {
        self.bytes.len().checked_sub(Self::MIN_LEN)
    }
}

impl AsRef<[u8]> for WireChunk {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for WireChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<WireChunk> for Vec<u8> {
    fn from(chunk: WireChunk) -> Self {
        chunk.bytes
    }
}

impl std::fmt::Debug for WireChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireChunk")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Build AAD: chunk_index (8 bytes BE)
pub fn build_aad(chunk_index: u64) -> [u8; 8] {
    chunk_index.to_be_bytes()
}
