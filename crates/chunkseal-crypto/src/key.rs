//! 256-bit AEAD key material

use rand::RngCore;
use zeroize::Zeroize;

use chunkseal_core::{ChunkSealError, Result, KEY_SIZE};

/// A 256-bit XChaCha20-Poly1305 key. Zeroized on drop.
#[derive(Clone)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of an arbitrary slice, rejecting anything but 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let bytes = <[u8; KEY_SIZE]>::try_from(key).map_err(|_| ChunkSealError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Generate a random key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
