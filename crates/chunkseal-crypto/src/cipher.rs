//! AEAD context: a validated key bound to XChaCha20-Poly1305
//!
//! A `Cipher` is immutable after construction and `Send + Sync`, so one
//! instance can serve any number of concurrent callers and chunk tasks.

use std::sync::Arc;

use chacha20poly1305::{
    aead::{Aead, AeadInPlace, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rayon::{ThreadPool, ThreadPoolBuilder};

use chunkseal_core::config::ChunkingConfig;
use chunkseal_core::{ChunkSealError, Result, NONCE_SIZE, TAG_SIZE};

use crate::key::SecretKey;

/// Largest plaintext a single XChaCha20-Poly1305 message may carry.
pub const MAX_MESSAGE_LEN: u64 = (1 << 38) - 64;

#[derive(Clone)]
pub struct Cipher {
    aead: XChaCha20Poly1305,
    options: ChunkingConfig,
    /// Dedicated pool when `options.workers > 0`; otherwise rayon's global pool.
    pool: Option<Arc<ThreadPool>>,
}

impl Cipher {
    /// Create a cipher with default chunking options.
    ///
    /// Fails with `InvalidKeySize` unless `key` is exactly 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self::from_key(&SecretKey::from_slice(key)?))
    }

    pub fn from_key(key: &SecretKey) -> Self {
        Self {
            aead: XChaCha20Poly1305::new(key.as_bytes().into()),
            options: ChunkingConfig::default(),
            pool: None,
        }
    }

    /// Create a cipher with explicit chunking options.
    ///
    /// A non-zero `workers` count gets its own thread pool, which bounds how
    /// many chunk tasks run at once for every call on this cipher.
    pub fn with_options(key: &[u8], options: ChunkingConfig) -> Result<Self> {
        options.validate()?;

        let pool = match options.workers {
            0 => None,
            workers => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("chunkseal-worker-{i}"))
                    .build()
                    .map_err(|e| ChunkSealError::Config(format!("building worker pool: {e}")))?;
                Some(Arc::new(pool))
            }
        };

        Ok(Self {
            pool,
            options,
            ..Self::new(key)?
        })
    }

    pub fn options(&self) -> &ChunkingConfig {
        &self.options
    }

    /// Threads available to chunk tasks.
    pub fn worker_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside this cipher's pool (or the global pool).
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Single-shot seal: returns `ciphertext || tag`.
    ///
    /// Deterministic for identical inputs. The caller owns nonce uniqueness.
    pub fn encrypt(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce = check_nonce(nonce)?;
        self.aead
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| message_too_long(plaintext.len()))
    }

    /// Single-shot open of `ciphertext || tag`.
    ///
    /// A wrong key, nonce, AAD, a modified body, or a body shorter than the
    /// tag all fail with the same `AuthenticationFailure`.
    pub fn decrypt(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let nonce = check_nonce(nonce)?;
        self.aead
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| ChunkSealError::AuthenticationFailure)
    }

    /// Seal `plaintext` straight into wire layout: `nonce || ciphertext || tag`.
    pub(crate) fn seal_wire(
        &self,
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(NONCE_SIZE + plaintext.len() + TAG_SIZE);
        out.extend_from_slice(nonce);
        out.extend_from_slice(plaintext);

        let tag = self
            .aead
            .encrypt_in_place_detached(XNonce::from_slice(nonce), aad, &mut out[NONCE_SIZE..])
            .map_err(|_| message_too_long(plaintext.len()))?;
        out.extend_from_slice(&tag);
        Ok(out)
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher")
            .field("key", &"[REDACTED]")
            .field("options", &self.options)
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

fn check_nonce(nonce: &[u8]) -> Result<&XNonce> {
    if nonce.len() != NONCE_SIZE {
        return Err(ChunkSealError::InvalidNonceSize {
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }
    Ok(XNonce::from_slice(nonce))
}

fn message_too_long(len: usize) -> ChunkSealError {
    ChunkSealError::InvalidLength {
        requested: len as u64,
        max: MAX_MESSAGE_LEN,
    }
}
