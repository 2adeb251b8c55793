use serde::{Deserialize, Serialize};

/// XChaCha20-Poly1305 key size (256-bit)
pub const KEY_SIZE: usize = 32;

/// XChaCha20-Poly1305 extended nonce size (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag size
pub const TAG_SIZE: usize = 16;

/// Default plaintext bytes per chunk (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// How per-chunk nonces are produced during a chunked encryption call.
///
/// Decryption never needs to know: the nonce travels with every chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonceStrategy {
    /// Every chunk nonce is drawn from the OS random source.
    #[default]
    Random,
    /// One 16-byte random salt per call, followed by the big-endian chunk index.
    SaltedCounter,
}
