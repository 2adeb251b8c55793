//! chunkseal-crypto: parallel chunked authenticated encryption
//!
//! Architecture: Split-then-Encrypt with XChaCha20-Poly1305
//!
//! ```text
//! plaintext ─► split into 64 KiB ranges ─► one rayon task per range
//!                                          ├─ nonce  = 24 fresh bytes
//!                                          ├─ aad    = chunk_index (8 bytes, big-endian)
//!                                          └─ chunk  = nonce || ciphertext || tag
//! ```
//!
//! Decryption fans out the same way and concatenates the plaintexts in index
//! order once every task has finished. A chunk's index is never written to the
//! wire: it is the chunk's position in the returned list, so moving a chunk to
//! a different position breaks its tag.
//!
//! Key derivation (`kdf`) is HKDF-SHA256 extract-then-expand.

pub mod chunk;
pub mod cipher;
pub mod kdf;
pub mod key;
pub mod nonce;
pub mod parallel;

pub use chunk::{build_aad, WireChunk};
pub use cipher::Cipher;
pub use kdf::{derive_key, derive_secret_key, expand, extract, Prk};
pub use key::SecretKey;
pub use nonce::{NonceSource, OsRandom, SaltedCounter};

pub use chunkseal_core::config::ChunkingConfig;
pub use chunkseal_core::{
    ChunkSealError, NonceStrategy, Result, DEFAULT_CHUNK_SIZE, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
};
