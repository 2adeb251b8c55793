//! chunkseal-core: types shared by every chunkseal crate
//!
//! - `error`: the error taxonomy returned by all fallible operations
//! - `config`: TOML configuration schema (chunking + logging)
//! - `types`: wire-level size constants and the nonce strategy selector

pub mod config;
pub mod error;
pub mod types;

pub use error::{ChunkSealError, Result};
pub use types::{NonceStrategy, DEFAULT_CHUNK_SIZE, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
