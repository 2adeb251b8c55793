//! Per-chunk nonce generation
//!
//! Two strategies, both producing 24-byte XChaCha20 nonces:
//! - `OsRandom`: every nonce is 24 bytes straight from the OS random source.
//! - `SaltedCounter`: `salt (16 bytes, random per call) || chunk_index (8 bytes BE)`.
//!   Only one random draw per call, and nonces within a call can never collide.
//!   Across calls uniqueness rests on the 128-bit salt.

use rand::rngs::OsRng;
use rand::RngCore;

use chunkseal_core::{ChunkSealError, NonceStrategy, Result, NONCE_SIZE};

const SALT_SIZE: usize = NONCE_SIZE - 8;

/// Fills the nonce for the chunk at `index`.
///
/// Implementations are shared by every task of one chunked call.
pub trait NonceSource: Send + Sync {
    fn fill(&self, index: u64, nonce: &mut [u8; NONCE_SIZE]) -> Result<()>;
}

/// Fresh OS randomness for every nonce.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl NonceSource for OsRandom {
    fn fill(&self, _index: u64, nonce: &mut [u8; NONCE_SIZE]) -> Result<()> {
        fill_random(nonce)
    }
}

/// Random per-call salt followed by the chunk index.
#[derive(Debug, Clone, Copy)]
pub struct SaltedCounter {
    salt: [u8; SALT_SIZE],
}

impl SaltedCounter {
    /// Draw a fresh salt. Call once per chunked encryption.
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_SIZE];
        fill_random(&mut salt)?;
        Ok(Self { salt })
    }

    pub fn from_salt(salt: [u8; SALT_SIZE]) -> Self {
        Self { salt }
    }
}

impl NonceSource for SaltedCounter {
    fn fill(&self, index: u64, nonce: &mut [u8; NONCE_SIZE]) -> Result<()> {
        nonce[..SALT_SIZE].copy_from_slice(&self.salt);
        nonce[SALT_SIZE..].copy_from_slice(&index.to_be_bytes());
        Ok(())
    }
}

/// Build the source a chunked encryption call should use.
pub fn source_for(strategy: NonceStrategy) -> Result<Box<dyn NonceSource>> {
    Ok(match strategy {
        NonceStrategy::Random => Box::new(OsRandom),
        NonceStrategy::SaltedCounter => Box::new(SaltedCounter::generate()?),
    })
}

fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| ChunkSealError::RandomSourceFailure(e.to_string()))
}
