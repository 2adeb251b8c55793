//! HKDF-SHA256 key derivation (RFC 5869)
//!
//! `extract` condenses input key material into a pseudorandom key; `expand`
//! stretches that key into as many output bytes as requested, up to
//! 255 hash blocks. Both are pure functions.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use chunkseal_core::{ChunkSealError, Result, KEY_SIZE};

use crate::key::SecretKey;

/// SHA-256 output size
pub const HASH_LEN: usize = 32;

/// Longest output `expand` can produce
pub const MAX_OUTPUT_LEN: usize = 255 * HASH_LEN;

/// Pseudorandom key, from `extract` or supplied directly. Zeroized on drop.
///
/// Only the raw bytes are held; the keyed HMAC state is rebuilt per `expand`
/// and dropped with it.
pub struct Prk {
    bytes: [u8; HASH_LEN],
}

impl Prk {
    /// Wrap a PRK obtained elsewhere, e.g. a stored or peer-derived one.
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.bytes
    }
}

impl Drop for Prk {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for Prk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prk").field("bytes", &"[REDACTED]").finish()
    }
}

/// HMAC-SHA256 of `ikm` keyed by `salt`; an absent salt is 32 zero bytes.
pub fn extract(salt: Option<&[u8]>, ikm: &[u8]) -> Prk {
    let (mut prk, _) = Hkdf::<Sha256>::extract(salt, ikm);
    let mut bytes = [0u8; HASH_LEN];
    bytes.copy_from_slice(&prk);
    prk.as_mut_slice().zeroize();
    Prk { bytes }
}

/// Expand `prk` into `length` bytes bound to `info`.
///
/// Fails with `InvalidLength` when `length` exceeds `MAX_OUTPUT_LEN` (8160).
pub fn expand(prk: &Prk, info: &[u8], length: usize) -> Result<Vec<u8>> {
    check_length(length)?;
    let mut okm = vec![0u8; length];
    expand_into(prk, info, &mut okm)?;
    Ok(okm)
}

fn check_length(length: usize) -> Result<()> {
    if length > MAX_OUTPUT_LEN {
        return Err(ChunkSealError::InvalidLength {
            requested: length as u64,
            max: MAX_OUTPUT_LEN as u64,
        });
    }
    Ok(())
}

fn expand_into(prk: &Prk, info: &[u8], okm: &mut [u8]) -> Result<()> {
    let length = okm.len();
    check_length(length)?;
    // A HASH_LEN array always satisfies from_prk's minimum length.
    let hkdf = Hkdf::<Sha256>::from_prk(&prk.bytes)
        .map_err(|_| ChunkSealError::Config("PRK shorter than one SHA-256 block".into()))?;
    hkdf.expand(info, okm)
        .map_err(|_| ChunkSealError::InvalidLength {
            requested: length as u64,
            max: MAX_OUTPUT_LEN as u64,
        })
}

/// `expand(extract(salt, ikm), info, length)`
pub fn derive_key(
    salt: Option<&[u8]>,
    ikm: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>> {
    expand(&extract(salt, ikm), info, length)
}

/// Derive a 256-bit AEAD key, e.g. a per-purpose subkey of a master secret.
pub fn derive_secret_key(salt: Option<&[u8]>, ikm: &[u8], info: &[u8]) -> Result<SecretKey> {
    let mut bytes = [0u8; KEY_SIZE];
    expand_into(&extract(salt, ikm), info, &mut bytes)?;
    let key = SecretKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}
