//! Parallel chunked encryption and decryption
//!
//! Both directions share one fan-out/fan-in shape:
//! - one output slot per chunk, allocated before any task starts; task `i`
//!   owns slot `i` and nothing else
//! - one rayon task per chunk inside a `rayon::scope`, whose exit is the
//!   completion barrier
//! - a write-once error cell: the first task to fail records its error, later
//!   failures are dropped, and no task is cancelled
//!
//! A call either returns every chunk (or the whole plaintext) or exactly one
//! error, never a partial result.

use std::sync::OnceLock;

use chunkseal_chunks::split_ranges;
use chunkseal_core::{ChunkSealError, Result, NONCE_SIZE};

use crate::chunk::{build_aad, WireChunk};
use crate::cipher::Cipher;
use crate::nonce::{self, NonceSource};

/// Write-once holder for the first error any chunk task reports.
#[derive(Default)]
struct FirstError {
    cell: OnceLock<(u64, ChunkSealError)>,
}

impl FirstError {
    fn record(&self, index: u64, err: ChunkSealError) {
        if self.cell.set((index, err)).is_err() {
            tracing::trace!(index, "chunk failed after an earlier error was recorded");
        }
    }

    fn into_inner(self) -> Option<(u64, ChunkSealError)> {
        self.cell.into_inner()
    }
}

impl Cipher {
    /// Encrypt `plaintext` as independent chunks, in parallel.
    ///
    /// Returns one `WireChunk` per chunk range, in index order. Empty input
    /// yields an empty set. Nonces come from this cipher's configured
    /// `NonceStrategy`.
    pub fn encrypt_chunks(&self, plaintext: &[u8]) -> Result<Vec<WireChunk>> {
        let source = nonce::source_for(self.options().nonce_strategy)?;
        self.encrypt_chunks_with(plaintext, source.as_ref())
    }

    /// Encrypt with an explicit nonce source.
    pub fn encrypt_chunks_with(
        &self,
        plaintext: &[u8],
        source: &dyn NonceSource,
    ) -> Result<Vec<WireChunk>> {
        let ranges = split_ranges(plaintext.len(), self.options().chunk_size);
        tracing::debug!(
            chunks = ranges.len(),
            bytes = plaintext.len(),
            workers = self.worker_count(),
            "encrypting chunks"
        );

        let chunks = self
            .fan_out(ranges.len(), |i| {
                let range = &ranges[i];
                let mut nonce = [0u8; NONCE_SIZE];
                source.fill(range.index, &mut nonce)?;
                let aad = build_aad(range.index);
                self.seal_wire(&nonce, range.slice(plaintext), &aad)
                    .map(WireChunk::from_bytes)
            })
            .inspect_err(|err| log_failure("encrypt", err))?;

        tracing::debug!(chunks = chunks.len(), "chunk encryption complete");
        Ok(chunks)
    }

    /// Decrypt a chunk set produced by `encrypt_chunks` and reassemble it.
    ///
    /// Chunks must be in their original order and the set must be complete:
    /// position `i` is authenticated as chunk `i`.
    pub fn decrypt_chunks(&self, chunks: &[WireChunk]) -> Result<Vec<u8>> {
        self.decrypt_chunks_raw(chunks)
    }

    /// Decrypt raw `nonce || ciphertext || tag` buffers, e.g. straight from transport.
    pub fn decrypt_chunks_raw<C>(&self, chunks: &[C]) -> Result<Vec<u8>>
    where
        C: AsRef<[u8]> + Sync,
    {
        tracing::debug!(
            chunks = chunks.len(),
            workers = self.worker_count(),
            "decrypting chunks"
        );

        let parts = self
            .fan_out(chunks.len(), |i| {
                let index = i as u64;
                let bytes = chunks[i].as_ref();
                if bytes.len() < WireChunk::MIN_LEN {
                    return Err(ChunkSealError::InvalidCiphertextLength {
                        index,
                        len: bytes.len(),
                        min: WireChunk::MIN_LEN,
                    });
                }
                let (nonce, body) = bytes.split_at(NONCE_SIZE);
                self.decrypt(nonce, body, &build_aad(index))
            })
            .inspect_err(|err| log_failure("decrypt", err))?;

        // Ordered reassembly, only after every task has finished.
        let total = parts.iter().map(Vec::len).sum::<usize>();
        let mut plaintext = Vec::with_capacity(total);
        for part in &parts {
            plaintext.extend_from_slice(part);
        }

        tracing::debug!(bytes = plaintext.len(), "chunk decryption complete");
        Ok(plaintext)
    }

    /// Run `task(i)` for every `i in 0..n`, one rayon task each, and collect
    /// the results in index order.
    fn fan_out<T, F>(&self, n: usize, task: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync,
    {
        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(n).collect();
        let first_error = FirstError::default();

        self.install(|| {
            rayon::scope(|scope| {
                for (i, slot) in slots.iter_mut().enumerate() {
                    let task = &task;
                    let first_error = &first_error;
                    scope.spawn(move |_| match task(i) {
                        Ok(value) => *slot = Some(value),
                        Err(err) => first_error.record(i as u64, err),
                    });
                }
            });
        });

        if let Some((index, err)) = first_error.into_inner() {
            tracing::debug!(index, kind = err.kind(), "first chunk error");
            return Err(err);
        }

        let results: Vec<T> = slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), n, "every slot is filled when no task failed");
        Ok(results)
    }
}

fn log_failure(direction: &str, err: &ChunkSealError) {
    tracing::warn!(direction, kind = err.kind(), "chunked {direction} failed: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkseal_core::{config::ChunkingConfig, NonceStrategy, KEY_SIZE, TAG_SIZE};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_cipher() -> Cipher {
        Cipher::new(&[42u8; KEY_SIZE]).unwrap()
    }

    fn small_chunk_cipher(chunk_size: usize) -> Cipher {
        let options = ChunkingConfig {
            chunk_size,
            ..ChunkingConfig::default()
        };
        Cipher::with_options(&[42u8; KEY_SIZE], options).unwrap()
    }

    /// Fails for one chunk index and counts every call.
    struct FailingSource {
        fail_at: u64,
        calls: AtomicUsize,
    }

    impl NonceSource for FailingSource {
        fn fill(&self, index: u64, nonce: &mut [u8; NONCE_SIZE]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if index == self.fail_at {
                return Err(ChunkSealError::RandomSourceFailure("entropy unavailable".into()));
            }
            nonce.fill(index as u8);
            Ok(())
        }
    }

    #[test]
    fn test_encrypt_decrypt_chunks_roundtrip() {
        let cipher = small_chunk_cipher(16);
        let plaintext: Vec<u8> = (0u8..=255).cycle().take(1000).collect();

        let chunks = cipher.encrypt_chunks(&plaintext).unwrap();
        assert_eq!(chunks.len(), 63);

        let decrypted = cipher.decrypt_chunks(&chunks).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext_yields_no_chunks() {
        let cipher = test_cipher();
        let chunks = cipher.encrypt_chunks(b"").unwrap();
        assert!(chunks.is_empty());
        assert_eq!(cipher.decrypt_chunks(&chunks).unwrap(), b"");
    }

    #[test]
    fn test_chunk_wire_size() {
        let cipher = small_chunk_cipher(100);
        let chunks = cipher.encrypt_chunks(&[0u8; 250]).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(WireChunk::len).collect();
        let overhead = NONCE_SIZE + TAG_SIZE;
        assert_eq!(sizes, vec![100 + overhead, 100 + overhead, 50 + overhead]);
    }

    #[test]
    fn test_random_source_failure_returns_no_chunks() {
        let cipher = small_chunk_cipher(8);
        let source = FailingSource {
            fail_at: 2,
            calls: AtomicUsize::new(0),
        };

        let err = cipher.encrypt_chunks_with(&[1u8; 64], &source).unwrap_err();
        assert_eq!(
            err,
            ChunkSealError::RandomSourceFailure("entropy unavailable".into())
        );
        // No cancellation: every chunk task still ran.
        assert_eq!(source.calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_short_chunk_is_invalid_ciphertext_length() {
        let cipher = small_chunk_cipher(8);
        let mut chunks = cipher.encrypt_chunks(&[5u8; 24]).unwrap();
        chunks[1] = WireChunk::from_bytes(vec![0u8; WireChunk::MIN_LEN - 1]);

        let err = cipher.decrypt_chunks(&chunks).unwrap_err();
        assert_eq!(
            err,
            ChunkSealError::InvalidCiphertextLength {
                index: 1,
                len: WireChunk::MIN_LEN - 1,
                min: WireChunk::MIN_LEN,
            }
        );
    }

    #[test]
    fn test_only_one_error_is_reported() {
        let cipher = small_chunk_cipher(8);
        let mut chunks = cipher.encrypt_chunks(&[5u8; 80]).unwrap();
        for chunk in chunks.iter_mut() {
            *chunk = WireChunk::from_bytes(vec![0u8; 3]);
        }

        let err = cipher.decrypt_chunks(&chunks).unwrap_err();
        assert!(matches!(
            err,
            ChunkSealError::InvalidCiphertextLength { len: 3, .. }
        ));
    }

    #[test]
    fn test_raw_buffers_decrypt() {
        let cipher = small_chunk_cipher(32);
        let plaintext = vec![0x5Au8; 100];
        let raw: Vec<Vec<u8>> = cipher
            .encrypt_chunks(&plaintext)
            .unwrap()
            .into_iter()
            .map(WireChunk::into_bytes)
            .collect();

        assert_eq!(cipher.decrypt_chunks_raw(&raw).unwrap(), plaintext);
    }

    #[test]
    fn test_salted_counter_roundtrip_and_nonce_layout() {
        let options = ChunkingConfig {
            chunk_size: 16,
            workers: 0,
            nonce_strategy: NonceStrategy::SaltedCounter,
        };
        let cipher = Cipher::with_options(&[1u8; KEY_SIZE], options).unwrap();
        let plaintext = vec![0x33u8; 64];

        let chunks = cipher.encrypt_chunks(&plaintext).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(&chunk.nonce()[..16], &chunks[0].nonce()[..16]);
            assert_eq!(&chunk.nonce()[16..], &(i as u64).to_be_bytes());
        }

        // Decryption does not depend on the strategy.
        assert_eq!(test_cipher_with_key(1).decrypt_chunks(&chunks).unwrap(), plaintext);
    }

    fn test_cipher_with_key(byte: u8) -> Cipher {
        Cipher::new(&[byte; KEY_SIZE]).unwrap()
    }

    #[test]
    fn test_dedicated_pool_roundtrip() {
        let options = ChunkingConfig {
            chunk_size: 64,
            workers: 2,
            nonce_strategy: NonceStrategy::Random,
        };
        let cipher = Cipher::with_options(&[9u8; KEY_SIZE], options).unwrap();
        let plaintext: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        let chunks = cipher.encrypt_chunks(&plaintext).unwrap();
        assert_eq!(chunks.len(), 157);
        assert_eq!(cipher.decrypt_chunks(&chunks).unwrap(), plaintext);
    }
}
