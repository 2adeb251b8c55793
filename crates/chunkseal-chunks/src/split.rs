//! Fixed-size chunk ranges
//!
//! Splits a buffer of `len` bytes into `ceil(len / chunk_size)` ranges.
//! Every range is exactly `chunk_size` long except possibly the last.
//! An empty buffer yields no ranges.

use std::ops::Range;

use chunkseal_core::DEFAULT_CHUNK_SIZE;

/// One chunk's position and byte span within the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Zero-based chunk position
    pub index: u64,
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl ChunkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Borrow this range's bytes out of the buffer it was split from.
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.as_range()]
    }
}

/// Number of chunks a buffer of `len` bytes splits into.
///
/// A zero `chunk_size` yields zero chunks; callers validate sizes up front.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

/// Split `len` bytes into ordered, contiguous ranges of `chunk_size` bytes.
pub fn split_ranges(len: usize, chunk_size: usize) -> Vec<ChunkRange> {
    (0..chunk_count(len, chunk_size))
        .map(|i| {
            let start = i * chunk_size;
            ChunkRange {
                index: i as u64,
                start,
                end: (start + chunk_size).min(len),
            }
        })
        .collect()
}

/// Split with the default 64 KiB chunk size.
pub fn split_default(len: usize) -> Vec<ChunkRange> {
    split_ranges(len, DEFAULT_CHUNK_SIZE)
}
