//! chunkseal-chunks: fixed-size chunk splitting
//!
//! A buffer is cut into ordered, non-overlapping ranges of `chunk_size` bytes;
//! only the final range may be shorter. The range index is the chunk's
//! position, which the crypto layer binds into each chunk's associated data.

pub mod split;

pub use split::{chunk_count, split_default, split_ranges, ChunkRange};
