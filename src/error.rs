/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The closed error taxonomy shared by the codec, shard I/O, and driver layers.

use std::path::PathBuf;

/// Everything that can go fatally wrong while encoding, reading, or ranking
/// a sharded edge list.
#[derive(Debug, thiserror::Error)]
pub enum ShardRankError {
    /// Underlying file-system or compression failure during open/read/write.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A varint decode error mid-stream.
    #[error("corrupt shard {path} at byte offset ~{offset}: {reason}")]
    CorruptShard {
        path: PathBuf,
        offset: u64,
        reason: VarintError,
    },

    /// A non-decimal token in encoder input.
    #[error("failed to parse node id from input at edge #{edge_index}: {token:?}")]
    ParseError { edge_index: u64, token: Vec<u8> },

    /// A degree counter exceeded `u32::MAX`.
    #[error("out-degree of node {node} overflowed u32 (count would be {attempted})")]
    Overflow { node: u32, attempted: u64 },
}

/// Reasons a single varint failed to decode. Kept separate from
/// [`ShardRankError`] because the codec itself has no notion of "which
/// shard" or "what offset"; that context is added by the caller.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum VarintError {
    /// The byte stream ended before a started varint was terminated.
    #[error("truncated varint: stream ended mid-sequence")]
    TruncatedInput,
    /// A 10th continuation byte was read, or its payload bits exceeded 1.
    #[error("varint overflowed 64 bits")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, ShardRankError>;
