/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::edge::{pack, HashMode};
use crate::error::{Result, ShardRankError};

use super::{shard_path, WRITER_BUFFER_BYTES};

struct Sink {
    path: PathBuf,
    writer: BufWriter<File>,
    last_packed: u64,
}

/// Fans edges out across `num_shards` buffered sinks, delta-encoding each
/// shard's packed-edge stream independently.
///
/// Edges are written in whatever order the caller supplies them (the
/// encoder does not sort), so successive deltas within a shard may be
/// negative; [`ShardWriter::write`] always uses wrapping 64-bit arithmetic,
/// per §3/§4.3 of the format.
pub struct ShardWriter {
    sinks: Vec<Sink>,
    mode: HashMode,
    num_shards: u32,
}

impl ShardWriter {
    /// Creates one output file per shard at `<prefix>.<i>.bin`, truncating
    /// any existing file.
    pub fn create(prefix: &Path, num_shards: u32, mode: HashMode) -> Result<Self> {
        assert!(num_shards >= 1, "num_shards must be at least 1");
        let mut sinks = Vec::with_capacity(num_shards as usize);
        for i in 0..num_shards {
            let path = shard_path(prefix, i);
            let file = File::create(&path).map_err(|source| ShardRankError::Io {
                path: path.clone(),
                source,
            })?;
            sinks.push(Sink {
                path,
                writer: BufWriter::with_capacity(WRITER_BUFFER_BYTES, file),
                last_packed: 0,
            });
        }
        Ok(Self {
            sinks,
            mode,
            num_shards,
        })
    }

    /// Returns the paths this writer will produce, in shard order.
    #[must_use]
    pub fn paths(prefix: &Path, num_shards: u32) -> Vec<PathBuf> {
        (0..num_shards).map(|i| shard_path(prefix, i)).collect()
    }

    /// Packs `(from, to)`, routes it to the shard selected by the writer's
    /// [`HashMode`], and appends its delta-encoded varint.
    pub fn write(&mut self, from: u32, to: u32) -> Result<()> {
        let w = pack(from, to);
        let shard = self.mode.shard_of(from, to, self.num_shards) as usize;
        let sink = &mut self.sinks[shard];
        let delta = w.wrapping_sub(sink.last_packed);
        let mut buf = [0u8; crate::varint::MAX_LEN];
        let len = crate::varint::encode(delta, &mut buf);
        sink.writer
            .write_all(&buf[..len])
            .map_err(|source| ShardRankError::Io {
                path: sink.path.clone(),
                source,
            })?;
        sink.last_packed = w;
        Ok(())
    }

    /// Flushes and closes every shard's sink. Consumes the writer: a
    /// half-flushed writer on a mid-write failure is not meant to be reused.
    pub fn close(mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.writer
                .flush()
                .map_err(|source| ShardRankError::Io {
                    path: sink.path.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
