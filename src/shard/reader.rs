/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::edge::unpack;
use crate::error::{Result, ShardRankError};
use crate::varint;

/// Streams `(from, to)` edges out of one shard file in file order, reversing
/// the delta encoding applied by [`super::ShardWriter`].
pub struct ShardReader {
    path: PathBuf,
    reader: BufReader<File>,
    running: u64,
    bytes_read: u64,
    /// Lookahead buffer for one varint's worth of bytes; reused across calls
    /// so decoding a single edge never allocates.
    scratch: [u8; varint::MAX_LEN],
}

impl ShardReader {
    /// Opens `path` for streaming.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ShardRankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(super::WRITER_BUFFER_BYTES, file),
            running: 0,
            bytes_read: 0,
            scratch: [0u8; varint::MAX_LEN],
        })
    }

    /// Decodes and returns the next edge, or `None` at a clean end of file.
    pub fn next(&mut self) -> Result<Option<(u32, u32)>> {
        let mut len = 0;
        loop {
            match varint::decode(&self.scratch[..len]) {
                Ok(Some((delta, consumed))) => {
                    debug_assert_eq!(consumed, len);
                    self.running = self.running.wrapping_add(delta);
                    self.bytes_read += consumed as u64;
                    return Ok(Some(unpack(self.running)));
                }
                Ok(None) if len == 0 => {
                    // Nothing buffered yet; try to read the first byte.
                    if !self.fill_one(&mut len)? {
                        return Ok(None);
                    }
                    continue;
                }
                Ok(None) => unreachable!("non-empty scratch cannot report end-of-stream"),
                Err(reason) => {
                    // Either genuinely malformed, or just need another byte
                    // (TruncatedInput is also returned while a varint is
                    // still being assembled).
                    if len == varint::MAX_LEN {
                        return Err(ShardRankError::CorruptShard {
                            path: self.path.clone(),
                            offset: self.bytes_read,
                            reason,
                        });
                    }
                    if !self.fill_one(&mut len)? {
                        return Err(ShardRankError::CorruptShard {
                            path: self.path.clone(),
                            offset: self.bytes_read,
                            reason: crate::error::VarintError::TruncatedInput,
                        });
                    }
                }
            }
        }
    }

    /// Reads one more byte into `self.scratch[len]`, advancing `len`.
    /// Returns `false` at a clean EOF with no bytes read yet this call.
    fn read_next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.reader.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(source) => Err(ShardRankError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn fill_one(&mut self, len: &mut usize) -> Result<bool> {
        match self.read_next_byte()? {
            Some(b) => {
                self.scratch[*len] = b;
                *len += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::HashMode;
    use crate::shard::ShardWriter;
    use tempfile::tempdir;

    #[test]
    fn reads_back_exactly_what_was_written() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("g");
        let edges = vec![(0, 1), (1, 2), (2, 0), (7, 7), (0, 0)];
        let mut w = ShardWriter::create(&prefix, 1, HashMode::Destination).unwrap();
        for &(from, to) in &edges {
            w.write(from, to).unwrap();
        }
        w.close().unwrap();

        let mut r = ShardReader::open(&ShardWriter::paths(&prefix, 1)[0]).unwrap();
        let mut out = Vec::new();
        while let Some(e) = r.next().unwrap() {
            out.push(e);
        }
        assert_eq!(out, edges);
    }

    #[test]
    fn corrupt_trailing_byte_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.0.bin");
        // A single 0x80 byte: continuation bit set, then nothing.
        std::fs::write(&path, [0x80u8]).unwrap();
        let mut r = ShardReader::open(&path).unwrap();
        let err = r.next().unwrap_err();
        assert!(matches!(err, ShardRankError::CorruptShard { .. }));
    }
}
