/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io::{self, BufRead};

/// Splits a byte stream on ASCII whitespace, handing back byte slices
/// instead of building an intermediate `String` per token.
///
/// Tokens are copied into a caller-supplied scratch buffer rather than
/// borrowed straight out of the internal read buffer: a token may straddle
/// two underlying `fill_buf` refills, and giving the caller a stable slice
/// either way is simpler than tracking that case specially. The scratch
/// buffer's capacity is reused across calls, so steady-state tokenizing
/// does not allocate once the buffer has grown to fit the longest token
/// seen so far.
pub struct WordTokenizer<R> {
    reader: R,
}

impl<R: BufRead> WordTokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns the next whitespace-delimited token, or `None` at EOF.
    pub fn next_token<'a>(&mut self, scratch: &'a mut Vec<u8>) -> io::Result<Option<&'a [u8]>> {
        scratch.clear();

        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            let skip = buf
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(buf.len());
            let found_non_ws = skip < buf.len();
            self.reader.consume(skip);
            if found_non_ws {
                break;
            }
        }

        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let end = buf
                .iter()
                .position(|b| b.is_ascii_whitespace())
                .unwrap_or(buf.len());
            scratch.extend_from_slice(&buf[..end]);
            let hit_whitespace = end < buf.len();
            self.reader.consume(end);
            if hit_whitespace {
                break;
            }
        }

        Ok(Some(scratch))
    }
}
