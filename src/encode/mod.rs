/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The encoder driver (§4.7): streams a gzip-compressed, whitespace-delimited
//! decimal edge list into sharded varint files.

mod tokenizer;

use std::io::BufReader;
use std::path::Path;

use dsi_progress_logger::prelude::*;
use flate2::read::GzDecoder;

use crate::edge::HashMode;
use crate::error::{Result, ShardRankError};
use crate::shard::ShardWriter;

use tokenizer::WordTokenizer;

/// Reads a gzip-compressed whitespace-delimited edge list from `input` and
/// writes `num_shards` shard files at `<output_prefix>.<i>.bin`.
///
/// Returns the number of edges encoded.
pub fn encode(
    input: &Path,
    output_prefix: &Path,
    num_shards: u32,
    mode: HashMode,
    pl: &mut impl ProgressLog,
) -> Result<u64> {
    let file = std::fs::File::open(input).map_err(|source| ShardRankError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let gunzip = GzDecoder::new(BufReader::new(file));
    let mut tokenizer = WordTokenizer::new(BufReader::new(gunzip));
    let mut writer = ShardWriter::create(output_prefix, num_shards, mode)?;

    pl.item_name("edge");
    pl.expected_updates(None);
    pl.start("Encoding edge list");

    let mut scratch = Vec::with_capacity(16);
    let mut edge_index = 0u64;
    loop {
        let from_tok = read_token(&mut tokenizer, &mut scratch, input)?;
        let Some(from_bytes) = from_tok else {
            break;
        };
        let from = parse_decimal_u32(from_bytes, edge_index)?;

        let to_tok = read_token(&mut tokenizer, &mut scratch, input)?;
        let Some(to_bytes) = to_tok else {
            return Err(ShardRankError::ParseError {
                edge_index,
                token: Vec::new(),
            });
        };
        let to = parse_decimal_u32(to_bytes, edge_index)?;

        writer.write(from, to)?;
        edge_index += 1;
        pl.light_update();
    }

    writer.close()?;
    pl.done();
    Ok(edge_index)
}

fn read_token<'a, R: std::io::BufRead>(
    tokenizer: &mut WordTokenizer<R>,
    scratch: &'a mut Vec<u8>,
    input: &Path,
) -> Result<Option<&'a [u8]>> {
    tokenizer
        .next_token(scratch)
        .map_err(|source| ShardRankError::Io {
            path: input.to_path_buf(),
            source,
        })
}

/// Parses a run of ASCII decimal digits directly into a `u32`, without
/// building an intermediate `String` (§4.3 performance contract).
fn parse_decimal_u32(bytes: &[u8], edge_index: u64) -> Result<u32> {
    if bytes.is_empty() {
        return Err(ShardRankError::ParseError {
            edge_index,
            token: bytes.to_vec(),
        });
    }
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return Err(ShardRankError::ParseError {
                edge_index,
                token: bytes.to_vec(),
            });
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u32))
            .ok_or_else(|| ShardRankError::ParseError {
                edge_index,
                token: bytes.to_vec(),
            })?;
    }
    Ok(value)
}
