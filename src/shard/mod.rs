/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The on-disk shard format: a header-less stream of delta-encoded varints
//! over packed `(from, to)` edges.

mod reader;
mod writer;

pub use reader::ShardReader;
pub use writer::ShardWriter;

/// Shard files are buffered with at least this many bytes per shard.
pub const WRITER_BUFFER_BYTES: usize = 64 * 1024;

/// Formats the on-disk path for shard `index` of a given `prefix`, matching
/// the `<prefix>.<index>.bin` naming the encoder and ranker agree on.
#[must_use]
pub fn shard_path(prefix: &std::path::Path, index: u32) -> std::path::PathBuf {
    let mut name = prefix
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{index}.bin"));
    prefix.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn shard_path_appends_index_and_extension() {
        let p = shard_path(Path::new("/tmp/out/pld-arc"), 3);
        assert_eq!(p, Path::new("/tmp/out/pld-arc.3.bin"));
    }
}
