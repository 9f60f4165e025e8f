/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The edge-apply executor: the parallelism engine shared by the degree
//! pass and every rank iteration (§4.5, §5).
//!
//! One worker is spawned per shard file inside a bounded [`rayon::ThreadPool`]
//! so repeated phase barriers (one per PageRank iteration) reuse already-live
//! threads instead of paying thread-creation cost on every call to
//! [`apply`]. Inline per-worker processing (read → batch → apply) is used
//! rather than an explicit channel hand-off, per the design notes in §9:
//! it has strictly less overhead than a goroutine-and-channel style fan-out.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Result, ShardRankError};
use crate::shard::ShardReader;

/// Default size of the per-worker batch buffer edges are drained out of,
/// decoupling shard I/O from the per-edge operation (§4.5). Configurable via
/// [`apply`]'s `batch_size` parameter; see `--batch-size` on the `rank`
/// subcommand.
pub const BATCH_CAPACITY: usize = 1 << 16; // 65,536 edges

/// Builds the thread pool the executor spawns workers into. The pool is
/// sized at process start and reused across every phase barrier.
pub fn build_thread_pool(num_threads: usize) -> std::io::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(std::io::Error::other)
}

/// Streams every shard in `shard_paths` in parallel, invoking `op(from, to)`
/// once per edge.
///
/// `op` must be safe to call concurrently from multiple worker threads: it
/// is handed `&Sync` shared state, and the caller is responsible for the
/// disjoint-writes-or-atomics discipline described in §4.6. Edges within one
/// shard are delivered in file order; there is no ordering guarantee across
/// shards. If any worker hits a [`ShardRankError::CorruptShard`] or
/// [`ShardRankError::Io`], every other worker finishes its current batch and
/// the first error observed is returned to the caller; the run is fatal
/// either way (§4.5, §7).
///
/// `batch_size` bounds how many edges a worker accumulates before draining
/// into `op`; pass [`BATCH_CAPACITY`] for the default.
pub fn apply<Op>(
    pool: &rayon::ThreadPool,
    shard_paths: &[PathBuf],
    batch_size: usize,
    op: Op,
) -> Result<()>
where
    Op: Fn(u32, u32) + Sync,
{
    let failed = AtomicBool::new(false);
    let first_error = std::sync::Mutex::new(None);

    pool.scope(|scope| {
        for path in shard_paths {
            let op = &op;
            let failed = &failed;
            let first_error = &first_error;
            scope.spawn(move |_| {
                if let Err(e) = run_worker(path, batch_size, &op, failed) {
                    failed.store(true, Ordering::Relaxed);
                    let mut slot = first_error.lock().unwrap();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
            });
        }
    });

    match first_error.into_inner().unwrap() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Runs a single shard's worker loop: stream, batch, drain.
fn run_worker<Op>(path: &Path, batch_size: usize, op: &Op, failed: &AtomicBool) -> Result<()>
where
    Op: Fn(u32, u32) + Sync,
{
    let mut reader = ShardReader::open(path)?;
    let mut batch: Vec<(u32, u32)> = Vec::with_capacity(batch_size);

    loop {
        if failed.load(Ordering::Relaxed) {
            return Ok(());
        }
        match reader.next() {
            Ok(Some(edge)) => {
                batch.push(edge);
                if batch.len() == batch_size {
                    drain(&batch, op);
                    batch.clear();
                }
            }
            Ok(None) => {
                drain(&batch, op);
                return Ok(());
            }
            Err(e @ ShardRankError::CorruptShard { .. }) | Err(e @ ShardRankError::Io { .. }) => {
                drain(&batch, op);
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}

#[inline]
fn drain<Op>(batch: &[(u32, u32)], op: &Op)
where
    Op: Fn(u32, u32),
{
    for &(from, to) in batch {
        op(from, to);
    }
}
