/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use dsi_progress_logger::prelude::*;
use rayon::prelude::*;
use sync_cell_slice::SyncSlice;

use crate::error::{Result, ShardRankError};
use crate::executor;

/// Tunable parameters for a PageRank run (§4.6, §6).
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// `|V|`: the number of nodes. Ids are assumed dense in `[0, total)`.
    pub total: u32,
    /// Damping factor α, in `(0, 1)`. Default 0.85.
    pub alpha: f64,
    /// Number of rank iterations `K`. Default 20.
    pub iterations: u32,
    /// Per-worker batch size for the edge-apply executor. Default
    /// [`executor::BATCH_CAPACITY`].
    pub batch_size: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            total: 0,
            alpha: 0.85,
            iterations: 20,
            batch_size: executor::BATCH_CAPACITY,
        }
    }
}

/// The outcome of a completed run.
#[derive(Debug)]
pub struct PageRankResult {
    /// `rank[i]` is the final PageRank estimate for node `i`.
    pub rank: Vec<f64>,
    /// `degree[i]` is the out-degree of node `i`, as counted in Phase 0.
    pub degree: Vec<u32>,
}

/// Runs the full driver: Phase 0 (degree counting) followed by
/// `config.iterations` rank iterations, each applying the dangling-mass
/// correction described in §4.6.
///
/// `shard_paths` must be the **destination-hashed** shard set: every edge
/// pass and the degree pass both stream it, relying on atomics only in the
/// degree pass (§4.6, "atomic-only variant").
pub fn run(
    pool: &rayon::ThreadPool,
    shard_paths: &[PathBuf],
    config: &PageRankConfig,
    pl: &mut impl ProgressLog,
) -> Result<PageRankResult> {
    let n = config.total as usize;
    assert!(
        (0.0..1.0).contains(&config.alpha),
        "alpha must be in [0, 1), got {}",
        config.alpha
    );

    let degree_atomic: Vec<AtomicU32> = (0..n).map(|_| AtomicU32::new(0)).collect();

    pl.item_name("node");
    pl.expected_updates(Some(n));
    pl.start("Computing out-degrees");
    let overflow = std::sync::Mutex::new(None);
    executor::apply(pool, shard_paths, config.batch_size, |from, _to| {
        let prev = degree_atomic[from as usize].fetch_add(1, Ordering::Relaxed);
        if prev == u32::MAX {
            let mut slot = overflow.lock().unwrap();
            if slot.is_none() {
                *slot = Some((from, prev as u64 + 1));
            }
        }
    })?;
    pl.done();
    if let Some((node, attempted)) = overflow.into_inner().unwrap() {
        return Err(ShardRankError::Overflow { node, attempted });
    }

    let degree: Vec<u32> = degree_atomic
        .into_iter()
        .map(|a| a.into_inner())
        .collect();

    if n == 0 {
        return Ok(PageRankResult {
            rank: Vec::new(),
            degree,
        });
    }

    let inv_n = 1.0 / n as f64;
    let mut rank = vec![inv_n; n];
    let mut next = vec![0.0f64; n];
    let mut src = vec![0.0f64; n];

    pl.item_name("iteration");
    pl.expected_updates(Some(config.iterations as usize));
    pl.start(format!(
        "Computing PageRank (alpha={}, iterations={})",
        config.alpha, config.iterations
    ));

    for _ in 0..config.iterations {
        let dangling: f64 = pool.install(|| {
            degree
                .par_iter()
                .zip(rank.par_iter())
                .filter(|(&d, _)| d == 0)
                .map(|(_, &r)| r)
                .sum()
        });

        pool.install(|| {
            src.par_iter_mut()
                .zip(rank.par_iter())
                .zip(degree.par_iter())
                .for_each(|((s, &r), &d)| {
                    *s = if d > 0 {
                        config.alpha * r / d as f64
                    } else {
                        f64::NAN // never read: no edge has this source
                    };
                });
            let teleport = (1.0 - config.alpha) * inv_n;
            next.par_iter_mut().for_each(|x| *x = teleport);
        });

        // Each worker owns a disjoint set of destination ids (shards are
        // destination-hashed), so plain reads/writes through a SyncCell
        // view are race-free without atomics.
        let next_sync = next.as_sync_slice();
        executor::apply(pool, shard_paths, config.batch_size, |from, to| {
            // SAFETY: destination-hashed shards partition `to` ids across
            // workers one-for-one, so distinct workers never touch the
            // same index; `src` is read-only during this phase.
            unsafe {
                let cell = &next_sync[to as usize];
                cell.set(cell.get() + src[from as usize]);
            }
        })?;

        pool.install(|| {
            let dangling_share = config.alpha * dangling * inv_n;
            next.par_iter_mut().for_each(|x| *x += dangling_share);
        });

        std::mem::swap(&mut rank, &mut next);
        pl.light_update();
    }
    pl.done();

    Ok(PageRankResult { rank, degree })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::HashMode;
    use crate::executor::build_thread_pool;
    use crate::shard::ShardWriter;
    use dsi_progress_logger::no_logging;
    use tempfile::tempdir;

    fn write_shards(prefix: &std::path::Path, edges: &[(u32, u32)], num_shards: u32) -> Vec<PathBuf> {
        let mut w = ShardWriter::create(prefix, num_shards, HashMode::Destination).unwrap();
        for &(f, t) in edges {
            w.write(f, t).unwrap();
        }
        w.close().unwrap();
        ShardWriter::paths(prefix, num_shards)
    }

    #[test]
    fn empty_graph_stays_at_uniform_prior() {
        let dir = tempdir().unwrap();
        let paths = write_shards(&dir.path().join("g"), &[], 2);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 3,
            alpha: 0.85,
            iterations: 5,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        for r in result.rank {
            assert!((r - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn self_loop_conserves_total_mass() {
        let dir = tempdir().unwrap();
        let paths = write_shards(&dir.path().join("g"), &[(0, 0)], 2);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 2,
            alpha: 0.85,
            iterations: 40,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        let sum: f64 = result.rank.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
    }

    #[test]
    fn two_cycle_is_symmetric() {
        let dir = tempdir().unwrap();
        let paths = write_shards(&dir.path().join("g"), &[(0, 1), (1, 0)], 2);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 2,
            alpha: 0.85,
            iterations: 50,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        assert!((result.rank[0] - result.rank[1]).abs() < 1e-9);
        assert!((result.rank[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn dangling_triangle_conserves_mass_and_is_symmetric() {
        let dir = tempdir().unwrap();
        let paths = write_shards(&dir.path().join("g"), &[(0, 1), (0, 2)], 2);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 3,
            alpha: 0.85,
            iterations: 20,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        let sum: f64 = result.rank.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum={sum}");
        assert!((result.rank[1] - result.rank[2]).abs() < 1e-12);
        assert_eq!(result.degree[0], 2);
        assert_eq!(result.degree[1], 0);
        assert_eq!(result.degree[2], 0);
    }

    #[test]
    fn zero_alpha_is_a_teleport_floor() {
        let dir = tempdir().unwrap();
        let paths = write_shards(&dir.path().join("g"), &[(0, 1), (1, 2), (2, 0)], 2);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 3,
            alpha: 0.0,
            iterations: 10,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        for r in result.rank {
            assert!((r - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn degree_counts_match_out_edges() {
        let dir = tempdir().unwrap();
        let edges = [(0, 1), (0, 2), (1, 2), (2, 0), (2, 0)];
        let paths = write_shards(&dir.path().join("g"), &edges, 3);
        let pool = build_thread_pool(2).unwrap();
        let config = PageRankConfig {
            total: 3,
            alpha: 0.85,
            iterations: 1,
            ..PageRankConfig::default()
        };
        let result = run(&pool, &paths, &config, no_logging![]).unwrap();
        assert_eq!(result.degree, vec![2, 1, 2]);
    }
}
