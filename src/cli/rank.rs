/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgMatches, Args, Command, FromArgMatches};
use dsi_progress_logger::prelude::*;

use crate::cli::args::{BatchSizeArg, NumThreadsArg};
use crate::executor;
use crate::rank::{self, PageRankConfig};

pub const COMMAND_NAME: &str = "rank";

#[derive(Args, Debug)]
#[command(about = "Computes PageRank over every shard matching <prefix>.*.bin.")]
pub struct CliArgs {
    #[arg(long)]
    /// The shard basename; every file matching `<prefix>.<i>.bin` is read.
    pub prefix: PathBuf,

    #[arg(long)]
    /// `|V|`, the number of nodes.
    pub nodes: u32,

    #[arg(long, default_value_t = 0.85)]
    /// The damping factor α.
    pub alpha: f64,

    #[arg(long, default_value_t = 20)]
    /// The number of rank iterations K.
    pub iterations: u32,

    #[arg(long)]
    /// If set, dump final ranks to this path as `<node_id>\t<rank>` lines.
    pub output: Option<PathBuf>,

    #[arg(long)]
    /// Suppresses progress logging.
    pub quiet: bool,

    #[clap(flatten)]
    pub num_threads: NumThreadsArg,

    #[clap(flatten)]
    pub batch_size: BatchSizeArg,
}

pub fn cli(command: Command) -> Command {
    command.subcommand(CliArgs::augment_args(Command::new(COMMAND_NAME)).display_order(1))
}

pub fn main(submatches: &ArgMatches) -> Result<()> {
    let args = CliArgs::from_arg_matches(submatches)?;
    run(args)
}

fn run(args: CliArgs) -> Result<()> {
    let shard_paths = discover_shards(&args.prefix)?;
    anyhow::ensure!(
        !shard_paths.is_empty(),
        "no shard files matching {}.*.bin",
        args.prefix.display()
    );
    log::info!(
        "Ranking {} nodes over {} shard(s) with {} threads",
        args.nodes,
        shard_paths.len(),
        args.num_threads.threads
    );

    let pool = executor::build_thread_pool(args.num_threads.threads)
        .context("building the worker thread pool")?;
    let config = PageRankConfig {
        total: args.nodes,
        alpha: args.alpha,
        iterations: args.iterations,
        batch_size: args.batch_size.batch_size,
    };

    let result = if args.quiet {
        rank::run(&pool, &shard_paths, &config, dsi_progress_logger::no_logging!())
    } else {
        let mut pl = ProgressLogger::default();
        rank::run(&pool, &shard_paths, &config, &mut pl)
    }
    .with_context(|| format!("ranking shards under {}", args.prefix.display()))?;

    if let Some(output) = &args.output {
        write_result(output, &result.rank)
            .with_context(|| format!("writing results to {}", output.display()))?;
        log::info!("Wrote {}", output.display());
    }

    Ok(())
}

/// Lists every file matching `<prefix>.<index>.bin`, sorted by `index`.
fn discover_shards(prefix: &Path) -> Result<Vec<PathBuf>> {
    let dir = prefix.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let basename = prefix
        .file_name()
        .context("--prefix must name a file, not a directory")?
        .to_string_lossy()
        .into_owned();

    let mut found: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(index) = shard_index(&name, &basename) {
            found.push((index, entry.path()));
        }
    }
    found.sort_by_key(|(index, _)| *index);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Parses `<basename>.<index>.bin` and returns `index`, or `None` if `name`
/// does not match that pattern.
fn shard_index(name: &str, basename: &str) -> Option<u32> {
    let rest = name
        .strip_prefix(basename)?
        .strip_prefix('.')?
        .strip_suffix(".bin")?;
    rest.parse().ok()
}

fn write_result(path: &Path, rank: &[f64]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (id, r) in rank.iter().enumerate() {
        writeln!(writer, "{id}\t{r:.12}")?;
    }
    writer.flush()
}
