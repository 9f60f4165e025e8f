/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgMatches, Args, Command, FromArgMatches};
use dsi_progress_logger::prelude::*;

use crate::edge::HashMode;

pub const COMMAND_NAME: &str = "encode";

#[derive(Args, Debug)]
#[command(about = "Encodes a gzip-compressed decimal edge list into sharded varint files.")]
pub struct CliArgs {
    /// The gzip-compressed input file; one edge per whitespace-delimited
    /// pair of decimal node ids.
    pub input: PathBuf,

    #[arg(long = "files")]
    /// The number of output shard files to produce.
    pub num_shards: u32,

    #[arg(long, value_enum, default_value = "destination")]
    /// Which endpoint of each edge selects its shard.
    pub hash: HashMode,
}

pub fn cli(command: Command) -> Command {
    command.subcommand(CliArgs::augment_args(Command::new(COMMAND_NAME)).display_order(0))
}

pub fn main(submatches: &ArgMatches) -> Result<()> {
    let args = CliArgs::from_arg_matches(submatches)?;
    run(args)
}

fn run(args: CliArgs) -> Result<()> {
    anyhow::ensure!(args.num_shards >= 1, "--files must be at least 1");

    let output_prefix = strip_gz_suffix(&args.input);
    log::info!(
        "Encoding {} into {} shard(s) at {}.*.bin ({:?} hash)",
        args.input.display(),
        args.num_shards,
        output_prefix.display(),
        args.hash
    );

    let mut pl = ProgressLogger::default();
    let edges = crate::encode::encode(
        &args.input,
        &output_prefix,
        args.num_shards,
        args.hash,
        &mut pl,
    )
    .with_context(|| format!("encoding {}", args.input.display()))?;

    log::info!("Encoded {edges} edges");
    Ok(())
}

/// Derives the shard output prefix from the input path, per §6: a file
/// `foo.txt.gz` produces shards `foo.txt.<i>.bin`.
fn strip_gz_suffix(input: &Path) -> PathBuf {
    match input.to_str() {
        Some(s) if s.ends_with(".gz") => PathBuf::from(&s[..s.len() - 3]),
        _ => input.to_path_buf(),
    }
}
