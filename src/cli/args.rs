/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Shared `clap::Args` fragments, flattened into each subcommand's arguments.

use clap::Args;

use crate::executor::BATCH_CAPACITY;

#[derive(Args, Debug)]
pub struct NumThreadsArg {
    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1))]
    /// The number of worker threads to use for the edge-apply executor.
    pub threads: usize,
}

#[derive(Args, Debug)]
pub struct BatchSizeArg {
    #[arg(long = "batch-size", default_value_t = BATCH_CAPACITY)]
    /// Edges accumulated by a worker before draining into the executor's
    /// per-edge operation.
    pub batch_size: usize,
}
