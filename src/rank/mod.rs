/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The PageRank driver (§4.6): degree pass, iteration loop, dangling-mass
//! correction.

mod pagerank;

pub use pagerank::{run, PageRankConfig, PageRankResult};
