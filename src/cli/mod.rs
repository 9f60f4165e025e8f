/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Command line interface, organized by subcommand, one module each.

pub mod args;
pub mod encode;
pub mod rank;
