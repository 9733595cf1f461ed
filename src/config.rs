//! Startup parsing (§6's "Startup" contract): the router's own AS number
//! and the ordered list of `<neighbor-address>-<relationship>` tokens,
//! taken from the process's CLI arguments.
//!
//! This module is explicitly named out of scope for the core four
//! subsystems, but the process still needs it to bootstrap; it follows
//! the teacher's `main.rs` CLI shape (now via `clap`'s derive API rather
//! than the builder API the teacher predates having as a stable option).

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::error::RouterError;
use crate::neighbor::{NeighborSpec, NeighborTable};

/// Simplified inter-domain route processor.
#[derive(Parser, Debug)]
#[command(name = "bgprtr", about = "Single-process BGP-style route processor")]
pub struct Cli {
    /// This router's own autonomous system number, appended to the
    /// AS-path of every update it propagates.
    pub asn: u32,

    /// `<neighbor-address>-<relationship>` tokens, one per directly
    /// connected neighbor (relationship is one of `cust`, `peer`, `prov`).
    #[arg(required = true, num_args = 1..)]
    pub neighbors: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding the per-neighbor Unix domain sockets.
    #[arg(long, default_value = "/tmp")]
    pub socket_dir: PathBuf,
}

impl Cli {
    pub fn level_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Parse and validate the neighbor tokens into a fixed `NeighborTable`,
    /// failing fast (non-zero exit, per §6) on any malformed or duplicate
    /// entry.
    pub fn neighbor_table(&self) -> Result<NeighborTable, RouterError> {
        let specs: Vec<NeighborSpec> = self
            .neighbors
            .iter()
            .map(|token| token.parse())
            .collect::<Result<_, _>>()?;
        NeighborTable::from_specs(&specs)
    }
}
