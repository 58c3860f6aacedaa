//! # mzresolve
//!
//! Command-line front end for candidate formula resolution and training-set
//! preparation.
//!
//! ## Usage
//!
//! ```bash
//! # Candidate formulas for an observed mass under ammonium ionisation
//! mzresolve candidates 46.0419 --ion NH4
//!
//! # Inspect a formula
//! mzresolve formula "C2H4(NH4)"
//!
//! # Build, downsample and split a training set
//! mzresolve prepare peaks.tsv combos.csv -j 8
//! mzresolve reduce combos.csv combos_reduced.csv --keep-fraction 0.08 --seed 42
//! mzresolve split combos_reduced.csv data/run1 --seed 42
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
