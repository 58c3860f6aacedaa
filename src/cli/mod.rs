use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mzresolve::chemistry::ReagentIon;

mod candidates;
mod config;
mod formula;
mod prepare;
mod split;

/// mzresolve - Elemental formula resolution for reagent-ion mass spectrometry
#[derive(Parser)]
#[command(name = "mzresolve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Reagent ion selector.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IonArg {
    /// Ammonium (C, H, N, O reachable)
    #[value(name = "NH4", alias = "nh4")]
    Nh4,
    /// Nitrosyl (all eight elements reachable)
    #[value(name = "NO", alias = "no")]
    No,
}

impl From<IonArg> for ReagentIon {
    fn from(arg: IonArg) -> Self {
        match arg {
            IonArg::Nh4 => ReagentIon::Ammonium,
            IonArg::No => ReagentIon::Nitrosyl,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate candidate formulas for observed masses
    Candidates {
        /// Observed m/z values
        #[arg(value_name = "MZ", required = true, num_args = 1..)]
        mz: Vec<f64>,

        /// Reagent ion
        #[arg(short, long, value_enum, default_value = "NH4")]
        ion: IonArg,

        /// Acceptance window in ppm (overrides the config file)
        #[arg(long)]
        ppm: Option<f64>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Encode, simplify and inspect formulas
    Formula {
        /// Formulas such as C2H6O or (NH4)CH2
        #[arg(value_name = "FORMULA", required = true, num_args = 1..)]
        formulas: Vec<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build a labeled combo file from an assigned peak list
    Prepare {
        /// Tab-separated peak list (formula in column 4, mass in column 5)
        #[arg(value_name = "PEAK_LIST")]
        peak_list: PathBuf,

        /// Combo file to write
        #[arg(value_name = "COMBO_OUT")]
        combo_out: PathBuf,

        /// Log of assignments no candidate matched (defaults next to COMBO_OUT)
        #[arg(short, long, value_name = "FILE")]
        unidentified: Option<PathBuf>,

        /// Use this reagent ion for every peak instead of inferring it
        #[arg(short, long, value_enum)]
        ion: Option<IonArg>,

        /// Worker threads
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Downsample negative rows of a combo file
    Reduce {
        /// Input combo file
        #[arg(value_name = "COMBO")]
        combo: PathBuf,

        /// Reduced combo file to write
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Probability of keeping each negative row
        #[arg(short, long)]
        keep_fraction: Option<f64>,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Split a combo file into train and test files
    Split {
        /// Input combo file
        #[arg(value_name = "COMBO")]
        combo: PathBuf,

        /// Output prefix; writes <PREFIX>_test_combos.csv and <PREFIX>_train_combos.csv
        #[arg(value_name = "PREFIX")]
        prefix: PathBuf,

        /// Positive rows in the test file
        #[arg(long)]
        test_positives: Option<usize>,

        /// Negative rows in the test file
        #[arg(long)]
        test_negatives: Option<usize>,

        /// RNG seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Candidates {
            mz,
            ion,
            ppm,
            json,
            config,
        } => candidates::run(mz, ReagentIon::from(ion), ppm, json, config),
        Commands::Formula { formulas, json } => formula::run(formulas, json),
        Commands::Prepare {
            peak_list,
            combo_out,
            unidentified,
            ion,
            threads,
            config,
        } => prepare::run(
            peak_list,
            combo_out,
            unidentified,
            ion.map(ReagentIon::from),
            threads,
            config,
        ),
        Commands::Reduce {
            combo,
            output,
            keep_fraction,
            seed,
            config,
        } => split::run_reduce(combo, output, keep_fraction, seed, config),
        Commands::Split {
            combo,
            prefix,
            test_positives,
            test_negatives,
            seed,
            config,
        } => split::run_split(combo, prefix, test_positives, test_negatives, seed, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_candidates() {
        let cli = Cli::try_parse_from(["mzresolve", "-vv", "candidates", "46.04", "60.02", "--ion", "NO"])
            .unwrap();
        assert_eq!(cli.verbosity(), 2);
        match cli.command {
            Commands::Candidates { mz, ion, json, .. } => {
                assert_eq!(mz, vec![46.04, 60.02]);
                assert_eq!(ReagentIon::from(ion), ReagentIon::Nitrosyl);
                assert!(!json);
            }
            _ => panic!("expected the candidates subcommand"),
        }
    }

    #[test]
    fn test_rejects_unknown_ion() {
        assert!(Cli::try_parse_from(["mzresolve", "candidates", "46.04", "--ion", "H3O"]).is_err());
    }
}
