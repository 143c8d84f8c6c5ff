//! `rusty-phonon`: plots and dataset preparation for deep-potential fitting.
//!
//! ```text
//! USAGE:
//!   rusty-phonon phonon   Overlay phonon dispersions of several methods
//!   rusty-phonon lcurve   Plot training-loss columns on log-log axes
//!   rusty-phonon split    Split OUTCAR frames into DeePMD training/test sets
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use rusty_phonon::commands;
use rusty_phonon::config::{Config, MethodSource};

#[derive(Parser)]
#[command(name = "rusty-phonon", about = "Phonon and training-data tooling for deep potentials", version)]
struct Cli {
    /// JSON config file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compare phonon dispersion curves from several methods.
    Phonon {
        /// Method as NAME=PATH; repeat in plotting order, reference first.
        #[arg(long = "method", value_name = "NAME=PATH")]
        methods: Vec<MethodSource>,
        /// High-symmetry point labels, comma separated.
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dpi: Option<u32>,
        /// Also write every parsed sample as CSV.
        #[arg(long)]
        table: Option<PathBuf>,
        /// Save the figure without opening a window.
        #[arg(long)]
        no_show: bool,
    },
    /// Plot the loss columns of a training log.
    Lcurve {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Columns to plot, comma separated.
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_show: bool,
    },
    /// Pool labeled frames and export a random training/test split.
    Split {
        /// Directory whose sub-directories each hold an OUTCAR.
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        training: Option<PathBuf>,
        #[arg(long)]
        test: Option<PathBuf>,
        #[arg(long)]
        test_fraction: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        set_size: Option<usize>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Cmd::Phonon {
            methods,
            labels,
            output,
            dpi,
            table,
            no_show,
        } => {
            let cfg = &mut config.phonon;
            if !methods.is_empty() {
                cfg.methods = methods;
            }
            if let Some(labels) = labels {
                cfg.labels = labels;
            }
            if let Some(output) = output {
                cfg.output = output;
            }
            if let Some(dpi) = dpi {
                cfg.figure.dpi = dpi;
            }
            if table.is_some() {
                cfg.table = table;
            }
            cfg.show &= !no_show;
            commands::run_phonon(cfg)
        }
        Cmd::Lcurve {
            input,
            columns,
            output,
            no_show,
        } => {
            let cfg = &mut config.lcurve;
            if let Some(input) = input {
                cfg.input = input;
            }
            if let Some(columns) = columns {
                cfg.columns = columns;
            }
            if let Some(output) = output {
                cfg.output = output;
            }
            cfg.show &= !no_show;
            commands::run_lcurve(cfg)
        }
        Cmd::Split {
            root,
            training,
            test,
            test_fraction,
            seed,
            set_size,
        } => {
            let cfg = &mut config.split;
            if let Some(root) = root {
                cfg.root = root;
            }
            if let Some(training) = training {
                cfg.training_dir = training;
            }
            if let Some(test) = test {
                cfg.test_dir = test;
            }
            if let Some(fraction) = test_fraction {
                cfg.test_fraction = fraction;
            }
            if seed.is_some() {
                cfg.seed = seed;
            }
            if let Some(set_size) = set_size {
                cfg.set_size = set_size;
            }
            commands::run_split(cfg)?;
            Ok(())
        }
    }
}
