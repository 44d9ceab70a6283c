use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "kpotier",
    version,
    about = "selfdiff - mean-squared displacement and velocity autocorrelation of molecular centers of mass from LAMMPS trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the correlation sweep.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mean-squared displacement of the molecular centers of mass (unwraps first if `pbc` is set).
    Msd(AnalysisArgs),
    /// Velocity autocorrelation of the molecular centers of mass, read from `vx vy vz`.
    Vac(AnalysisArgs),
    /// Only write the unwrapped copy of a periodic trajectory.
    Unwrap(UnwrapArgs),
}

/// Arguments shared by the `msd` and `vac` subcommands.
#[derive(Args, Debug)]
pub struct AnalysisArgs {
    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    // --- Frame Window Overrides ---
    /// Override the number of leading frames to skip.
    #[arg(long, value_name = "INT")]
    pub start: Option<usize>,

    /// Override the end of the frame window (exclusive).
    #[arg(long, value_name = "INT")]
    pub end: Option<usize>,

    /// Override the number of frames kept in memory.
    #[arg(long, value_name = "INT")]
    pub mem: Option<usize>,

    /// Path for the result file. Defaults to `<trajectory>_msd.out` or `<trajectory>_vac.out`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S dt=0.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `unwrap` subcommand.
#[derive(Args, Debug)]
pub struct UnwrapArgs {
    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path for the unwrapped trajectory. Defaults to `<stem>_nopbc.<ext>` next to the input.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
