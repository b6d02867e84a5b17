//! Command line definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use grid_model::Year;

#[derive(Parser)]
#[command(
    name = "grid",
    version,
    about = "Survey grid service - serve, inspect and check survey tables",
    long_about = "Serve agricultural survey tables as editable grids.\n\n\
                  Table layouts, columns and code catalogues are read from a\n\
                  directory of per-year CSV metadata."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Config file (default: ./grid.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Metadata directory with one sub-directory per survey year.
    #[arg(long = "metadata-root", value_name = "DIR", global = true)]
    pub metadata_root: Option<PathBuf>,

    /// Directory holding saved survey answers.
    #[arg(long = "data-root", value_name = "DIR", global = true)]
    pub data_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),

    /// Resolve one subtable and print its rows.
    Resolve(ResolveArgs),

    /// Check the metadata catalog for inconsistencies.
    Check,

    /// List the subtables of a survey year.
    Subtables(SubtablesArgs),
}

#[derive(Parser)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long = "listen", value_name = "ADDR")]
    pub listen: Option<SocketAddr>,
}

#[derive(Parser)]
pub struct ResolveArgs {
    #[arg(value_name = "YEAR")]
    pub year: Year,

    #[arg(value_name = "SUBTABLE")]
    pub subtable: String,

    /// Merge the saved answers of this farm.
    #[arg(long = "farm", value_name = "FARM")]
    pub farm: Option<String>,

    /// Print the description as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct SubtablesArgs {
    #[arg(value_name = "YEAR")]
    pub year: Year,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
