//! `grid` command line.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use grid_cli::config::{FileConfig, Overrides, Settings};
use grid_cli::logging::{LogConfig, LogFormat, init_logging};
use grid_schema::METADATA_ENV_VAR;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_check, run_resolve, run_serve, run_subtables};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let settings = settings_from_cli(cli)?;
    match &cli.command {
        Command::Serve(_) => run_serve(&settings).map(|()| 0),
        Command::Resolve(args) => run_resolve(args, &settings).map(|()| 0),
        Command::Subtables(args) => run_subtables(args, &settings).map(|()| 0),
        Command::Check => run_check(&settings).map(|errors| i32::from(errors > 0)),
    }
}

fn settings_from_cli(cli: &Cli) -> Result<Settings> {
    let file = FileConfig::discover(cli.config.as_deref(), Path::new("."))?;
    let listen = match &cli.command {
        Command::Serve(args) => args.listen,
        Command::Resolve(_) | Command::Check | Command::Subtables(_) => None,
    };
    let overrides = Overrides {
        listen,
        metadata_root: cli.metadata_root.clone(),
        data_root: cli.data_root.clone(),
    };
    let env_root = std::env::var_os(METADATA_ENV_VAR).map(PathBuf::from);
    Settings::resolve(file, overrides, env_root)
}

/// Explicit flags win over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
