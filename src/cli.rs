// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `runwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runwatch",
    version,
    about = "Run an external tool and relay its output as log lines and progress updates.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Runwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Hand the command to the platform shell (`sh -c` / `cmd /C`).
    #[arg(long)]
    pub shell: bool,

    /// Working directory for the child process.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<String>,

    /// Environment override for the child, as KEY=VALUE. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved command and run options, but don't execute.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run (overrides `[command]` from the config file).
    #[arg(trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
