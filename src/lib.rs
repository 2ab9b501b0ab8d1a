// src/lib.rs

pub mod cli;
pub mod config;
pub mod logging;
pub mod proc;
pub mod sink;
pub mod stream;

use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::proc::{CommandSpec, Supervisor, SupervisorOptions};
use crate::sink::TracingSink;
use crate::stream::classify::ProgressPattern;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - command-spec resolution (CLI command beats `[command]` in the config)
/// - the process supervisor with a tracing-backed sink
///
/// Returns the child's exit code; non-zero is data, not an error.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_config(&args)?;
    let spec = resolve_spec(&args, &cfg)?;
    let options = resolve_options(&cfg)?;

    if args.dry_run {
        print_dry_run(&spec, &cfg);
        return Ok(0);
    }

    let supervisor = Supervisor::new(options);
    let mut sink = TracingSink;
    supervisor.run(&spec, &mut sink).await
}

/// Load config from `--config`, or `Runwatch.toml` if present, or defaults.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    if let Some(path) = &args.config {
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!(path = ?default_path, "loading default config file");
        load_and_validate(default_path)
    } else {
        debug!("no config file found, using built-in defaults");
        Ok(ConfigFile::default())
    }
}

/// Build the immutable command spec from CLI args and config.
///
/// A command given on the command line replaces the config's `[command]`
/// section entirely; `--cwd` and `--env` apply on top of either source.
fn resolve_spec(args: &CliArgs, cfg: &ConfigFile) -> Result<CommandSpec> {
    let mut spec = if !args.command.is_empty() {
        if args.shell {
            CommandSpec::shell(args.command.join(" "))
        } else {
            let (program, rest) = args
                .command
                .split_first()
                .ok_or_else(|| anyhow!("empty command"))?;
            CommandSpec::new(program).args(rest.iter().cloned())
        }
    } else if let Some(section) = &cfg.command {
        let mut spec = if section.shell {
            CommandSpec::shell(&section.cmd)
        } else {
            CommandSpec::new(&section.cmd).args(section.args.iter().cloned())
        };
        if let Some(cwd) = &section.cwd {
            spec = spec.cwd(cwd);
        }
        if !section.inherit_env {
            spec = spec.clear_env();
        }
        for key in &section.env_remove {
            spec = spec.env_remove(key);
        }
        for (key, value) in &section.env {
            spec = spec.env(key, value);
        }
        spec
    } else {
        return Err(anyhow!(
            "no command given: pass one after the flags or set [command] in the config file"
        ));
    };

    if let Some(cwd) = &args.cwd {
        spec = spec.cwd(cwd);
    }
    for pair in &args.env {
        let (key, value) = split_env_pair(pair)?;
        spec = spec.env(key, value);
    }

    Ok(spec)
}

fn resolve_options(cfg: &ConfigFile) -> Result<SupervisorOptions> {
    Ok(SupervisorOptions {
        poll_interval: Duration::from_millis(cfg.run.poll_interval_ms),
        progress_pattern: ProgressPattern::new(&cfg.run.progress_pattern)?,
        suppress_blank_stdout: cfg.run.suppress_blank_stdout,
        suppress_blank_stderr: cfg.run.suppress_blank_stderr,
    })
}

fn split_env_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .ok_or_else(|| anyhow!("invalid --env value '{pair}': expected KEY=VALUE"))
}

/// Simple dry-run output: print the resolved command and run options.
fn print_dry_run(spec: &CommandSpec, cfg: &ConfigFile) {
    println!("runwatch dry-run");
    println!("  command: {}", spec.display_line());
    println!("  shell: {}", spec.is_shell());
    if let Some(dir) = spec.working_dir() {
        println!("  cwd: {}", dir.display());
    }
    println!("  run.poll_interval_ms = {}", cfg.run.poll_interval_ms);
    println!("  run.progress_pattern = {}", cfg.run.progress_pattern);
    println!(
        "  run.suppress_blank_stdout = {}",
        cfg.run.suppress_blank_stdout
    );
    println!(
        "  run.suppress_blank_stderr = {}",
        cfg.run.suppress_blank_stderr
    );

    debug!("dry-run complete (no execution)");
}
