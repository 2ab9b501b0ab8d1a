// src/config/validate.rs

use anyhow::{Context, Result, anyhow};

use crate::config::model::ConfigFile;
use crate::stream::classify::ProgressPattern;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[command].cmd` is non-empty when the section is present
/// - `[run].poll_interval_ms >= 1`
/// - `[run].progress_pattern` compiles and has a capture group
///
/// A missing `[command]` section is allowed here; resolution against the
/// command line happens in the entry point, which errors out when neither
/// source supplies a command.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_command(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

fn validate_command(cfg: &ConfigFile) -> Result<()> {
    if let Some(command) = &cfg.command {
        if command.cmd.trim().is_empty() {
            return Err(anyhow!("[command].cmd must not be empty"));
        }
        if command.shell && !command.args.is_empty() {
            return Err(anyhow!(
                "[command].args is ignored when shell = true; put the full line in `cmd`"
            ));
        }
    }
    Ok(())
}

fn validate_run(cfg: &ConfigFile) -> Result<()> {
    if cfg.run.poll_interval_ms == 0 {
        return Err(anyhow!("[run].poll_interval_ms must be >= 1 (got 0)"));
    }

    ProgressPattern::new(&cfg.run.progress_pattern)
        .context("invalid [run].progress_pattern")?;

    Ok(())
}
