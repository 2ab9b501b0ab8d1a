// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::stream::classify::DEFAULT_PROGRESS_PATTERN;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [command]
/// cmd = "sdnaintegral"
/// args = ["--net", "network.shp"]
/// cwd = "/data/run"
///
/// [command.env]
/// PYTHONUNBUFFERED = "1"
///
/// [run]
/// poll_interval_ms = 300
/// progress_pattern = '^Progress:\s*([0-9]+(?:\.[0-9]+)?)%$'
/// ```
///
/// All sections are optional and have reasonable defaults; `[command]` may be
/// omitted entirely when the command is given on the command line instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// The command to supervise, from `[command]`.
    #[serde(default)]
    pub command: Option<CommandSection>,

    /// Run behaviour from `[run]`.
    #[serde(default)]
    pub run: RunSection,
}

/// `[command]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    /// Executable to run, or the full command line when `shell = true`.
    pub cmd: String,

    /// Arguments passed verbatim; ignored when `shell = true`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Hand `cmd` to the platform shell instead of executing it directly.
    #[serde(default)]
    pub shell: bool,

    /// Working directory for the child.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Environment variables set (or overridden) for the child.
    ///
    /// The usual entry here is whatever forces the tool to write unbuffered
    /// output, e.g. `PYTHONUNBUFFERED = "1"`.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Inherited environment variables removed for the child, e.g. loader or
    /// interpreter search paths that would resolve against the host instead
    /// of the tool's own installation.
    #[serde(default)]
    pub env_remove: Vec<String>,

    /// If false, the child starts from an empty environment and only `env`
    /// entries apply.
    #[serde(default = "default_inherit_env")]
    pub inherit_env: bool,
}

fn default_inherit_env() -> bool {
    true
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Sleep between polling iterations, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Regex matched against each completed (trimmed) output line; capture
    /// group 1 is the percentage.
    #[serde(default = "default_progress_pattern")]
    pub progress_pattern: String,

    /// Drop empty stdout lines.
    #[serde(default = "default_suppress_blank_stdout")]
    pub suppress_blank_stdout: bool,

    /// Drop empty stderr lines.
    #[serde(default)]
    pub suppress_blank_stderr: bool,
}

fn default_poll_interval_ms() -> u64 {
    300
}

fn default_progress_pattern() -> String {
    DEFAULT_PROGRESS_PATTERN.to_string()
}

fn default_suppress_blank_stdout() -> bool {
    true
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            progress_pattern: default_progress_pattern(),
            suppress_blank_stdout: default_suppress_blank_stdout(),
            suppress_blank_stderr: false,
        }
    }
}
