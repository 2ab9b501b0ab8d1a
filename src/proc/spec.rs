// src/proc/spec.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Immutable description of the command to supervise.
///
/// Built once (by the host's argument marshalling, the config file, or the
/// CLI) and then only read. The core never interprets argument semantics; it
/// just launches what it is given.
///
/// Environment handling covers the two cases a tool runner actually needs:
/// forcing prompt output from the child (e.g. `PYTHONUNBUFFERED=1`, so
/// partial progress lines are seen as they happen instead of batched by the
/// child's own buffering), and removing inherited variables that would send
/// the child to the wrong interpreter or loader search path.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    shell: bool,
    cwd: Option<PathBuf>,
    env_set: BTreeMap<String, String>,
    env_remove: Vec<String>,
    inherit_env: bool,
}

impl CommandSpec {
    /// A command run directly: `program` is the executable, arguments are
    /// passed verbatim via [`CommandSpec::args`].
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            shell: false,
            cwd: None,
            env_set: BTreeMap::new(),
            env_remove: Vec::new(),
            inherit_env: true,
        }
    }

    /// A pre-formatted command line handed to the platform shell
    /// (`sh -c` on unix, `cmd /C` on windows).
    pub fn shell(line: impl Into<String>) -> Self {
        let mut spec = Self::new(line);
        spec.shell = true;
        spec
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set (or override) one environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_set.insert(key.into(), value.into());
        self
    }

    /// Remove one inherited environment variable from the child.
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    /// Start the child from an empty environment instead of the inherited
    /// one; `env` entries still apply on top.
    pub fn clear_env(mut self) -> Self {
        self.inherit_env = false;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Human-readable command line, for logs and dry-run output.
    pub fn display_line(&self) -> String {
        if self.shell || self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Build the `tokio::process::Command` this spec describes. Stdio
    /// redirection is the supervisor's job, not the spec's.
    pub(crate) fn build(&self) -> Command {
        let mut cmd = if self.shell {
            if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&self.program);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&self.program);
                c
            }
        } else {
            let mut c = Command::new(&self.program);
            c.args(&self.args);
            c
        };

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        if !self.inherit_env {
            cmd.env_clear();
        }
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        cmd.envs(&self.env_set);

        cmd
    }
}
