// src/proc/supervisor.rs

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::proc::spec::CommandSpec;
use crate::sink::ProgressSink;
use crate::stream::classify::{LineClassifier, ProgressPattern};
use crate::stream::monitor::StreamMonitor;
use crate::stream::pump::spawn_pump;
use crate::stream::StreamKind;

/// Upper bound on waiting for a pump to observe end-of-stream after the
/// process has exited. A stream held open past exit (an orphaned grandchild,
/// say) is abandoned rather than hanging the caller.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Knobs for a supervised run.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Sleep between polling iterations. Coarse enough to avoid
    /// busy-spinning, fine enough for responsive progress display.
    pub poll_interval: Duration,
    /// Progress phrasing for this tool; applied to both streams.
    pub progress_pattern: ProgressPattern,
    /// Drop empty stdout lines instead of forwarding them.
    pub suppress_blank_stdout: bool,
    /// Drop empty stderr lines instead of forwarding them.
    pub suppress_blank_stderr: bool,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(300),
            progress_pattern: ProgressPattern::default(),
            suppress_blank_stdout: true,
            suppress_blank_stderr: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotStarted,
    Running,
    Draining,
    Exited,
}

/// Launches the external command and drives the run to completion.
///
/// The supervisor owns the child process handle and one pump + monitor pair
/// per output stream. Its control loop is deliberately a polling design, not
/// a blocking multiplexed wait: the only portable primitive for reading a
/// pipe is a blocking read, so the pumps block in reader tasks while the loop
/// itself suspends only in its fixed-interval sleep. Loop termination is
/// governed by process-exit polling, never by stream closure.
///
/// A supervisor value is single-use per run; call [`Supervisor::run`] once.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    options: SupervisorOptions,
}

impl Supervisor {
    pub fn new(options: SupervisorOptions) -> Self {
        Self { options }
    }

    /// Run the command to completion, forwarding events to `sink`.
    ///
    /// Returns the child's exit code (`-1` when terminated by a signal). A
    /// non-zero code is not an error: it is reported once as a sink warning
    /// and returned as data for the caller to judge. Errors are reserved for
    /// launch failure (executable not found, permission denied) and for
    /// faults in exit-status collection itself.
    pub async fn run(self, spec: &CommandSpec, sink: &mut dyn ProgressSink) -> Result<i32> {
        let mut state = RunState::NotStarted;
        debug!(?state, "supervisor state");
        info!(cmd = %spec.display_line(), "starting supervised process");

        let mut cmd = spec.build();
        // All three standard streams must be explicitly redirected: unpiped
        // streams can deadlock pipe-based I/O on some platforms, and an
        // inherited stdin would let the child wait for interactive input.
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process '{}'", spec.display_line()))?;

        // Close stdin right away so the child sees end-of-input.
        drop(child.stdin.take());

        let stdout = child
            .stdout
            .take()
            .context("child stdout pipe was not captured")?;
        let stderr = child
            .stderr
            .take()
            .context("child stderr pipe was not captured")?;

        let (out_rx, out_pump) = spawn_pump(StreamKind::Stdout, stdout);
        let (err_rx, err_pump) = spawn_pump(StreamKind::Stderr, stderr);

        let mut out_monitor = StreamMonitor::new(
            StreamKind::Stdout,
            out_rx,
            LineClassifier::new(
                self.options.progress_pattern.clone(),
                self.options.suppress_blank_stdout,
            ),
        );
        let mut err_monitor = StreamMonitor::new(
            StreamKind::Stderr,
            err_rx,
            LineClassifier::new(
                self.options.progress_pattern.clone(),
                self.options.suppress_blank_stderr,
            ),
        );

        state = RunState::Running;
        debug!(?state, "supervisor state");

        let status = loop {
            out_monitor.poll(sink);
            err_monitor.poll(sink);

            if let Some(status) = child
                .try_wait()
                .context("polling child process for exit")?
            {
                break status;
            }

            sleep(self.options.poll_interval).await;
        };

        state = RunState::Draining;
        debug!(?state, "supervisor state");

        // The child has exited but the pumps may still be mid-read on
        // buffered pipe data; let each reach end-of-stream before flushing.
        Self::drain_pump(StreamKind::Stdout, out_pump).await;
        Self::drain_pump(StreamKind::Stderr, err_pump).await;

        out_monitor.flush(sink);
        err_monitor.flush(sink);

        state = RunState::Exited;
        debug!(?state, "supervisor state");

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            let text = format!("process exited with code {code}");
            warn!(cmd = %spec.display_line(), exit_code = code, "non-zero exit");
            sink.on_warning(&text);
        } else {
            info!(cmd = %spec.display_line(), "process exited cleanly");
        }

        Ok(code)
    }

    async fn drain_pump(kind: StreamKind, handle: JoinHandle<()>) {
        if timeout(DRAIN_TIMEOUT, handle).await.is_err() {
            warn!(
                stream = kind.as_str(),
                "stream still open after process exit, abandoning drain"
            );
        }
    }
}
