// src/sink.rs

//! Host-facing event callbacks.
//!
//! The supervisor never decides how output is displayed; it hands every
//! decoded event to a [`ProgressSink`] supplied by the host. Callbacks are
//! invoked synchronously from within `poll()`/`flush()`, on whatever task the
//! control loop runs on.

use tracing::{info, warn};

use crate::stream::StreamKind;

/// Receiver for log lines and progress updates from a supervised run.
pub trait ProgressSink {
    /// An ordinary output line; `stream` distinguishes stderr from stdout.
    fn on_log_line(&mut self, stream: StreamKind, text: &str);

    /// A progress report, in percent within `[0, 100]`.
    fn on_progress(&mut self, percent: f64);

    /// A warning about the run itself (e.g. a non-zero exit code). Warnings
    /// are informational; they never make the run an error.
    fn on_warning(&mut self, text: &str);
}

/// Sink that relays everything through `tracing`.
///
/// This is what the CLI uses: child stdout at info, child stderr at warn,
/// progress updates at info with the percentage as a field.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_log_line(&mut self, stream: StreamKind, text: &str) {
        match stream {
            StreamKind::Stdout => info!(stream = stream.as_str(), "{text}"),
            StreamKind::Stderr => warn!(stream = stream.as_str(), "{text}"),
        }
    }

    fn on_progress(&mut self, percent: f64) {
        info!(percent, "progress");
    }

    fn on_warning(&mut self, text: &str) {
        warn!("{text}");
    }
}
