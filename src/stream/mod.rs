// src/stream/mod.rs

//! Streaming-output interpretation.
//!
//! This module turns the raw bytes of a child process's stdout/stderr into
//! discrete [`StreamEvent`]s without ever blocking the consumer:
//!
//! - [`classify`] owns the line-reassembly and progress-detection state
//!   machine (pure, no I/O).
//! - [`pump`] spawns one reader task per stream that performs the blocking
//!   reads and forwards raw chunks into a single-consumer queue.
//! - [`monitor`] drains that queue on demand through the classifier and
//!   forwards events to a [`crate::sink::ProgressSink`].

pub mod classify;
pub mod monitor;
pub mod pump;

pub use classify::{LineClassifier, ProgressPattern};
pub use monitor::StreamMonitor;
pub use pump::{ChunkReceiver, spawn_pump};

/// Which child stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

/// One decoded unit of child output.
///
/// Events are produced in the exact order the underlying bytes were read;
/// ordering is strict per stream and independent across the two streams.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An ordinary log line (terminator stripped).
    LogLine { text: String },
    /// A recognized progress report, in percent within `[0, 100]`.
    ///
    /// The matched line is consumed by classification and is *not* also
    /// emitted as a log line.
    Progress { percent: f64 },
}
