// src/stream/classify.rs

use anyhow::{Result, anyhow};
use regex::Regex;

use crate::stream::StreamEvent;

/// Default pattern matched against each completed (trimmed) line.
///
/// Capture group 1 is the percentage, a non-negative optionally-decimal
/// numeral.
pub const DEFAULT_PROGRESS_PATTERN: &str = r"^Progress:\s*([0-9]+(?:\.[0-9]+)?)%$";

/// Pluggable progress-detection strategy.
///
/// The phrasing of progress reports is specific to the external tool, so the
/// pattern is injected rather than hard-coded; tools with different phrasing
/// only need a different pattern, never changes to the buffering logic.
#[derive(Debug, Clone)]
pub struct ProgressPattern {
    regex: Regex,
}

impl ProgressPattern {
    /// Compile a pattern. The regex must contain at least one capture group;
    /// group 1 must capture the numeric percentage.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(anyhow!(
                "progress pattern '{pattern}' has no capture group for the percentage"
            ));
        }
        Ok(Self { regex })
    }

    /// Match a trimmed line and extract the percentage.
    ///
    /// Returns `None` when the line does not match or the captured number
    /// fails to parse; classification failure always degrades to logging.
    /// Values above 100 are clamped to 100.
    fn percent_of(&self, line: &str) -> Option<f64> {
        let caps = self.regex.captures(line)?;
        let number = caps.get(1)?.as_str();
        number.parse::<f64>().ok().map(|p| p.min(100.0))
    }
}

impl Default for ProgressPattern {
    fn default() -> Self {
        // The default pattern is a compile-time constant; it always compiles.
        Self {
            regex: Regex::new(DEFAULT_PROGRESS_PATTERN).unwrap(),
        }
    }
}

/// Line buffer and progress classifier.
///
/// A pure state machine: bytes go in (one at a time or in chunks), completed
/// lines come out as [`StreamEvent`]s. The event sequence depends only on the
/// byte sequence, never on how it was chunked.
///
/// Terminator handling: `\n`, `\r`, and `\r\n` each end exactly one logical
/// line. A `\r` does not emit immediately; the next byte decides whether it
/// was part of a CRLF pair or a bare carriage return, so a CRLF split across
/// two chunks still terminates a single line.
#[derive(Debug)]
pub struct LineClassifier {
    pattern: ProgressPattern,
    suppress_blank: bool,
    unfinished: Vec<u8>,
    saw_cr: bool,
}

impl LineClassifier {
    pub fn new(pattern: ProgressPattern, suppress_blank: bool) -> Self {
        Self {
            pattern,
            suppress_blank,
            unfinished: Vec::new(),
            saw_cr: false,
        }
    }

    /// Feed one byte, appending any completed-line events to `out`.
    pub fn push_byte(&mut self, byte: u8, out: &mut Vec<StreamEvent>) {
        if self.saw_cr {
            self.saw_cr = false;
            self.complete_line(out);
            if byte == b'\n' {
                // Second half of a CRLF pair; consumed by the same terminator.
                return;
            }
        }

        match byte {
            b'\n' => self.complete_line(out),
            b'\r' => self.saw_cr = true,
            other => self.unfinished.push(other),
        }
    }

    /// Feed a chunk of bytes, appending events to `out`.
    pub fn push_chunk(&mut self, chunk: &[u8], out: &mut Vec<StreamEvent>) {
        for &byte in chunk {
            self.push_byte(byte, out);
        }
    }

    /// Force emission of any buffered partial line.
    ///
    /// Idempotent when nothing is buffered. Called once after the source has
    /// confirmed no more data will arrive, so an unterminated trailing
    /// fragment is never lost.
    pub fn flush(&mut self, out: &mut Vec<StreamEvent>) {
        self.saw_cr = false;
        if !self.unfinished.is_empty() {
            self.complete_line(out);
        }
    }

    /// Classify and emit the accumulated line, resetting the buffer.
    fn complete_line(&mut self, out: &mut Vec<StreamEvent>) {
        let bytes = std::mem::take(&mut self.unfinished);
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if let Some(percent) = self.pattern.percent_of(text.trim()) {
            out.push(StreamEvent::Progress { percent });
            return;
        }

        if text.is_empty() && self.suppress_blank {
            return;
        }

        out.push(StreamEvent::LogLine { text });
    }
}
