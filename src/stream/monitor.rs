// src/stream/monitor.rs

use tokio::sync::mpsc::error::TryRecvError;

use crate::sink::ProgressSink;
use crate::stream::classify::LineClassifier;
use crate::stream::pump::ChunkReceiver;
use crate::stream::{StreamEvent, StreamKind};

/// Non-blocking consumer for one child stream.
///
/// Owns the receiving half of a pump's queue plus one [`LineClassifier`].
/// The supervisor polls both monitors from a single control loop, so neither
/// `poll` nor `flush` may ever block, even momentarily — a block on one stream
/// would starve the other.
#[derive(Debug)]
pub struct StreamMonitor {
    kind: StreamKind,
    rx: ChunkReceiver,
    classifier: LineClassifier,
    events: Vec<StreamEvent>,
}

impl StreamMonitor {
    pub fn new(kind: StreamKind, rx: ChunkReceiver, classifier: LineClassifier) -> Self {
        Self {
            kind,
            rx,
            classifier,
            events: Vec::new(),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Drain every currently-available chunk through the classifier and
    /// forward the resulting events to `sink` synchronously.
    ///
    /// Returns immediately when the queue is empty.
    pub fn poll(&mut self, sink: &mut dyn ProgressSink) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.classifier.push_chunk(&chunk, &mut self.events),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.forward(sink);
    }

    /// Drain remaining chunks, then force emission of any trailing partial
    /// line. Called once, after the source has closed.
    pub fn flush(&mut self, sink: &mut dyn ProgressSink) {
        self.poll(sink);
        self.classifier.flush(&mut self.events);
        self.forward(sink);
    }

    fn forward(&mut self, sink: &mut dyn ProgressSink) {
        for event in self.events.drain(..) {
            match event {
                StreamEvent::LogLine { text } => sink.on_log_line(self.kind, &text),
                StreamEvent::Progress { percent } => sink.on_progress(percent),
            }
        }
    }
}
