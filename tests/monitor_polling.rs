use std::error::Error;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::time::{sleep, timeout};

use runwatch::sink::ProgressSink;
use runwatch::stream::{
    LineClassifier, ProgressPattern, StreamKind, StreamMonitor, spawn_pump,
};

type TestResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Default)]
struct RecordingSink {
    lines: Vec<(StreamKind, String)>,
    progress: Vec<f64>,
    warnings: Vec<String>,
}

impl ProgressSink for RecordingSink {
    fn on_log_line(&mut self, stream: StreamKind, text: &str) {
        self.lines.push((stream, text.to_string()));
    }

    fn on_progress(&mut self, percent: f64) {
        self.progress.push(percent);
    }

    fn on_warning(&mut self, text: &str) {
        self.warnings.push(text.to_string());
    }
}

fn stdout_monitor(rx: runwatch::stream::ChunkReceiver) -> StreamMonitor {
    StreamMonitor::new(
        StreamKind::Stdout,
        rx,
        LineClassifier::new(ProgressPattern::default(), true),
    )
}

#[tokio::test]
async fn poll_returns_immediately_when_no_data_has_arrived() {
    let (writer, reader) = tokio::io::duplex(64);
    let (rx, _pump) = spawn_pump(StreamKind::Stdout, reader);
    let mut monitor = stdout_monitor(rx);
    let mut sink = RecordingSink::default();

    monitor.poll(&mut sink);

    assert!(sink.lines.is_empty());
    assert!(sink.progress.is_empty());
    drop(writer);
}

#[tokio::test]
async fn flush_delivers_lines_progress_and_trailing_fragment() -> TestResult {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let (rx, pump) = spawn_pump(StreamKind::Stdout, reader);
    let mut monitor = stdout_monitor(rx);
    let mut sink = RecordingSink::default();

    writer.write_all(b"hello\r\nProgress: 10%\npartial").await?;
    drop(writer);
    pump.await?;

    monitor.flush(&mut sink);

    assert_eq!(
        sink.lines,
        vec![
            (StreamKind::Stdout, "hello".to_string()),
            (StreamKind::Stdout, "partial".to_string()),
        ]
    );
    assert_eq!(sink.progress, vec![10.0]);
    Ok(())
}

#[tokio::test]
async fn events_arrive_incrementally_across_polls() -> TestResult {
    let (mut writer, reader) = tokio::io::duplex(64);
    let (rx, pump) = spawn_pump(StreamKind::Stdout, reader);
    let mut monitor = stdout_monitor(rx);
    let mut sink = RecordingSink::default();

    writer.write_all(b"first\n").await?;
    wait_for_lines(&mut monitor, &mut sink, 1).await?;
    assert_eq!(sink.lines[0].1, "first");

    writer.write_all(b"second\n").await?;
    wait_for_lines(&mut monitor, &mut sink, 2).await?;
    assert_eq!(sink.lines[1].1, "second");

    drop(writer);
    pump.await?;
    monitor.flush(&mut sink);
    assert_eq!(sink.lines.len(), 2);
    Ok(())
}

#[tokio::test]
async fn stderr_monitor_keeps_blank_lines_when_configured() -> TestResult {
    let (mut writer, reader) = tokio::io::duplex(64);
    let (rx, pump) = spawn_pump(StreamKind::Stderr, reader);
    let mut monitor = StreamMonitor::new(
        StreamKind::Stderr,
        rx,
        LineClassifier::new(ProgressPattern::default(), false),
    );
    let mut sink = RecordingSink::default();

    writer.write_all(b"\nerror text\n").await?;
    drop(writer);
    pump.await?;

    monitor.flush(&mut sink);
    assert_eq!(
        sink.lines,
        vec![
            (StreamKind::Stderr, String::new()),
            (StreamKind::Stderr, "error text".to_string()),
        ]
    );
    Ok(())
}

/// Poll until `want` lines arrived, bounded so a regression fails instead of
/// hanging the test.
async fn wait_for_lines(
    monitor: &mut StreamMonitor,
    sink: &mut RecordingSink,
    want: usize,
) -> TestResult {
    timeout(Duration::from_secs(5), async {
        while sink.lines.len() < want {
            monitor.poll(sink);
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}
