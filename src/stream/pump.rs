// src/stream/pump.rs

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::stream::StreamKind;

/// Receiving half of a pump's chunk queue. Exactly one reader (the monitor).
pub type ChunkReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

/// Read size per blocking read. Small keeps progress latency low; the
/// classifier is chunk-invariant so the size never affects output.
const READ_CHUNK_BYTES: usize = 256;

/// Spawn a pump task that reads `source` to end-of-stream, forwarding every
/// chunk into the returned queue in read order.
///
/// The queue is unbounded and single-producer/single-consumer: the pump is the
/// sole writer, the owning [`super::StreamMonitor`] the sole reader. The pump
/// shares no other state with the polling loop.
///
/// The task ends without error at end-of-stream. A read failure also ends it
/// (logged at debug); callers must detect process exit independently and never
/// rely on pump termination for it.
///
/// The source is any `AsyncRead`, not a concrete pipe type, so tests can feed
/// synthetic input.
pub fn spawn_pump<R>(kind: StreamKind, source: R) -> (ChunkReceiver, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut source = source;
        let mut buf = [0u8; READ_CHUNK_BYTES];
        loop {
            match source.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        // Monitor dropped; nobody is listening anymore.
                        break;
                    }
                }
                Err(err) => {
                    debug!(stream = kind.as_str(), error = %err, "pump read failed, stopping");
                    break;
                }
            }
        }
        debug!(stream = kind.as_str(), "pump finished");
    });

    (rx, handle)
}
