//! Bounded-channel writer that moves file output off the logging thread.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::LoggerError;

type Sink = Arc<Mutex<Box<dyn io::Write + Send>>>;

/// Buffers formatted log records in a bounded channel and writes them to the
/// wrapped sink on a background thread.
///
/// When the channel is full or the worker has shut down the record is written
/// synchronously on the caller's thread, so records are never lost. Cloning
/// the writer produces another handle to the same channel.
pub struct AsyncWriter {
    inner: Arc<Inner>,
}

struct Inner {
    sink: Sink,
    sender: Mutex<Option<Sender<Vec<u8>>>>,
    /// Records enqueued or in flight but not yet written to the sink.
    pending: Arc<AtomicUsize>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncWriter {
    /// Wraps `sink` with a bounded channel of `capacity` records and spawns
    /// the drain thread.
    pub fn new(sink: impl io::Write + Send + 'static, capacity: usize) -> Result<Self, LoggerError> {
        let (sender, receiver) = bounded::<Vec<u8>>(capacity);
        let sink: Sink = Arc::new(Mutex::new(Box::new(sink)));
        let pending = Arc::new(AtomicUsize::new(0));
        let worker = spawn_worker(receiver, Arc::clone(&sink), Arc::clone(&pending))?;

        Ok(Self {
            inner: Arc::new(Inner {
                sink,
                sender: Mutex::new(Some(sender)),
                pending,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    /// Blocks until every queued record has reached the sink, then flushes it.
    pub fn flush(&self) {
        while self.inner.pending.load(Ordering::Relaxed) > 0 {
            thread::sleep(Duration::from_millis(1));
        }
        let _ = self.inner.sink.lock().flush();
    }

    /// Disconnects the channel and joins the worker after it has drained the
    /// remaining records. Subsequent writes go straight to the sink. Calling
    /// `close` more than once is a no-op.
    pub fn close(&self) {
        drop(self.inner.sender.lock().take());
        let worker = self.inner.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }

    fn enqueue(&self, record: &[u8]) {
        self.inner.pending.fetch_add(1, Ordering::Relaxed);
        let message = record.to_vec();
        let rejected = {
            let sender = self.inner.sender.lock();
            match sender.as_ref() {
                Some(tx) => match tx.try_send(message) {
                    Ok(()) => None,
                    Err(TrySendError::Full(message) | TrySendError::Disconnected(message)) => {
                        Some(message)
                    }
                },
                None => Some(message),
            }
        };
        if let Some(message) = rejected {
            let _ = self.inner.sink.lock().write_all(&message);
            self.inner.pending.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl Clone for AsyncWriter {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl std::fmt::Debug for AsyncWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWriter")
            .field("pending", &self.inner.pending.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl io::Write for AsyncWriter {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        self.enqueue(record);
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        AsyncWriter::flush(self);
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for AsyncWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// The receiver loop keeps draining buffered records after the last sender is
/// dropped, so closing the channel never discards queued output.
fn spawn_worker(
    receiver: Receiver<Vec<u8>>,
    sink: Sink,
    pending: Arc<AtomicUsize>,
) -> Result<JoinHandle<()>, LoggerError> {
    thread::Builder::new()
        .name("toolx-log-writer".into())
        .spawn(move || {
            for record in &receiver {
                let _ = sink.lock().write_all(&record);
                pending.fetch_sub(1, Ordering::Relaxed);
            }
            let _ = sink.lock().flush();
        })
        .map_err(|error| LoggerError::Internal {
            message: format!("Failed to spawn the log writer thread: {error}").into(),
            context: None,
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn flush_waits_for_queued_records() {
        let buf = SharedBuf::default();
        let mut writer = AsyncWriter::new(buf.clone(), 64).unwrap();

        for i in 0..20 {
            writer.write_all(format!("record {i}\n").as_bytes()).unwrap();
        }
        writer.flush();

        let contents = buf.contents();
        for i in 0..20 {
            assert!(contents.contains(&format!("record {i}\n")));
        }
    }

    #[test]
    fn tiny_capacity_loses_nothing() {
        let buf = SharedBuf::default();
        let mut writer = AsyncWriter::new(buf.clone(), 1).unwrap();

        for i in 0..100 {
            writer.write_all(format!("{i}\n").as_bytes()).unwrap();
        }
        writer.flush();
        writer.close();

        let lines = buf.contents().lines().count();
        assert_eq!(lines, 100);
    }

    #[test]
    fn writes_after_close_fall_back_to_the_sink() {
        let buf = SharedBuf::default();
        let mut writer = AsyncWriter::new(buf.clone(), 8).unwrap();

        writer.write_all(b"before\n").unwrap();
        writer.close();
        writer.close();
        writer.write_all(b"after\n").unwrap();

        let contents = buf.contents();
        assert!(contents.contains("before\n"));
        assert!(contents.contains("after\n"));
    }

    #[test]
    fn clones_share_the_channel() {
        let buf = SharedBuf::default();
        let writer = AsyncWriter::new(buf.clone(), 8).unwrap();
        let mut clone = writer.clone();

        clone.write_all(b"via clone\n").unwrap();
        writer.flush();
        writer.close();

        assert!(buf.contents().contains("via clone\n"));
    }
}
