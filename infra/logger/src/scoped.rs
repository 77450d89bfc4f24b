//! Routes each event to a per-scope rolling log file.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use fxhash::FxHashMap;
use parking_lot::RwLock;
use tracing::Metadata;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

use crate::{LOG_FILE_SUFFIX, buffer::AsyncWriter, error::LoggerError};

/// `MakeWriter` that fans events out to one rolling file per root scope.
///
/// The scope is the first `::` segment of the event's target, so everything
/// logged from `payments::api::checkout` lands in `<dir>/payments.<date>.log`.
/// Writers are created lazily on first use and cached; targets that do not
/// yield a usable scope fall back to the file named after the logger itself.
pub struct ScopedFileWriter {
    inner: Arc<Inner>,
}

struct Inner {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    fallback: String,
    fallback_writer: ScopeWriter,
    buffer: Option<usize>,
    writers: RwLock<FxHashMap<String, ScopeWriter>>,
}

#[derive(Clone)]
enum ScopeWriter {
    Direct(Arc<RollingFileAppender>),
    Buffered(AsyncWriter),
}

impl ScopedFileWriter {
    /// Creates the writer and eagerly opens the fallback file so that path
    /// problems surface at initialization instead of at the first event.
    pub fn new(
        directory: impl AsRef<Path>,
        name: &str,
        rotation: Rotation,
        max_files: usize,
        buffer: Option<usize>,
    ) -> Result<Self, LoggerError> {
        let directory = directory.as_ref().to_path_buf();
        let fallback = sanitize_scope(name);
        if fallback.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name does not yield a usable file prefix".into(),
                context: None,
            });
        }

        let fallback_writer =
            make_scope_writer(&directory, &fallback, rotation.clone(), max_files, buffer)?;
        let mut writers = FxHashMap::default();
        writers.insert(fallback.clone(), fallback_writer.clone());

        Ok(Self {
            inner: Arc::new(Inner {
                directory,
                rotation,
                max_files,
                fallback,
                fallback_writer,
                buffer,
                writers: RwLock::new(writers),
            }),
        })
    }

    /// Flushes every buffered scope writer.
    pub fn flush(&self) {
        let writers = self.inner.writers.read();
        for writer in writers.values() {
            if let ScopeWriter::Buffered(buffered) = writer {
                buffered.flush();
            }
        }
    }

    /// Drains and shuts down the buffered scope writers. Idempotent.
    pub fn close(&self) {
        let writers = self.inner.writers.read();
        for writer in writers.values() {
            if let ScopeWriter::Buffered(buffered) = writer {
                buffered.flush();
                buffered.close();
            }
        }
    }

    fn scope_of(&self, target: &str) -> String {
        let root = target.split("::").next().unwrap_or_default();
        let scope = sanitize_scope(root);
        if scope.is_empty() { self.inner.fallback.clone() } else { scope }
    }

    fn writer_for(&self, scope: &str) -> ScopeWriter {
        {
            let writers = self.inner.writers.read();
            if let Some(writer) = writers.get(scope) {
                return writer.clone();
            }
        }

        let mut writers = self.inner.writers.write();
        if let Some(writer) = writers.get(scope) {
            return writer.clone();
        }
        // Scopes whose file cannot be opened keep routing to the fallback.
        let writer = make_scope_writer(
            &self.inner.directory,
            scope,
            self.inner.rotation.clone(),
            self.inner.max_files,
            self.inner.buffer,
        )
        .unwrap_or_else(|_| self.inner.fallback_writer.clone());
        writers.insert(scope.to_string(), writer.clone());
        writer
    }
}

impl Clone for ScopedFileWriter {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl std::fmt::Debug for ScopedFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedFileWriter")
            .field("directory", &self.inner.directory)
            .field("fallback", &self.inner.fallback)
            .field("scopes", &self.inner.writers.read().len())
            .finish_non_exhaustive()
    }
}

impl<'a> MakeWriter<'a> for ScopedFileWriter {
    type Writer = ScopeHandle;

    fn make_writer(&'a self) -> Self::Writer {
        ScopeHandle { writer: self.inner.fallback_writer.clone() }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        let scope = self.scope_of(meta.target());
        ScopeHandle { writer: self.writer_for(&scope) }
    }
}

/// Short-lived writer handed to the formatting layer for a single event.
pub struct ScopeHandle {
    writer: ScopeWriter,
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.writer {
            ScopeWriter::Direct(_) => "direct",
            ScopeWriter::Buffered(_) => "buffered",
        };
        f.debug_struct("ScopeHandle").field("writer", &kind).finish()
    }
}

impl io::Write for ScopeHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.writer {
            ScopeWriter::Direct(appender) => appender.make_writer().write(buf),
            ScopeWriter::Buffered(buffered) => buffered.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.writer {
            ScopeWriter::Direct(appender) => appender.make_writer().flush(),
            ScopeWriter::Buffered(buffered) => buffered.flush(),
        }
    }
}

fn make_scope_writer(
    directory: &Path,
    scope: &str,
    rotation: Rotation,
    max_files: usize,
    buffer: Option<usize>,
) -> Result<ScopeWriter, LoggerError> {
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(scope)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(max_files)
        .build(directory)?;

    Ok(match buffer {
        Some(capacity) => ScopeWriter::Buffered(AsyncWriter::new(appender, capacity)?),
        None => ScopeWriter::Direct(Arc::new(appender)),
    })
}

/// Keeps only characters that are safe in a file name prefix.
fn sanitize_scope(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect()
}
