use std::io::{self, Write};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// When a stream pushes buffered bytes to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Flush after every write.
    #[default]
    Always,
    /// Never flush automatically; rely on [`OutputStream::flush`], process
    /// exit or OS buffering.
    Manual,
}

/// Destination for formatted log lines.
///
/// Implementations must write each `text` contiguously: two concurrent
/// `write` calls on the same stream never interleave their bytes. Which
/// of two racing calls lands first is unspecified.
pub trait OutputStream: Send + Sync {
    /// Write all bytes of `text` while holding the stream's exclusive lock.
    ///
    /// **Returns**
    /// - `Ok(())` once every byte was handed to the underlying writer
    ///   (and flushed, under [`FlushMode::Always`]).
    /// - `Err(..)` if the OS reported an I/O error. The lock is released
    ///   either way.
    fn write(&self, text: &str) -> io::Result<()>;

    /// Force buffered bytes to the underlying sink.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

fn write_locked<W: Write>(mut sink: W, text: &str, flush_mode: FlushMode) -> io::Result<()> {
    sink.write_all(text.as_bytes())?;
    if flush_mode == FlushMode::Always {
        sink.flush()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdioTarget {
    Stdout,
    Stderr,
}

/// Process-wide handle over standard output or standard error.
///
/// There is exactly one instance per descriptor; every handler targeting
/// it shares the same `Arc`. Writes go through the std handle's own lock,
/// so they also never interleave with `println!`/`eprintln!` output.
#[derive(Debug)]
pub struct StdioStream {
    target: StdioTarget,
    flush_mode: FlushMode,
}

static STDOUT: OnceLock<Arc<StdioStream>> = OnceLock::new();
static STDERR: OnceLock<Arc<StdioStream>> = OnceLock::new();

impl StdioStream {
    /// Shared stream over standard output, flushing after every write.
    pub fn stdout() -> Arc<StdioStream> {
        Arc::clone(STDOUT.get_or_init(|| {
            Arc::new(StdioStream {
                target: StdioTarget::Stdout,
                flush_mode: FlushMode::Always,
            })
        }))
    }

    /// Shared stream over standard error, flushing after every write.
    pub fn stderr() -> Arc<StdioStream> {
        Arc::clone(STDERR.get_or_init(|| {
            Arc::new(StdioStream {
                target: StdioTarget::Stderr,
                flush_mode: FlushMode::Always,
            })
        }))
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }
}

impl OutputStream for StdioStream {
    fn write(&self, text: &str) -> io::Result<()> {
        match self.target {
            StdioTarget::Stdout => write_locked(io::stdout().lock(), text, self.flush_mode),
            StdioTarget::Stderr => write_locked(io::stderr().lock(), text, self.flush_mode),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            StdioTarget::Stdout => io::stdout().lock().flush(),
            StdioTarget::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Any writer behind an exclusive lock: files, pipes, in-memory buffers.
#[derive(Debug)]
pub struct LockedStream<W> {
    inner: Mutex<W>,
    flush_mode: FlushMode,
}

impl<W: Write + Send> LockedStream<W> {
    pub fn new(inner: W, flush_mode: FlushMode) -> Self {
        Self {
            inner: Mutex::new(inner),
            flush_mode,
        }
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }

    /// Run `f` with exclusive access to the wrapped writer.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl LockedStream<Vec<u8>> {
    /// In-memory stream collecting every written line.
    pub fn buffer() -> Self {
        Self::new(Vec::new(), FlushMode::Always)
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }
}

impl<W: Write + Send> OutputStream for LockedStream<W> {
    fn write(&self, text: &str) -> io::Result<()> {
        write_locked(&mut *self.inner.lock(), text, self.flush_mode)
    }

    fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}
