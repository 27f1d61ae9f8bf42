use crate::stream::OutputStream;
use std::io;

/// A stream that simply drops all lines.
///
/// Useful for measuring the overhead of formatting without any terminal
/// or pipe I/O, and for tests that don't care about the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStream;

impl OutputStream for NoopStream {
    fn write(&self, _text: &str) -> io::Result<()> {
        Ok(())
    }
}
