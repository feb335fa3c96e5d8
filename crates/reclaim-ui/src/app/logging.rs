//! Route tracing output to the browser console.

use std::io;

/// Buffers one formatted event and writes it to the console when dropped.
///
/// The fmt layer asks for a fresh writer per event, so each drop is one line.
#[derive(Default)]
pub(crate) struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        gloo::console::log!(line.trim_end().to_string());
    }
}
