//! Log line sources.
//!
//! A cursor only needs "next line, or end of input" from its log. The
//! [`LineSource`] trait is that capability; [`ReaderSource`] provides it
//! for anything buffered, which covers log files and standard input.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ReplayError;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

/// A sequential source of log lines.
pub trait LineSource {
    /// The next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str;
}

/// A [`LineSource`] over any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// damaged record only fails to match.
#[derive(Debug)]
pub struct ReaderSource<R> {
    name: String,
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wrap `reader` under the given stream name.
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Open a log by path; [`STDIN_PATH`] selects standard input.
///
/// # Errors
///
/// Returns [`ReplayError::OpenLog`] if the file cannot be opened.
pub fn open(path: &Path) -> Result<Box<dyn LineSource>, ReplayError> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(stdin()));
    }
    let file = File::open(path).map_err(|source| ReplayError::OpenLog {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(ReaderSource::new(
        path.display().to_string(),
        BufReader::new(file),
    )))
}

/// A source reading standard input.
pub fn stdin() -> ReaderSource<io::StdinLock<'static>> {
    ReaderSource::new("<stdin>", io::stdin().lock())
}
