//! Purpose: Single-handle accessor for newline-delimited JSON files.
//! Exports: `LineJsonFile`, `Mode`, `Record`.
//! Role: Wrap open/write/read/delete/close around one owned descriptor.
//! Invariants: At most one open handle per accessor; every close path clears it.
//! Invariants: The handle field is either absent or open-and-valid, never stale.
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, ErrorKind, io_error_kind};
use crate::report::{FailureEvent, Reporter, TracingReporter};

/// One decoded line of the file; `Value::Null` when the line fails to decode.
pub type Record = Value;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Read from the start of the file.
    Read,
    /// Write from the start, truncating existing content.
    Write,
    /// Read and write without truncating.
    ReadWrite,
}

impl Mode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Mode::Read => {
                options.read(true);
            }
            Mode::Write => {
                options.write(true).truncate(true);
            }
            Mode::ReadWrite => {
                options.read(true).write(true);
            }
        }
        options
    }
}

#[derive(Debug)]
struct Handle {
    file: File,
    path: PathBuf,
}

/// Accessor over a newline-delimited JSON file.
///
/// All operations are synchronous and single-threaded. Failures surface as
/// booleans/options; the one internal error-catching path (`read_all`)
/// converts to a [`FailureEvent`] sent to the injected [`Reporter`].
pub struct LineJsonFile {
    handle: Option<Handle>,
    reporter: Box<dyn Reporter>,
}

impl Default for LineJsonFile {
    fn default() -> Self {
        Self::new()
    }
}

impl LineJsonFile {
    pub fn new() -> Self {
        Self::with_reporter(Box::new(TracingReporter))
    }

    pub fn with_reporter(reporter: Box<dyn Reporter>) -> Self {
        Self {
            handle: None,
            reporter,
        }
    }

    /// Open `path` in the given mode, closing any previously open handle
    /// first. Returns false if `path` does not exist or the underlying open
    /// fails; a missing path leaves the current handle untouched.
    pub fn open(&mut self, path: impl AsRef<Path>, mode: Mode) -> bool {
        self.try_open(path.as_ref(), mode).is_ok()
    }

    fn try_open(&mut self, path: &Path, mode: Mode) -> Result<(), Error> {
        if !path.exists() {
            return Err(Error::new(ErrorKind::NotFound).with_path(path));
        }
        if self.handle.is_some() {
            self.close();
        }

        let file = mode.options().open(path).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("open failed after existence check")
                .with_path(path)
                .with_source(err)
        })?;
        self.handle = Some(Handle {
            file,
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Write `content` verbatim at the current write position. No newline is
    /// appended; callers writing records terminate them with `\n` themselves.
    pub fn write_line(&mut self, content: &str) -> bool {
        self.try_write_line(content).is_ok()
    }

    fn try_write_line(&mut self, content: &str) -> Result<(), Error> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::NoHandle).with_message("no open handle"))?;
        handle.file.write_all(content.as_bytes()).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_path(&handle.path)
                .with_source(err)
        })
    }

    /// Read from the current position to end-of-stream, decoding each line
    /// independently. A line that fails to decode, including one that is not
    /// valid UTF-8, yields `Value::Null`; an I/O failure aborts the read,
    /// reports a [`FailureEvent`], and returns `None`. `None` is also
    /// returned when no handle is open.
    pub fn read_all(&mut self) -> Option<Vec<Record>> {
        let handle = self.handle.as_mut()?;
        match read_records(handle) {
            Ok(records) => Some(records),
            Err(err) => {
                let event = FailureEvent::read_failure("read_all", "read file failed", &err);
                self.reporter.report(&event);
                None
            }
        }
    }

    /// Close any open handle, then delete the file at `path`. Returns false
    /// only if the file still exists after the delete attempt; a path that
    /// never existed counts as success.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        self.try_remove(path.as_ref()).is_ok()
    }

    fn try_remove(&mut self, path: &Path) -> Result<(), Error> {
        if self.handle.is_some() {
            self.close();
        }

        let _ = fs::remove_file(path);
        if path.exists() {
            return Err(Error::new(ErrorKind::Delete)
                .with_message("file still present after delete")
                .with_path(path));
        }
        Ok(())
    }

    /// Idempotent; always returns true. Dropping the handle releases the
    /// descriptor.
    pub fn close(&mut self) -> bool {
        self.handle = None;
        true
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

fn read_records(handle: &mut Handle) -> Result<Vec<Record>, Error> {
    let path = handle.path.as_path();
    let mut reader = BufReader::new(&mut handle.file);
    let mut records = Vec::new();
    let mut line = Vec::new();
    let mut line_no = 0u64;

    // Lines are raw bytes: a non-UTF-8 line is a decode failure, not a read
    // failure.
    loop {
        line.clear();
        line_no += 1;
        let read = reader.read_until(b'\n', &mut line).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("read interrupted before end of stream")
                .with_path(path)
                .with_line(line_no)
                .with_source(err)
        })?;
        if read == 0 {
            break;
        }
        records.push(serde_json::from_slice(&line).unwrap_or(Value::Null));
    }

    Ok(records)
}
