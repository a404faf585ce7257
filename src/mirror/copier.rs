//! Exclusive-create file copy into the mirror directory.

use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::CopyError;

/// Size of the buffer used to stream file contents.
pub const COPY_BUFFER_SIZE: usize = 4096;

/// Permission bits for newly mirrored files (before umask).
const DESTINATION_MODE: u32 = 0o600;

/// Copy behavior options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Leave a truncated destination file in place when a copy fails
    /// part-way instead of removing it.
    pub keep_partial: bool,
}

/// Result of a successful copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Path of the new mirrored file.
    pub destination: PathBuf,
    /// Bytes copied.
    pub bytes: u64,
}

/// Copy `source` to `destination_dir/file_name`.
///
/// The destination is created exclusively: an existing file with the same
/// name is never overwritten. Both files are closed before returning.
///
/// # Errors
///
/// - [`CopyError::SourceUnavailable`] if the source cannot be opened.
/// - [`CopyError::DestinationCollision`] if the destination already exists.
/// - [`CopyError::DestinationCreate`] if the destination cannot be created.
/// - [`CopyError::Read`] / [`CopyError::Write`] if streaming fails. The
///   partial destination is removed unless `options.keep_partial` is set.
pub fn mirror_file(
    source: &Path,
    destination_dir: &Path,
    file_name: &OsStr,
    options: CopyOptions,
) -> Result<CopyOutcome, CopyError> {
    let mut reader = File::open(source).map_err(|e| CopyError::SourceUnavailable {
        path: source.display().to_string(),
        source: e,
    })?;

    let destination = destination_dir.join(file_name);
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(DESTINATION_MODE)
        .open(&destination)
        .map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                CopyError::DestinationCollision {
                    path: destination.display().to_string(),
                }
            } else {
                CopyError::DestinationCreate {
                    path: destination.display().to_string(),
                    source: e,
                }
            }
        })?;

    let result = stream(&mut reader, &mut writer, source, &destination);
    drop(writer);
    drop(reader);

    match result {
        Ok(bytes) => Ok(CopyOutcome { destination, bytes }),
        Err(err) => {
            if !options.keep_partial {
                discard_partial(&destination);
            }
            Err(err)
        }
    }
}

/// Stream everything from `reader` into `writer` through a fixed buffer.
fn stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    source: &Path,
    destination: &Path,
) -> Result<u64, CopyError> {
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(CopyError::Read {
                    path: source.display().to_string(),
                    source: e,
                })
            }
        };

        write_all(writer, &buf[..n]).map_err(|e| CopyError::Write {
            path: destination.display().to_string(),
            source: e,
        })?;
        total += n as u64;
    }

    writer.flush().map_err(|e| CopyError::Write {
        path: destination.display().to_string(),
        source: e,
    })?;

    Ok(total)
}

/// Write the whole chunk, looping over short writes and retrying interrupts.
fn write_all<W: Write>(writer: &mut W, mut chunk: &[u8]) -> io::Result<()> {
    while !chunk.is_empty() {
        match writer.write(chunk) {
            Ok(0) => return Err(io::Error::new(ErrorKind::WriteZero, "wrote zero bytes")),
            Ok(n) => chunk = &chunk[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn discard_partial(destination: &Path) {
    if let Err(e) = std::fs::remove_file(destination) {
        tracing::warn!(
            path = %destination.display(),
            error = %e,
            "Failed to remove partial mirror file"
        );
    } else {
        tracing::debug!(path = %destination.display(), "Removed partial mirror file");
    }
}
