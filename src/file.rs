//! Random access over entries that can only be decompressed front to back.
//!
//! A [`File`] keeps a cursor and (depending on its [`SeekStrategy`])
//! either a live decompression stream or the entry's whole contents.
//! Seeking just moves the cursor; the next read catches the stream up to it.
//! Going forward means decompressing and throwing away the bytes in between.
//! Going backward means starting over with a fresh stream.

use std::convert::TryFrom;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use log::*;

use crate::archive::Archive;
use crate::fs::Metadata;
use crate::result::*;

/// How a [`File`] gets back to bytes it has already read past
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SeekStrategy {
    /// Reopen the entry from the start and skip to the new position.
    /// Uses no memory beyond the decompressor, but backward seeks
    /// cost a decompression of everything before the target.
    #[default]
    Reopen,
    /// Decompress the whole entry into memory when the file is opened.
    /// Seeks are free afterwards.
    Buffer,
}

enum State<'a> {
    /// A stream that has produced `at` bytes so far.
    /// `at` is `None` after a failed read, when nobody knows where the stream is.
    Streaming {
        stream: Box<dyn Read + Send + 'a>,
        at: Option<u64>,
    },
    Buffered(Vec<u8>),
    Closed,
}

/// An open file in a [`ZipFs`](../fs/struct.ZipFs.html)
///
/// Implements [`Read`] and [`Seek`]. Each handle has its own cursor and stream,
/// so handles are independent of each other, but a single handle
/// needs outside synchronization to be shared.
pub struct File<'a, A: Archive> {
    archive: &'a A,
    entry: &'a A::Entry,
    metadata: Metadata,
    state: State<'a>,
    /// The cursor, which may sit past the end of the file.
    pos: u64,
}

impl<'a, A: Archive> File<'a, A> {
    pub(crate) fn open(
        archive: &'a A,
        entry: &'a A::Entry,
        metadata: Metadata,
        strategy: SeekStrategy,
    ) -> FsResult<Self> {
        let mut stream = archive.open(entry)?;
        let state = match strategy {
            SeekStrategy::Reopen => State::Streaming {
                stream,
                at: Some(0),
            },
            SeekStrategy::Buffer => {
                let mut contents = Vec::with_capacity(capacity_hint(metadata.len()));
                stream.read_to_end(&mut contents).map_err(FsError::Stream)?;
                debug!("Buffered {} bytes of {}", contents.len(), metadata.name());
                State::Buffered(contents)
            }
        };
        Ok(Self {
            archive,
            entry,
            metadata,
            state,
            pos: 0,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Releases the file's stream or buffer.
    /// Any further reads or seeks fail with [`FsError::Closed`].
    pub fn close(&mut self) {
        self.state = State::Closed;
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    fn read_at_cursor(&mut self, buf: &mut [u8]) -> FsResult<usize> {
        match &mut self.state {
            State::Closed => Err(FsError::Closed),
            State::Buffered(contents) => {
                let start = usize::try_from(self.pos)
                    .unwrap_or(usize::MAX)
                    .min(contents.len());
                let remaining = &contents[start..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                self.pos += n as u64;
                Ok(n)
            }
            State::Streaming { stream, at } => {
                let mut current = match *at {
                    Some(current) if current <= self.pos => current,
                    _ => {
                        trace!(
                            "Reopening {} to get from {:?} to {}",
                            self.metadata.name(),
                            at,
                            self.pos
                        );
                        *stream = self.archive.open(self.entry)?;
                        0
                    }
                };
                // Until we know how far the stream got, the next read starts over.
                *at = None;
                if current < self.pos {
                    let mut gap = stream.by_ref().take(self.pos - current);
                    current += io::copy(&mut gap, &mut io::sink()).map_err(FsError::Stream)?;
                    if current < self.pos {
                        // Cursor is past the end of the file.
                        *at = Some(current);
                        return Ok(0);
                    }
                }
                let n = stream.read(buf).map_err(FsError::Stream)?;
                *at = Some(current + n as u64);
                self.pos += n as u64;
                Ok(n)
            }
        }
    }

    /// Reads everything from the cursor to the end of the file.
    pub(crate) fn read_remaining(&mut self) -> FsResult<Vec<u8>> {
        let mut contents = Vec::with_capacity(capacity_hint(self.metadata.len()));
        let mut chunk = [0; 8 * 1024];
        loop {
            match self.read_at_cursor(&mut chunk)? {
                0 => return Ok(contents),
                n => contents.extend_from_slice(&chunk[..n]),
            }
        }
    }

    fn move_cursor(&mut self, to: SeekFrom) -> FsResult<u64> {
        if self.is_closed() {
            return Err(FsError::Closed);
        }
        let target: i128 = match to {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            SeekFrom::End(delta) => self.metadata.len() as i128 + delta as i128,
        };
        self.pos = u64::try_from(target).map_err(|_| FsError::InvalidSeek(target))?;
        Ok(self.pos)
    }
}

/// Don't trust the archive's claimed size with a giant allocation.
fn capacity_hint(size: u64) -> usize {
    const MAX_HINT: u64 = 1 << 24;
    size.min(MAX_HINT) as usize
}

impl<A: Archive> Read for File<'_, A> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_at_cursor(buf)?)
    }
}

impl<A: Archive> Seek for File<'_, A> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.move_cursor(pos)?)
    }
}

impl<A: Archive> fmt::Debug for File<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Streaming { at: Some(at), .. } => format!("streaming at {}", at),
            State::Streaming { at: None, .. } => "streaming, needs reopening".to_owned(),
            State::Buffered(_) => "buffered".to_owned(),
            State::Closed => "closed".to_owned(),
        };
        f.debug_struct("File")
            .field("metadata", &self.metadata)
            .field("pos", &self.pos)
            .field("state", &state)
            .finish()
    }
}
