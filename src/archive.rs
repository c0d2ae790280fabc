//! What the filesystem needs from an archive reader.
//!
//! [`ZipFs`](../fs/struct.ZipFs.html) only ever asks an archive two things:
//! what entries it has, and for a stream of a given entry's bytes.
//! [`ZipArchive`](../read/struct.ZipArchive.html) is the reader this crate ships,
//! but anything that can answer those questions will do.

use std::io;

use chrono::NaiveDateTime;

use crate::result::*;

/// One record in an archive's flat list of entries
pub trait ArchiveEntry {
    /// The full path of the entry as stored, e.g. `docs/intro.txt`.
    fn name(&self) -> &str;

    /// Uncompressed size in bytes
    fn size(&self) -> u64;

    /// Whether the archive explicitly marks this entry as a directory.
    fn is_dir(&self) -> bool {
        self.name().ends_with('/')
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        None
    }
}

/// A source of entries and their decompressed contents
pub trait Archive: Sync {
    type Entry: ArchiveEntry + Sync;

    /// All entries, in whatever order the archive keeps them.
    /// Duplicates and odd paths are the caller's problem.
    fn entries(&self) -> &[Self::Entry];

    /// Opens a fresh stream of `entry`'s uncompressed bytes, starting at its beginning.
    ///
    /// Streams are forward-only. Callers wanting to go backwards open another.
    fn open(&self, entry: &Self::Entry) -> FsResult<Box<dyn io::Read + Send + '_>>;
}

impl<A: Archive + ?Sized> Archive for &A {
    type Entry = A::Entry;

    fn entries(&self) -> &[Self::Entry] {
        (**self).entries()
    }

    fn open(&self, entry: &Self::Entry) -> FsResult<Box<dyn io::Read + Send + '_>> {
        (**self).open(entry)
    }
}
