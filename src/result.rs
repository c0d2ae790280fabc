//! Error types and the related `Result<T>`

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    /// An error from underlying I/O
    #[error("I/O Error")]
    Io(#[from] io::Error),

    /// The archive couldn't be enumerated: bad records, truncated data,
    /// or entry names that can't form a file hierarchy.
    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    /// The archive uses a feature we don't support
    #[error("Unsupported archive: {0}")]
    UnsupportedArchive(String),

    /// Decoding a UTF-8 entry name failed
    #[error("Invalid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    /// The ZIP archive is prepended some unknown bytes.
    /// (Use [`ZipArchive::with_prepended_data()`] if this is okay.)
    ///
    /// [`ZipArchive::with_prepended_data()`]: ../read/struct.ZipArchive.html#method.with_prepended_data
    #[error("Archive prepended with {0} unknown bytes")]
    PrependedWithUnknownBytes(usize),

    /// A cast from a 64-bit int to a usize failed while mapping the archive,
    /// probably on a 32-bit system.
    #[error("Archive too large for address space")]
    InsufficientAddressSpace,

    /// Nothing lives at the given path
    #[error("No such file or directory: /{0}")]
    NotFound(Utf8PathBuf),

    /// A directory was expected, but the path names a file.
    #[error("Not a directory: /{0}")]
    NotADirectory(Utf8PathBuf),

    /// A file was expected, but the path names a directory.
    #[error("Is a directory: /{0}")]
    IsADirectory(Utf8PathBuf),

    /// Decompressing an entry failed partway through.
    #[error("Error reading entry stream")]
    Stream(#[source] io::Error),

    /// A seek tried to land before the start of the file.
    #[error("Invalid seek to position {0}")]
    InvalidSeek(i128),

    /// The file handle was already closed.
    #[error("File handle is closed")]
    Closed,
}

impl FsError {
    pub(crate) fn malformed<S: Into<String>>(why: S) -> Self {
        FsError::MalformedArchive(why.into())
    }
}

impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        let kind = match &e {
            FsError::Io(inner) | FsError::Stream(inner) => inner.kind(),
            FsError::NotFound(_) => io::ErrorKind::NotFound,
            FsError::InvalidSeek(_) => io::ErrorKind::InvalidInput,
            FsError::MalformedArchive(_) | FsError::Encoding(_) => io::ErrorKind::InvalidData,
            FsError::UnsupportedArchive(_) => io::ErrorKind::Unsupported,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
