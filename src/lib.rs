//! zipfs serves the contents of a ZIP archive as a read-only filesystem:
//!
//! ```no_run
//! # use std::io::{Read, Seek, SeekFrom};
//! # use zipfs::*;
//! let bytes = std::fs::read("docs.zip")?;
//! let fs = ZipFs::new(ZipArchive::new(&bytes)?)?.with_name("docs.zip");
//!
//! // Stat anything, including directories the archive never listed.
//! let info = fs.stat("/guide/install.html")?;
//! assert!(info.is_file());
//!
//! for child in fs.read_dir("/guide")? {
//!     println!("{}{}", child.name(), if child.is_dir() { "/" } else { "" });
//! }
//!
//! // Files are seekable, even though their contents are compressed.
//! let mut file = fs.open("guide/install.html")?;
//! let mut first_pass = String::new();
//! file.read_to_string(&mut first_pass)?;
//! file.seek(SeekFrom::Start(0))?;
//! let mut second_pass = String::new();
//! file.read_to_string(&mut second_pass)?;
//! assert_eq!(first_pass, second_pass);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A ZIP archive is just a list of named entries, like `guide/install.html`.
//! Directories exist only as prefixes of those names
//! (unless the archiver wrote entries for them, which many don't).
//! [`ZipFs`] builds a proper tree out of that list when it's created,
//! and looks everything up in that tree afterwards.
//!
//! Each entry is compressed on its own, and DEFLATE only decompresses forwards.
//! [`File`] gets random access anyway, either by reopening the entry
//! and skipping ahead, or by buffering it. See [`SeekStrategy`].
//!
//! [`ZipArchive`] reads archives from a byte slice; memory-map big ones.
//! Other archive formats can sit behind a [`ZipFs`] by implementing [`Archive`].

pub mod archive;
pub mod file;
pub mod fs;
pub mod path;
pub mod read;
pub mod result;

pub use archive::{Archive, ArchiveEntry};
pub use file::{File, SeekStrategy};
pub use fs::{FileSystem, Metadata, ZipFs};
pub use read::{CompressionMethod, ZipArchive};
pub use result::{FsError, FsResult};

mod arch;
mod crc_reader;
mod format;
mod tree;
