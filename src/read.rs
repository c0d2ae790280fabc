//! Reading ZIP archives.
//!
//! [`ZipArchive`] finds the entries of an archive held in memory
//! (or memory-mapped) and hands out decompressing readers for them.
//! It's the default [`Archive`] behind a [`ZipFs`].
//!
//! [`ZipArchive`]: struct.ZipArchive.html
//! [`Archive`]: ../archive/trait.Archive.html
//! [`ZipFs`]: ../fs/struct.ZipFs.html

use std::borrow::Cow;
use std::io;

use camino::Utf8Path;
use chrono::NaiveDateTime;
use flate2::read::DeflateDecoder;
use log::*;

use crate::archive::{Archive, ArchiveEntry};
use crate::arch::usize;
use crate::crc_reader::Crc32Reader;
use crate::format;
use crate::result::*;

/// The compression method used to store a file
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionMethod {
    /// The file is uncompressed
    None,
    /// The file is [DEFLATE](https://en.wikipedia.org/wiki/DEFLATE)d.
    Deflate,
    /// Anything else. The u16 is the format's code from the archive.
    Unsupported(u16),
}

/// Metadata for a file or directory in the archive,
/// retrieved from its central directory
#[derive(Debug, PartialEq, Eq)]
pub struct FileMetadata<'a> {
    /// Uncompressed size of the file in bytes
    pub size: usize,

    /// Compressed size of the file in bytes
    pub compressed_size: usize,

    pub compression_method: CompressionMethod,

    /// The CRC-32 of the decompressed file
    pub crc32: u32,

    /// True if the file is encrypted (decryption is unsupported)
    pub encrypted: bool,

    /// The path of the file, exactly as the archive provides it.
    pub path: Cow<'a, Utf8Path>,

    /// When the file was last modified, if the archive recorded a valid date.
    pub last_modified: Option<NaiveDateTime>,

    /// Unix mode bits, if the file was archived on a Unix system.
    pub unix_mode: Option<u16>,

    /// The offset to the local file header in the archive
    pub(crate) header_offset: usize,
}

impl FileMetadata<'_> {
    pub fn is_dir(&self) -> bool {
        // Utf8Path::ends_with() compares components, not characters.
        self.size == 0 && self.path.as_str().ends_with('/')
    }

    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    pub fn into_owned(self) -> FileMetadata<'static> {
        FileMetadata {
            path: Cow::Owned(self.path.into_owned()),
            ..self
        }
    }
}

impl ArchiveEntry for FileMetadata<'_> {
    fn name(&self) -> &str {
        self.path.as_str()
    }

    fn size(&self) -> u64 {
        self.size as u64
    }

    fn is_dir(&self) -> bool {
        FileMetadata::is_dir(self)
    }

    fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }
}

/// A ZIP archive to be read
pub struct ZipArchive<'a> {
    /// The archive's bytes, starting at its first record
    mapping: &'a [u8],
    /// Entries from the central directory, in their stored order
    entries: Vec<FileMetadata<'a>>,
}

impl<'a> ZipArchive<'a> {
    /// Reads a ZIP archive from a byte slice,
    /// which can come from `fs::read()` or a memory map.
    ///
    /// ```no_run
    /// # use zipfs::ZipArchive;
    /// let bytes = std::fs::read("docs.zip")?;
    /// let archive = ZipArchive::new(&bytes)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(mapping: &'a [u8]) -> FsResult<Self> {
        let (archive, archive_offset) = Self::with_prepended_data(mapping)?;
        if archive_offset != 0 {
            return Err(FsError::PrependedWithUnknownBytes(archive_offset));
        }
        Ok(archive)
    }

    /// Like `ZipArchive::new()`, but allows arbitrary data before the archive,
    /// like the executable of a self-extracting archive.
    /// Returns the archive and the number of bytes in front of it.
    pub fn with_prepended_data(mapping: &'a [u8]) -> FsResult<(Self, usize)> {
        let eocdr_posit = format::find_eocdr(mapping)?;
        let eocdr = format::EndOfCentralDirectory::parse(&mapping[eocdr_posit..])?;
        trace!("{:?}", eocdr);

        if eocdr.disk_number != eocdr.disk_with_central_directory
            || eocdr.entries != eocdr.entries_on_this_disk
        {
            return Err(FsError::UnsupportedArchive(format!(
                "No support for multi-disk archives (disk {}, central directory on disk {})",
                eocdr.disk_number, eocdr.disk_with_central_directory
            )));
        }

        let (archive_offset, nominal_cd_offset, entry_count) = match eocdr_posit
            .checked_sub(format::Zip64EndOfCentralDirectoryLocator::SIZE_IN_FILE)
            .and_then(|posit| format::Zip64EndOfCentralDirectoryLocator::parse(&mapping[posit..]))
        {
            Some(locator) => {
                trace!("{:?}", locator);
                if locator.disks != 1 || locator.disk_with_central_directory != 0 {
                    return Err(FsError::UnsupportedArchive(format!(
                        "No support for multi-disk archives (Zip64 locator reports {} disks)",
                        locator.disks
                    )));
                }

                // The Zip64 EOCDR sits somewhere between its nominal offset
                // (off by any prepended data) and the locator.
                let search_start = usize(locator.zip64_eocdr_offset)?;
                let search_end =
                    eocdr_posit - format::Zip64EndOfCentralDirectoryLocator::SIZE_IN_FILE;
                let search_space = mapping.get(search_start..search_end).ok_or_else(|| {
                    FsError::malformed("Zip64 End Of Central Directory offset is out of bounds")
                })?;
                let found = format::find_zip64_eocdr(search_space)?;
                let zip64_eocdr = format::Zip64EndOfCentralDirectory::parse(&search_space[found..])?;
                trace!("{:?}", zip64_eocdr);

                // Searching from the nominal offset, how far we went
                // is how much was prepended.
                (
                    found,
                    usize(zip64_eocdr.central_directory_offset)?,
                    zip64_eocdr.entries,
                )
            }
            None => {
                // The central directory ends where the EOCDR starts;
                // the difference from where it claims to start is the prefix.
                let nominal_offset = usize(eocdr.central_directory_offset)?;
                let archive_offset = eocdr_posit
                    .checked_sub(usize(eocdr.central_directory_size)?)
                    .and_then(|actual| actual.checked_sub(nominal_offset))
                    .ok_or_else(|| {
                        FsError::malformed("Invalid central directory size or offset")
                    })?;
                (archive_offset, nominal_offset, eocdr.entries as u64)
            }
        };

        let mapping = &mapping[archive_offset..];
        trace!(
            "{} entries at nominal offset {} ({} bytes prepended)",
            entry_count,
            nominal_cd_offset,
            archive_offset
        );

        let mut central_directory = mapping
            .get(nominal_cd_offset..)
            .ok_or_else(|| FsError::malformed("Central directory offset is out of bounds"))?;

        // Don't let a bogus count allocate the world; each entry is at least 46 bytes.
        let mut entries = Vec::with_capacity(usize(entry_count)?.min(central_directory.len() / 46));
        for _ in 0..entry_count {
            let cde = format::CentralDirectoryEntry::parse_and_consume(&mut central_directory)?;
            trace!("{:?}", cde);
            let metadata = FileMetadata::from_cde(&cde)?;
            debug!("{:?}", metadata);
            entries.push(metadata);
        }

        Ok((ZipArchive { mapping, entries }, archive_offset))
    }

    /// Returns the entries found in the archive's central directory.
    ///
    /// No effort is made to deduplicate or otherwise validate these entries.
    /// [`ZipFs`](../fs/struct.ZipFs.html) does that.
    pub fn entries(&self) -> &[FileMetadata<'a>] {
        &self.entries
    }

    /// Opens a decompressing reader for the given entry.
    ///
    /// The reader checks the entry's CRC-32 when it reaches the end,
    /// failing the final read if it doesn't match.
    pub fn read(&self, metadata: &FileMetadata) -> FsResult<Box<dyn io::Read + Send + 'a>> {
        let mut file_slice = self.mapping.get(metadata.header_offset..).ok_or_else(|| {
            FsError::malformed(format!("Local header for {} is out of bounds", metadata.path))
        })?;
        let local_header = format::LocalFileHeader::parse_and_consume(&mut file_slice)?;
        trace!("{:?}", local_header);

        if cfg!(feature = "check-local-metadata") {
            let local_metadata = FileMetadata::from_local_header(&local_header, metadata)?;
            if *metadata != local_metadata {
                debug!("Local header disagrees: {:?}", local_metadata);
                return Err(FsError::malformed(format!(
                    "Central directory entry for {} doesn't match its local file header",
                    metadata.path
                )));
            }
        }

        if metadata.encrypted {
            return Err(FsError::UnsupportedArchive(format!(
                "Can't read encrypted file {}",
                metadata.path
            )));
        }

        let compressed = file_slice.get(..metadata.compressed_size).ok_or_else(|| {
            FsError::malformed(format!("Data for {} runs past the archive", metadata.path))
        })?;
        make_reader(metadata.compression_method, metadata.crc32, compressed)
    }
}

impl<'a> Archive for ZipArchive<'a> {
    type Entry = FileMetadata<'a>;

    fn entries(&self) -> &[FileMetadata<'a>] {
        &self.entries
    }

    fn open(&self, entry: &FileMetadata<'a>) -> FsResult<Box<dyn io::Read + Send + '_>> {
        self.read(entry)
    }
}

/// Boxes up a reader for a compressed file,
/// given its compression method and expected CRC.
fn make_reader<'a, R: io::Read + Send + 'a>(
    compression_method: CompressionMethod,
    crc32: u32,
    reader: R,
) -> FsResult<Box<dyn io::Read + Send + 'a>> {
    match compression_method {
        CompressionMethod::None => Ok(Box::new(Crc32Reader::new(reader, crc32))),
        CompressionMethod::Deflate => Ok(Box::new(Crc32Reader::new(
            DeflateDecoder::new(reader),
            crc32,
        ))),
        CompressionMethod::Unsupported(code) => Err(FsError::UnsupportedArchive(format!(
            "Compression method {} not supported",
            code
        ))),
    }
}
