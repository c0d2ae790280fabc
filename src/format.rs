//! Parsing for the records of the ZIP file format.
//!
//! The nitty gritty of the on-disk layout lives here;
//! [`read`](../read/index.html) turns these records into something usable.
//! Field layouts are quoted from [`APPNOTE.TXT`].
//!
//! Unlike most of the format's history, we don't trust any length we read:
//! every field is bounds-checked, and running off the end of the data
//! is a [`FsError::MalformedArchive`], not a panic.
//!
//! [`APPNOTE.TXT`]: https://pkware.cachefly.net/webdocs/APPNOTE/APPNOTE-6.3.6.TXT

use std::borrow::Cow;
use std::convert::TryInto;

use camino::Utf8Path;
use chrono::{NaiveDate, NaiveDateTime};
use codepage_437::*;
use memchr::memmem;

use crate::arch::usize;
use crate::read::{CompressionMethod, FileMetadata};
use crate::result::*;

const EOCDR_MAGIC: [u8; 4] = [b'P', b'K', 5, 6];
const ZIP64_EOCDR_MAGIC: [u8; 4] = [b'P', b'K', 6, 6];
const ZIP64_EOCDR_LOCATOR_MAGIC: [u8; 4] = [b'P', b'K', 6, 7];
const CENTRAL_DIRECTORY_MAGIC: [u8; 4] = [b'P', b'K', 1, 2];
const LOCAL_FILE_HEADER_MAGIC: [u8; 4] = [b'P', b'K', 3, 4];

/// Header ID of the Zip64 extended information extra field
const ZIP64_EXTRA_FIELD: u16 = 0x0001;

impl CompressionMethod {
    fn from_u16(u: u16) -> Self {
        match u {
            0 => CompressionMethod::None,
            8 => CompressionMethod::Deflate,
            v => CompressionMethod::Unsupported(v),
        }
    }
}

/// A cursor over little-endian record fields.
///
/// `what` names the record being parsed, for error messages.
struct Fields<'a> {
    input: &'a [u8],
    what: &'static str,
}

impl<'a> Fields<'a> {
    fn new(input: &'a [u8], what: &'static str) -> Self {
        Self { input, what }
    }

    fn take(&mut self, len: usize) -> FsResult<&'a [u8]> {
        if self.input.len() < len {
            return Err(FsError::malformed(format!("Truncated {}", self.what)));
        }
        let (taken, rest) = self.input.split_at(len);
        self.input = rest;
        Ok(taken)
    }

    fn magic(&mut self, expected: &[u8; 4]) -> FsResult<()> {
        if self.take(4)? != expected {
            return Err(FsError::malformed(format!("Bad signature for {}", self.what)));
        }
        Ok(())
    }

    fn u16(&mut self) -> FsResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> FsResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> FsResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn array<const N: usize>(&mut self) -> FsResult<[u8; N]> {
        // take() guarantees the length, so the conversion can't fail.
        self.take(N)?
            .try_into()
            .map_err(|_| FsError::malformed(format!("Truncated {}", self.what)))
    }

    fn rest(&self) -> &'a [u8] {
        self.input
    }
}

/// Data from the End of central directory record,
/// the last thing in the archive and our way in.
#[derive(Debug)]
#[allow(dead_code)]
pub struct EndOfCentralDirectory<'a> {
    pub disk_number: u16,
    pub disk_with_central_directory: u16,
    pub entries_on_this_disk: u16,
    pub entries: u16,
    pub central_directory_size: u32,
    pub central_directory_offset: u32,
    pub comment: &'a [u8],
}

impl<'a> EndOfCentralDirectory<'a> {
    pub fn parse(eocdr: &'a [u8]) -> FsResult<Self> {
        // 4.3.16  End of central directory record:
        //
        // end of central dir signature    4 bytes  (0x06054b50)
        // number of this disk             2 bytes
        // number of the disk with the
        // start of the central directory  2 bytes
        // total number of entries in
        // the central dir on this disk    2 bytes
        // total number of entries in
        // the central dir                 2 bytes
        // size of the central directory   4 bytes
        // offset of start of central
        // directory with respect to
        // the starting disk number        4 bytes
        // .ZIP file comment length        2 bytes
        // .ZIP file comment       (variable size)
        let mut f = Fields::new(eocdr, "End Of Central Directory Record");
        f.magic(&EOCDR_MAGIC)?;
        let disk_number = f.u16()?;
        let disk_with_central_directory = f.u16()?;
        let entries_on_this_disk = f.u16()?;
        let entries = f.u16()?;
        let central_directory_size = f.u32()?;
        let central_directory_offset = f.u32()?;
        let comment_length = usize(f.u16()?)?;
        let comment = f.take(comment_length)?;

        Ok(Self {
            disk_number,
            disk_with_central_directory,
            entries_on_this_disk,
            entries,
            central_directory_size,
            central_directory_offset,
            comment,
        })
    }
}

/// Searches backward for the End of central directory record.
///
/// A trailing comment of variable size means it isn't at a fixed offset
/// from the end of the file.
pub fn find_eocdr(mapping: &[u8]) -> FsResult<usize> {
    memmem::rfind(mapping, &EOCDR_MAGIC).ok_or_else(|| {
        FsError::malformed("Couldn't find End Of Central Directory Record")
    })
}

/// Points to the Zip64 end of central directory record.
/// Immediately precedes the regular EOCDR in Zip64 archives.
#[derive(Debug)]
#[allow(dead_code)]
pub struct Zip64EndOfCentralDirectoryLocator {
    pub disk_with_central_directory: u32,
    pub zip64_eocdr_offset: u64,
    pub disks: u32,
}

impl Zip64EndOfCentralDirectoryLocator {
    pub const SIZE_IN_FILE: usize = 20;

    /// Returns `None` if `mapping` doesn't start with a locator.
    pub fn parse(mapping: &[u8]) -> Option<Self> {
        // 4.3.15 Zip64 end of central directory locator
        //
        // zip64 end of central dir locator
        // signature                       4 bytes  (0x07064b50)
        // number of the disk with the
        // start of the zip64 end of
        // central directory               4 bytes
        // relative offset of the zip64
        // end of central directory record 8 bytes
        // total number of disks           4 bytes
        let mut f = Fields::new(mapping, "Zip64 End Of Central Directory Locator");
        f.magic(&ZIP64_EOCDR_LOCATOR_MAGIC).ok()?;
        Some(Self {
            disk_with_central_directory: f.u32().ok()?,
            zip64_eocdr_offset: f.u64().ok()?,
            disks: f.u32().ok()?,
        })
    }
}

/// Data from the Zip64 end of central directory record:
/// the same as the EOCDR, but with room for more entries and bigger offsets.
#[derive(Debug)]
#[allow(dead_code)]
pub struct Zip64EndOfCentralDirectory<'a> {
    pub source_version: u16,
    pub minimum_extract_version: u16,
    pub disk_number: u32,
    pub disk_with_central_directory: u32,
    pub entries_on_this_disk: u64,
    pub entries: u64,
    pub central_directory_size: u64,
    pub central_directory_offset: u64,
    pub extensible_data: &'a [u8],
}

impl<'a> Zip64EndOfCentralDirectory<'a> {
    /// Size of everything but the extensible data
    const FIXED_SIZE_IN_FILE: usize = 56;

    pub fn parse(eocdr: &'a [u8]) -> FsResult<Self> {
        // 4.3.14  Zip64 end of central directory record
        //
        // zip64 end of central dir
        // signature                       4 bytes  (0x06064b50)
        // size of zip64 end of central
        // directory record                8 bytes
        // version made by                 2 bytes
        // version needed to extract       2 bytes
        // number of this disk             4 bytes
        // number of the disk with the
        // start of the central directory  4 bytes
        // total number of entries in the
        // central directory on this disk  8 bytes
        // total number of entries in the
        // central directory               8 bytes
        // size of the central directory   8 bytes
        // offset of start of central
        // directory with respect to
        // the starting disk number        8 bytes
        // zip64 extensible data sector    (variable size)
        let mut f = Fields::new(eocdr, "Zip64 End Of Central Directory Record");
        f.magic(&ZIP64_EOCDR_MAGIC)?;
        let record_size = usize(f.u64()?)?;
        let source_version = f.u16()?;
        let minimum_extract_version = f.u16()?;
        let disk_number = f.u32()?;
        let disk_with_central_directory = f.u32()?;
        let entries_on_this_disk = f.u64()?;
        let entries = f.u64()?;
        let central_directory_size = f.u64()?;
        let central_directory_offset = f.u64()?;

        // 4.3.14.1 The value stored into the "size of zip64 end of central
        // directory record" SHOULD be the size of the remaining
        // record and SHOULD NOT include the leading 12 bytes.
        let extensible_data_length = record_size
            .checked_add(12)
            .and_then(|size| size.checked_sub(Self::FIXED_SIZE_IN_FILE))
            .ok_or_else(|| {
                FsError::malformed("Zip64 End Of Central Directory Record is too small")
            })?;
        let extensible_data = f.take(extensible_data_length)?;

        Ok(Self {
            source_version,
            minimum_extract_version,
            disk_number,
            disk_with_central_directory,
            entries_on_this_disk,
            entries,
            central_directory_size,
            central_directory_offset,
            extensible_data,
        })
    }
}

/// Finds the Zip64 end of central directory record,
/// searching forward from its nominal position
/// (which is off by however many bytes were prepended to the archive).
pub fn find_zip64_eocdr(mapping: &[u8]) -> FsResult<usize> {
    memmem::find(mapping, &ZIP64_EOCDR_MAGIC).ok_or_else(|| {
        FsError::malformed("Couldn't find Zip64 End Of Central Directory Record")
    })
}

/// One file or directory's record in the central directory
#[derive(Debug)]
#[allow(dead_code)]
pub struct CentralDirectoryEntry<'a> {
    pub source_version: u16,
    pub minimum_extract_version: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_modified_time: u16,
    pub last_modified_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_number: u16,
    pub internal_file_attributes: u16,
    pub external_file_attributes: u32,
    pub header_offset: u32,
    pub path: &'a [u8],
    pub extra_field: &'a [u8],
    pub file_comment: &'a [u8],
}

impl<'a> CentralDirectoryEntry<'a> {
    /// Parses the entry at the front of `entry`, then advances past it.
    pub fn parse_and_consume(entry: &mut &'a [u8]) -> FsResult<Self> {
        // 4.3.12  Central directory structure, file header:
        //
        //   central file header signature   4 bytes  (0x02014b50)
        //   version made by                 2 bytes
        //   version needed to extract       2 bytes
        //   general purpose bit flag        2 bytes
        //   compression method              2 bytes
        //   last mod file time              2 bytes
        //   last mod file date              2 bytes
        //   crc-32                          4 bytes
        //   compressed size                 4 bytes
        //   uncompressed size               4 bytes
        //   file name length                2 bytes
        //   extra field length              2 bytes
        //   file comment length             2 bytes
        //   disk number start               2 bytes
        //   internal file attributes        2 bytes
        //   external file attributes        4 bytes
        //   relative offset of local header 4 bytes
        //
        //   file name (variable size)
        //   extra field (variable size)
        //   file comment (variable size)
        let mut f = Fields::new(entry, "central directory entry");
        f.magic(&CENTRAL_DIRECTORY_MAGIC)?;
        let source_version = f.u16()?;
        let minimum_extract_version = f.u16()?;
        let flags = f.u16()?;
        let compression_method = f.u16()?;
        let last_modified_time = f.u16()?;
        let last_modified_date = f.u16()?;
        let crc32 = f.u32()?;
        let compressed_size = f.u32()?;
        let uncompressed_size = f.u32()?;
        let path_length = usize(f.u16()?)?;
        let extra_field_length = usize(f.u16()?)?;
        let file_comment_length = usize(f.u16()?)?;
        let disk_number = f.u16()?;
        let internal_file_attributes = f.u16()?;
        let external_file_attributes = f.u32()?;
        let header_offset = f.u32()?;
        let path = f.take(path_length)?;
        let extra_field = f.take(extra_field_length)?;
        let file_comment = f.take(file_comment_length)?;
        *entry = f.rest();

        Ok(Self {
            source_version,
            minimum_extract_version,
            flags,
            compression_method,
            last_modified_time,
            last_modified_date,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_number,
            internal_file_attributes,
            external_file_attributes,
            header_offset,
            path,
            extra_field,
            file_comment,
        })
    }
}

/// The header immediately preceding each entry's (compressed) data.
///
/// It mostly repeats the central directory entry.
#[derive(Debug)]
#[allow(dead_code)]
pub struct LocalFileHeader<'a> {
    pub minimum_extract_version: u16,
    pub flags: u16,
    pub compression_method: u16,
    pub last_modified_time: u16,
    pub last_modified_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub path: &'a [u8],
    pub extra_field: &'a [u8],
}

impl<'a> LocalFileHeader<'a> {
    /// Parses the header at the front of `header`,
    /// leaving it pointing at the entry's data.
    pub fn parse_and_consume(header: &mut &'a [u8]) -> FsResult<Self> {
        // 4.3.7  Local file header:
        //
        // local file header signature     4 bytes  (0x04034b50)
        // version needed to extract       2 bytes
        // general purpose bit flag        2 bytes
        // compression method              2 bytes
        // last mod file time              2 bytes
        // last mod file date              2 bytes
        // crc-32                          4 bytes
        // compressed size                 4 bytes
        // uncompressed size               4 bytes
        // file name length                2 bytes
        // extra field length              2 bytes
        //
        // file name (variable size)
        // extra field (variable size)
        let mut f = Fields::new(header, "local file header");
        f.magic(&LOCAL_FILE_HEADER_MAGIC)?;
        let minimum_extract_version = f.u16()?;
        let flags = f.u16()?;
        let compression_method = f.u16()?;
        let last_modified_time = f.u16()?;
        let last_modified_date = f.u16()?;
        let crc32 = f.u32()?;
        let compressed_size = f.u32()?;
        let uncompressed_size = f.u32()?;
        let path_length = usize(f.u16()?)?;
        let extra_field_length = usize(f.u16()?)?;
        let path = f.take(path_length)?;
        let extra_field = f.take(extra_field_length)?;
        *header = f.rest();

        Ok(Self {
            minimum_extract_version,
            flags,
            compression_method,
            last_modified_time,
            last_modified_date,
            crc32,
            compressed_size,
            uncompressed_size,
            path,
            extra_field,
        })
    }
}

// General purpose bit flags (4.4.4)

/// Bit 0: If set, indicates that the file is encrypted.
fn is_encrypted(flags: u16) -> bool {
    flags & 1 != 0
}

/// Bit 3: CRC and sizes are zeroed in the local header
/// and stored in a data descriptor after the file data.
fn has_data_descriptor(flags: u16) -> bool {
    flags & (1 << 3) != 0
}

/// Bit 11: Language encoding flag (EFS). If set, the file name
/// is UTF-8. Otherwise it's (supposedly) IBM code page 437.
fn is_utf8(flags: u16) -> bool {
    flags & (1 << 11) != 0
}

fn decode_path(flags: u16, raw: &[u8]) -> FsResult<Cow<'_, Utf8Path>> {
    if is_utf8(flags) {
        let utf8 = std::str::from_utf8(raw)?;
        return Ok(Cow::Borrowed(Utf8Path::new(utf8)));
    }
    // CP437 is a superset of ASCII, so most names come back borrowed.
    Ok(match Cow::borrow_from_cp437(raw, &CP437_CONTROL) {
        Cow::Borrowed(s) => Cow::Borrowed(Utf8Path::new(s)),
        Cow::Owned(s) => Cow::Owned(s.into()),
    })
}

/// 4.4.2.2: The upper byte of "version made by" is the host system.
/// Only Unix hosts put a mode in the top of the external attributes.
fn unix_mode(source_version: u16, external_file_attributes: u32) -> Option<u16> {
    const UNIX: u16 = 3;
    if source_version >> 8 == UNIX {
        Some((external_file_attributes >> 16) as u16)
    } else {
        None
    }
}

impl<'a> FileMetadata<'a> {
    pub(crate) fn from_cde(cde: &CentralDirectoryEntry<'a>) -> FsResult<Self> {
        let path = decode_path(cde.flags, cde.path)?;

        if cde.disk_number != 0 {
            return Err(FsError::UnsupportedArchive(format!(
                "No support for multi-disk archives: {} claims to be on disk {}",
                path, cde.disk_number,
            )));
        }

        let mut metadata = Self {
            size: usize(cde.uncompressed_size)?,
            compressed_size: usize(cde.compressed_size)?,
            compression_method: CompressionMethod::from_u16(cde.compression_method),
            crc32: cde.crc32,
            encrypted: is_encrypted(cde.flags),
            path,
            last_modified: parse_msdos(cde.last_modified_time, cde.last_modified_date),
            unix_mode: unix_mode(cde.source_version, cde.external_file_attributes),
            header_offset: usize(cde.header_offset)?,
        };
        parse_extra_field(&mut metadata, cde.extra_field)?;
        Ok(metadata)
    }

    /// Builds metadata from a local file header so that it can be compared
    /// against `central`.
    ///
    /// The local header has no offset or host attributes,
    /// and with a data descriptor it has no sizes or CRC either;
    /// those come from the central directory.
    pub(crate) fn from_local_header(
        local: &LocalFileHeader<'a>,
        central: &FileMetadata,
    ) -> FsResult<Self> {
        let path = decode_path(local.flags, local.path)?;

        let mut metadata = if has_data_descriptor(local.flags) {
            Self {
                size: central.size,
                compressed_size: central.compressed_size,
                crc32: central.crc32,
                ..Self::blank(local, path)
            }
        } else {
            let mut m = Self {
                size: usize(local.uncompressed_size)?,
                compressed_size: usize(local.compressed_size)?,
                crc32: local.crc32,
                ..Self::blank(local, path)
            };
            parse_extra_field(&mut m, local.extra_field)?;
            m
        };
        metadata.unix_mode = central.unix_mode;
        metadata.header_offset = central.header_offset;
        Ok(metadata)
    }

    fn blank(local: &LocalFileHeader<'a>, path: Cow<'a, Utf8Path>) -> Self {
        Self {
            size: 0,
            compressed_size: 0,
            compression_method: CompressionMethod::from_u16(local.compression_method),
            crc32: 0,
            encrypted: is_encrypted(local.flags),
            path,
            last_modified: parse_msdos(local.last_modified_time, local.last_modified_date),
            unix_mode: None,
            header_offset: 0,
        }
    }
}

/// Decodes an MS-DOS timestamp.
/// Returns `None` for nonsense like month 0, which plenty of archivers write.
fn parse_msdos(time: u16, date: u16) -> Option<NaiveDateTime> {
    let seconds = (time & 0b0000_0000_0001_1111) as u32 * 2; // 2-second precision
    let minutes = ((time & 0b0000_0111_1110_0000) >> 5) as u32;
    let hours = ((time & 0b1111_1000_0000_0000) >> 11) as u32;

    let day = (date & 0b0000_0000_0001_1111) as u32;
    let month = ((date & 0b0000_0001_1110_0000) >> 5) as u32;
    let year = ((date & 0b1111_1110_0000_0000) >> 9) as i32 + 1980;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hours, minutes, seconds)
}

/// Walks the extra fields of a central directory entry or local header,
/// picking up 64-bit sizes and offsets from the Zip64 field.
fn parse_extra_field(metadata: &mut FileMetadata, extra_field: &[u8]) -> FsResult<()> {
    // 4.5.1: header1+data1 + header2+data2 . . .
    // where each header is a 2-byte ID and a 2-byte data size.
    let mut fields = Fields::new(extra_field, "extra field");
    while !fields.rest().is_empty() {
        let kind = fields.u16()?;
        let len = usize(fields.u16()?)?;
        let data = fields.take(len)?;
        if kind != ZIP64_EXTRA_FIELD {
            continue;
        }

        // 4.5.3: Each value only appears if the corresponding
        // 32-bit field was saturated, in this order.
        let mut zip64 = Fields::new(data, "Zip64 extra field");
        if metadata.size == u32::MAX as usize {
            metadata.size = usize(zip64.u64()?)?;
        }
        if metadata.compressed_size == u32::MAX as usize {
            metadata.compressed_size = usize(zip64.u64()?)?;
        }
        if metadata.header_offset == u32::MAX as usize {
            metadata.header_offset = usize(zip64.u64()?)?;
        }
        // Anything left would be a disk number; multi-disk archives
        // were already rejected, so ignore it.
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn truncated_fields_are_errors() {
        let mut f = Fields::new(&[1, 0, 2], "test record");
        assert_eq!(f.u16().unwrap(), 1);
        match f.u16() {
            Err(FsError::MalformedArchive(why)) => assert!(why.contains("test record")),
            other => panic!("Expected a truncation error, got {:?}", other),
        }
    }

    #[test]
    fn eocdr_with_comment() {
        let mut record = EOCDR_MAGIC.to_vec();
        record.extend_from_slice(&[0, 0, 0, 0, 2, 0, 2, 0]);
        record.extend_from_slice(&100u32.to_le_bytes());
        record.extend_from_slice(&200u32.to_le_bytes());
        record.extend_from_slice(&3u16.to_le_bytes());
        record.extend_from_slice(b"hi!");

        assert_eq!(find_eocdr(&record).unwrap(), 0);
        let eocdr = EndOfCentralDirectory::parse(&record).unwrap();
        assert_eq!(eocdr.entries, 2);
        assert_eq!(eocdr.central_directory_size, 100);
        assert_eq!(eocdr.central_directory_offset, 200);
        assert_eq!(eocdr.comment, b"hi!");

        // Comment length that runs past the end
        record.truncate(record.len() - 1);
        assert!(EndOfCentralDirectory::parse(&record).is_err());
    }

    #[test]
    fn no_eocdr() {
        assert!(matches!(
            find_eocdr(b"definitely not a zip file"),
            Err(FsError::MalformedArchive(_))
        ));
    }

    #[test]
    fn locator_needs_magic() {
        assert!(Zip64EndOfCentralDirectoryLocator::parse(&[0; 20]).is_none());
        // Too short
        assert!(Zip64EndOfCentralDirectoryLocator::parse(&ZIP64_EOCDR_LOCATOR_MAGIC).is_none());

        let mut locator = ZIP64_EOCDR_LOCATOR_MAGIC.to_vec();
        locator.extend_from_slice(&0u32.to_le_bytes());
        locator.extend_from_slice(&1234u64.to_le_bytes());
        locator.extend_from_slice(&1u32.to_le_bytes());
        assert_eq!(
            locator.len(),
            Zip64EndOfCentralDirectoryLocator::SIZE_IN_FILE
        );
        let parsed = Zip64EndOfCentralDirectoryLocator::parse(&locator).unwrap();
        assert_eq!(parsed.zip64_eocdr_offset, 1234);
        assert_eq!(parsed.disks, 1);
    }

    #[test]
    fn msdos_timestamps() {
        // 2020-06-15 13:45:30
        let date = ((2020 - 1980) << 9) | (6 << 5) | 15;
        let time = (13 << 11) | (45 << 5) | (30 / 2);
        let parsed = parse_msdos(time, date).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2020, 6, 15)
                .unwrap()
                .and_hms_opt(13, 45, 30)
                .unwrap()
        );

        // All zeros (month 0, day 0) isn't a date.
        assert!(parse_msdos(0, 0).is_none());
    }

    #[test]
    fn cp437_names() {
        // 0x81 is ü in CP437, and invalid as a lone UTF-8 byte.
        let path = decode_path(0, b"gr\x81n.txt").unwrap();
        assert_eq!(path.as_str(), "grün.txt");
        assert!(decode_path(1 << 11, b"gr\x81n.txt").is_err());
        assert!(matches!(decode_path(1 << 11, b"plain"), Ok(Cow::Borrowed(_))));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn zip64_extra_field() {
        let mut metadata = FileMetadata {
            size: u32::MAX as usize,
            compressed_size: 10,
            compression_method: CompressionMethod::None,
            crc32: 0,
            encrypted: false,
            path: Cow::Borrowed(Utf8Path::new("big")),
            last_modified: None,
            unix_mode: None,
            header_offset: u32::MAX as usize,
        };
        let mut extra = Vec::new();
        // Some other field first, to be skipped
        extra.extend_from_slice(&0x5455u16.to_le_bytes());
        extra.extend_from_slice(&1u16.to_le_bytes());
        extra.push(0);
        extra.extend_from_slice(&ZIP64_EXTRA_FIELD.to_le_bytes());
        extra.extend_from_slice(&16u16.to_le_bytes());
        extra.extend_from_slice(&5_000_000_000u64.to_le_bytes());
        extra.extend_from_slice(&77u64.to_le_bytes());

        parse_extra_field(&mut metadata, &extra).unwrap();
        assert_eq!(metadata.size as u64, 5_000_000_000u64);
        assert_eq!(metadata.compressed_size, 10);
        assert_eq!(metadata.header_offset, 77);

        // A field that claims more data than there is
        let bogus = [0x01, 0x00, 0xff, 0x00, 0x00];
        assert!(parse_extra_field(&mut metadata, &bogus).is_err());
    }
}
