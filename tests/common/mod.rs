//! Builds small ZIP archives in memory for the tests.

#![allow(dead_code)]

use std::io::Write;

use crc32fast::Hasher;
use flate2::write::DeflateEncoder;
use flate2::Compression;

/// 2021-03-04 05:06:08 in MS-DOS format
pub const DOS_TIME: u16 = (5 << 11) | (6 << 5) | (8 / 2);
pub const DOS_DATE: u16 = ((2021 - 1980) << 9) | (3 << 5) | 4;

struct Entry {
    name: String,
    contents: Vec<u8>,
    deflate: bool,
    bad_crc: bool,
    encrypted: bool,
    local_size_mismatch: bool,
}

#[derive(Default)]
pub struct ZipBuilder {
    prefix: Vec<u8>,
    entries: Vec<Entry>,
    zip64: bool,
    disk_number: u16,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a DEFLATEd file.
    pub fn file(self, name: &str, contents: &[u8]) -> Self {
        self.entry(name, contents, true)
    }

    /// Adds an uncompressed file.
    pub fn stored(self, name: &str, contents: &[u8]) -> Self {
        self.entry(name, contents, false)
    }

    /// Adds an explicit directory entry. `name` should end in a slash.
    pub fn dir(self, name: &str) -> Self {
        self.entry(name, b"", false)
    }

    /// Records the wrong CRC-32 for the most recently added entry.
    pub fn with_bad_crc(mut self) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.bad_crc = true;
        }
        self
    }

    /// Marks the most recently added entry as encrypted.
    /// Its data stays in the clear; readers shouldn't get that far.
    pub fn encrypted(mut self) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.encrypted = true;
        }
        self
    }

    /// Gives the most recently added entry a local header
    /// whose uncompressed size disagrees with the central directory.
    pub fn with_local_size_mismatch(mut self) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.local_size_mismatch = true;
        }
        self
    }

    /// Writes Zip64 records: saturated sizes and offsets with Zip64 extra fields,
    /// plus a Zip64 end of central directory record and locator.
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    /// Claims the archive is one disk of several.
    pub fn on_disk(mut self, disk_number: u16) -> Self {
        self.disk_number = disk_number;
        self
    }

    /// Puts junk in front of the archive, like a self-extractor's executable.
    pub fn prefixed_with(mut self, junk: &[u8]) -> Self {
        self.prefix = junk.to_vec();
        self
    }

    fn entry(mut self, name: &str, contents: &[u8], deflate: bool) -> Self {
        self.entries.push(Entry {
            name: name.to_owned(),
            contents: contents.to_vec(),
            deflate,
            bad_crc: false,
            encrypted: false,
            local_size_mismatch: false,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut archive = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let mut hasher = Hasher::new();
            hasher.update(&entry.contents);
            let mut crc = hasher.finalize();
            if entry.bad_crc {
                crc ^= 0xdead_beef;
            }

            let (method, data) = if entry.deflate {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&entry.contents).unwrap();
                (8u16, encoder.finish().unwrap())
            } else {
                (0u16, entry.contents.clone())
            };

            let offset = archive.len() as u64;
            let name = entry.name.as_bytes();
            // UTF-8 names, plus the encryption bit if asked for
            let flags: u16 = (1 << 11) | entry.encrypted as u16;
            let mut local_size = entry.contents.len() as u64;
            if entry.local_size_mismatch {
                local_size += 1;
            }

            // Local file header
            let local_extra = if self.zip64 {
                zip64_extra(&[local_size, data.len() as u64])
            } else {
                Vec::new()
            };
            put32(&mut archive, 0x0403_4b50);
            put16(&mut archive, 20); // version needed
            put16(&mut archive, flags);
            put16(&mut archive, method);
            put16(&mut archive, DOS_TIME);
            put16(&mut archive, DOS_DATE);
            put32(&mut archive, crc);
            put32(&mut archive, self.saturate(data.len() as u64));
            put32(&mut archive, self.saturate(local_size));
            put16(&mut archive, name.len() as u16);
            put16(&mut archive, local_extra.len() as u16);
            archive.extend_from_slice(name);
            archive.extend_from_slice(&local_extra);
            archive.extend_from_slice(&data);

            // Central directory entry
            let central_extra = if self.zip64 {
                zip64_extra(&[entry.contents.len() as u64, data.len() as u64, offset])
            } else {
                Vec::new()
            };
            let mode: u32 = if entry.name.ends_with('/') { 0o40755 } else { 0o100644 };
            put32(&mut central, 0x0201_4b50);
            put16(&mut central, (3 << 8) | 20); // made by Unix
            put16(&mut central, 20);
            put16(&mut central, flags);
            put16(&mut central, method);
            put16(&mut central, DOS_TIME);
            put16(&mut central, DOS_DATE);
            put32(&mut central, crc);
            put32(&mut central, self.saturate(data.len() as u64));
            put32(&mut central, self.saturate(entry.contents.len() as u64));
            put16(&mut central, name.len() as u16);
            put16(&mut central, central_extra.len() as u16);
            put16(&mut central, 0); // comment
            put16(&mut central, 0); // disk number
            put16(&mut central, 0); // internal attributes
            put32(&mut central, mode << 16);
            put32(&mut central, self.saturate(offset));
            central.extend_from_slice(name);
            central.extend_from_slice(&central_extra);
        }

        let central_offset = archive.len() as u64;
        archive.extend_from_slice(&central);
        let count = self.entries.len() as u64;

        if self.zip64 {
            let zip64_eocdr_offset = archive.len() as u64;

            // Zip64 end of central directory record
            put32(&mut archive, 0x0606_4b50);
            put64(&mut archive, 44); // size of the rest of the record
            put16(&mut archive, (3 << 8) | 45);
            put16(&mut archive, 45);
            put32(&mut archive, 0); // this disk
            put32(&mut archive, 0); // disk with the central directory
            put64(&mut archive, count);
            put64(&mut archive, count);
            put64(&mut archive, central.len() as u64);
            put64(&mut archive, central_offset);

            // Zip64 end of central directory locator
            put32(&mut archive, 0x0706_4b50);
            put32(&mut archive, 0);
            put64(&mut archive, zip64_eocdr_offset);
            put32(&mut archive, 1); // total disks
        }

        // End of central directory record
        let short_count = if self.zip64 { u16::MAX } else { count as u16 };
        put32(&mut archive, 0x0605_4b50);
        put16(&mut archive, self.disk_number);
        put16(&mut archive, 0);
        put16(&mut archive, short_count);
        put16(&mut archive, short_count);
        put32(&mut archive, self.saturate(central.len() as u64));
        put32(&mut archive, self.saturate(central_offset));
        put16(&mut archive, 0); // comment

        let mut out = self.prefix.clone();
        out.extend_from_slice(&archive);
        out
    }

    /// 32-bit fields are all ones in Zip64 mode, pointing readers at the 64-bit values.
    fn saturate(&self, v: u64) -> u32 {
        if self.zip64 {
            u32::MAX
        } else {
            v as u32
        }
    }
}

fn zip64_extra(values: &[u64]) -> Vec<u8> {
    let mut extra = Vec::new();
    put16(&mut extra, 0x0001);
    put16(&mut extra, (values.len() * 8) as u16);
    for v in values {
        put64(&mut extra, *v);
    }
    extra
}

fn put16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Deterministic, compressible-but-not-trivially text for seek tests
pub fn sample_text(len: usize) -> Vec<u8> {
    let words = ["archive ", "entry ", "deflate ", "seek ", "zip ", "tree\n"];
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[(i * 7 + i / 3) % words.len()].as_bytes());
        out.extend_from_slice(i.to_string().as_bytes());
        i += 1;
    }
    out.truncate(len);
    out
}
