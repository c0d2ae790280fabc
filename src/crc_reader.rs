//! A reader that checks an entry's CRC-32 once it's fully decompressed

use std::io;
use std::io::prelude::*;

use crc32fast::Hasher;
use log::*;

/// Passes bytes through from `inner`, hashing them as they go by.
///
/// When `inner` runs dry, the running checksum must match the one recorded
/// in the archive, otherwise the final read fails with `InvalidData`.
pub struct Crc32Reader<R> {
    inner: R,
    hasher: Hasher,
    expected: u32,
}

impl<R> Crc32Reader<R> {
    pub fn new(inner: R, expected: u32) -> Self {
        Self {
            inner,
            hasher: Hasher::new(),
            expected,
        }
    }

    fn verify(&self) -> io::Result<()> {
        let actual = self.hasher.clone().finalize();
        if actual == self.expected {
            Ok(())
        } else {
            debug!(
                "CRC-32 mismatch: expected {:#010x}, got {:#010x}",
                self.expected, actual
            );
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "CRC-32 mismatch (expected {:#010x}, got {:#010x})",
                    self.expected, actual
                ),
            ))
        }
    }
}

impl<R: Read> Read for Crc32Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.inner.read(buf)?;
        if count == 0 && !buf.is_empty() {
            self.verify()?;
        }
        self.hasher.update(&buf[..count]);
        Ok(count)
    }
}
