use std::convert::TryFrom;

use crate::result::*;

/// A checked cast from an archive's 16/32/64-bit fields to usize
///
/// Offsets and sizes in a Zip64 archive are 64 bits wide;
/// on 32-bit targets they might not fit in the address space.
pub fn usize<I: Into<u64>>(i: I) -> FsResult<usize> {
    usize::try_from(i.into()).map_err(|_| FsError::InsufficientAddressSpace)
}
