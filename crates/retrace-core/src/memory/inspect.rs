//! Checked memory access built on top of region queries.
//!
//! Every read goes through [`InspectMemory::read_bytes`], which queries the
//! covering regions first and refuses ranges that are uncommitted or
//! protected. Nothing in this crate dereferences an unqueried address.

use crate::error::{Error, Result};
use crate::memory::region::RegionInfo;

pub trait InspectMemory {
    /// Describe the allocation region containing `address`.
    fn query_region(&self, address: u64) -> Result<RegionInfo>;

    /// Copy bytes with no access checks. Callers must have already
    /// established that the whole range is committed and readable;
    /// [`InspectMemory::read_bytes`] is the only expected caller.
    fn read_unchecked(&self, address: u64, buf: &mut [u8]) -> Result<()>;

    /// Read `len` bytes starting at `address`, verifying first that every
    /// covering region is committed and readable.
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let end = address
            .checked_add(len as u64)
            .ok_or(Error::ReadOutOfRange { address, len })?;

        let mut out = vec![0u8; len];
        let mut cursor = address;
        while cursor < end {
            let region = self.query_region(cursor)?;
            if !region.committed {
                return Err(Error::NotCommitted { address: cursor });
            }
            if !region.is_readable() {
                return Err(Error::NotReadable { address: cursor });
            }
            let span_end = end.min(region.end());
            if span_end <= cursor {
                // A region that does not cover its own query address would
                // stall this loop.
                return Err(Error::RegionQueryFailed { address: cursor });
            }
            let offset = (cursor - address) as usize;
            let take = (span_end - cursor) as usize;
            self.read_unchecked(cursor, &mut out[offset..offset + take])?;
            cursor = span_end;
        }
        Ok(out)
    }

    fn read_u16(&self, address: u64) -> Result<u16> {
        let bytes = self.read_bytes(address, 2)?;
        let mut raw = [0u8; 2];
        raw.copy_from_slice(&bytes);
        Ok(u16::from_le_bytes(raw))
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes);
        Ok(u32::from_le_bytes(raw))
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes);
        Ok(i32::from_le_bytes(raw))
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read a NUL-terminated string of at most `cap` bytes.
    ///
    /// Stops at the terminator, at `cap`, or at the edge of readable memory
    /// once at least one byte came back. Strings running past `cap` are
    /// truncated rather than treated as an error.
    fn read_cstr(&self, address: u64, cap: usize) -> Result<String> {
        let mut out: Vec<u8> = Vec::new();
        let mut cursor = address;
        while out.len() < cap {
            let region = match self.query_region(cursor) {
                Ok(region) => region,
                Err(err) if out.is_empty() => return Err(err),
                Err(_) => break,
            };
            if !region.is_readable() {
                if out.is_empty() {
                    return Err(Error::NotReadable { address: cursor });
                }
                break;
            }
            let span_end = region.end();
            if span_end <= cursor {
                return Err(Error::RegionQueryFailed { address: cursor });
            }
            let take = (span_end - cursor).min((cap - out.len()) as u64) as usize;
            let mut chunk = vec![0u8; take];
            self.read_unchecked(cursor, &mut chunk)?;
            if let Some(nul) = chunk.iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..nul]);
                return Ok(String::from_utf8_lossy(&out).into_owned());
            }
            out.extend_from_slice(&chunk);
            cursor += take as u64;
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
