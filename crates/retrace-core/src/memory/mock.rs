//! Mock memory for tests.
//!
//! Regions are declared up front with explicit protections, and every
//! query and raw read is logged so tests can assert on access order and on
//! the gate never touching memory it did not query first.

use std::cell::{Cell, RefCell};

use crate::error::{Error, Result};
use crate::memory::inspect::InspectMemory;
use crate::memory::region::RegionInfo;

/// One logged access against a [`MockMemory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Query(u64),
    Read { address: u64, len: usize },
}

struct MockRegion {
    info: RegionInfo,
    bytes: Vec<u8>,
}

pub struct MockMemory {
    regions: Vec<MockRegion>,
    accesses: RefCell<Vec<Access>>,
    gate_violations: Cell<usize>,
}

impl MockMemory {
    fn find(&self, address: u64) -> Option<&MockRegion> {
        self.regions.iter().find(|r| r.info.contains(address))
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.accesses.borrow().clone()
    }

    pub fn queries(&self) -> usize {
        self.accesses
            .borrow()
            .iter()
            .filter(|a| matches!(a, Access::Query(_)))
            .count()
    }

    pub fn reads(&self) -> usize {
        self.accesses
            .borrow()
            .iter()
            .filter(|a| matches!(a, Access::Read { .. }))
            .count()
    }

    /// Number of raw reads that touched memory outside a committed,
    /// readable region. Anything above zero means the access gate was
    /// bypassed, which on a live process would have been a crash.
    pub fn gate_violations(&self) -> usize {
        self.gate_violations.get()
    }
}

impl InspectMemory for MockMemory {
    fn query_region(&self, address: u64) -> Result<RegionInfo> {
        self.accesses.borrow_mut().push(Access::Query(address));
        self.find(address)
            .map(|r| r.info)
            .ok_or(Error::RegionQueryFailed { address })
    }

    fn read_unchecked(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        self.accesses.borrow_mut().push(Access::Read {
            address,
            len: buf.len(),
        });
        let end = address.saturating_add(buf.len() as u64);
        match self.find(address) {
            Some(r) if r.info.is_readable() && end <= r.info.end() => {
                let offset = (address - r.info.base) as usize;
                buf.copy_from_slice(&r.bytes[offset..offset + buf.len()]);
                Ok(())
            }
            Some(r) => {
                self.gate_violations.set(self.gate_violations.get() + 1);
                if r.info.committed {
                    Err(Error::NotReadable { address })
                } else {
                    Err(Error::NotCommitted { address })
                }
            }
            None => {
                self.gate_violations.set(self.gate_violations.get() + 1);
                Err(Error::RegionQueryFailed { address })
            }
        }
    }
}

#[derive(Default)]
pub struct MockMemoryBuilder {
    regions: Vec<MockRegion>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed region backed by `bytes`.
    pub fn committed(mut self, base: u64, protect: u32, bytes: &[u8]) -> Self {
        self.regions.push(MockRegion {
            info: RegionInfo {
                base,
                size: bytes.len() as u64,
                committed: true,
                protect,
            },
            bytes: bytes.to_vec(),
        });
        self
    }

    /// Committed region of `size` zero bytes.
    pub fn committed_zeroed(self, base: u64, protect: u32, size: u64) -> Self {
        let bytes = vec![0u8; size as usize];
        self.committed_owned(base, protect, bytes)
    }

    fn committed_owned(mut self, base: u64, protect: u32, bytes: Vec<u8>) -> Self {
        self.regions.push(MockRegion {
            info: RegionInfo {
                base,
                size: bytes.len() as u64,
                committed: true,
                protect,
            },
            bytes,
        });
        self
    }

    /// Reserved but uncommitted region. Queries succeed, reads must not.
    pub fn reserved(mut self, base: u64, size: u64) -> Self {
        self.regions.push(MockRegion {
            info: RegionInfo {
                base,
                size,
                committed: false,
                protect: 0,
            },
            bytes: Vec::new(),
        });
        self
    }

    pub fn build(self) -> MockMemory {
        MockMemory {
            regions: self.regions,
            accesses: RefCell::new(Vec::new()),
            gate_violations: Cell::new(0),
        }
    }
}

/// Forged 64-bit DLL image for header validation tests.
///
/// Field values are written at the raw documented file offsets rather than
/// through the validator's own constants, so a typo in either side shows up
/// as a test failure instead of cancelling out.
pub struct SyntheticDll {
    pub name: String,
    pub e_lfanew: i32,
    pub nt_signature: u32,
    pub machine: u16,
    pub characteristics: u16,
    pub export_rva: u32,
    pub name_rva: u32,
    pub size: usize,
}

impl SyntheticDll {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            e_lfanew: 0x80,
            nt_signature: 0x0000_4550,
            machine: 0x8664,
            characteristics: 0x2000,
            export_rva: 0x200,
            name_rva: 0x300,
            size: 0x1000,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut img = vec![0u8; self.size];
        put_u16(&mut img, 0x00, 0x5A4D); // e_magic "MZ"
        put_u32(&mut img, 0x3C, self.e_lfanew as u32);
        if self.e_lfanew > 0 {
            let nt = self.e_lfanew as usize;
            put_u32(&mut img, nt, self.nt_signature);
            put_u16(&mut img, nt + 4, self.machine); // FileHeader.Machine
            put_u16(&mut img, nt + 22, self.characteristics); // FileHeader.Characteristics
            put_u32(&mut img, nt + 136, self.export_rva); // DataDirectory[0].VirtualAddress
        }
        if self.export_rva != 0 {
            put_u32(&mut img, self.export_rva as usize + 0x0C, self.name_rva);
        }
        if self.name_rva != 0 {
            let at = self.name_rva as usize;
            if at + self.name.len() < img.len() {
                img[at..at + self.name.len()].copy_from_slice(self.name.as_bytes());
            }
        }
        img
    }
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    if offset + 2 <= buf.len() {
        buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    if offset + 4 <= buf.len() {
        buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::region::PAGE_READONLY;

    #[test]
    fn test_raw_read_outside_regions_counts_as_violation() {
        let mock = MockMemoryBuilder::new()
            .committed(0x1000, PAGE_READONLY, &[0u8; 16])
            .build();

        let mut buf = [0u8; 4];
        assert!(mock.read_unchecked(0x9000, &mut buf).is_err());
        assert_eq!(mock.gate_violations(), 1);
    }

    #[test]
    fn test_synthetic_dll_layout() {
        let img = SyntheticDll::named("demo.dll").bytes();
        assert_eq!(&img[0..2], b"MZ");
        assert_eq!(u32::from_le_bytes([img[0x3C], img[0x3D], img[0x3E], img[0x3F]]), 0x80);
        assert_eq!(&img[0x80..0x84], b"PE\0\0");
        assert_eq!(u16::from_le_bytes([img[0x84], img[0x85]]), 0x8664);
        assert_eq!(u16::from_le_bytes([img[0x96], img[0x97]]), 0x2000);
        let export_rva = u32::from_le_bytes([img[0x108], img[0x109], img[0x10A], img[0x10B]]);
        assert_eq!(export_rva, 0x200);
        let name_rva = u32::from_le_bytes([img[0x20C], img[0x20D], img[0x20E], img[0x20F]]);
        assert_eq!(name_rva, 0x300);
        assert_eq!(&img[0x300..0x309], b"demo.dll\0");
    }
}
