//! Memory region descriptions returned by region queries.
//!
//! The protection bits mirror the Win32 `PAGE_*` values so that region
//! predicates work identically against live queries and test fixtures.

/// No access permitted.
pub const PAGE_NOACCESS: u32 = 0x01;
/// Read-only data.
pub const PAGE_READONLY: u32 = 0x02;
/// Read/write data.
pub const PAGE_READWRITE: u32 = 0x04;
/// Execute-only code.
pub const PAGE_EXECUTE: u32 = 0x10;
/// Executable, readable code. The usual protection for loaded `.text`.
pub const PAGE_EXECUTE_READ: u32 = 0x20;
/// Executable, writable code.
pub const PAGE_EXECUTE_READWRITE: u32 = 0x40;
/// Executable copy-on-write code.
pub const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;
/// Guard page modifier. Touching one raises an exception.
pub const PAGE_GUARD: u32 = 0x100;

const EXECUTE_MASK: u32 =
    PAGE_EXECUTE | PAGE_EXECUTE_READ | PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY;

/// One allocation region as reported by a memory query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    /// Base address of the region.
    pub base: u64,
    /// Size of the region in bytes.
    pub size: u64,
    /// Whether the region's pages are committed.
    pub committed: bool,
    /// Protection bits (`PAGE_*`).
    pub protect: u32,
}

impl RegionInfo {
    /// First address past the end of the region.
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Whether `address` falls inside this region.
    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }

    /// True when any of the execute protection bits is set.
    ///
    /// Windows encodes protections as distinct bits, and modifiers such as
    /// `PAGE_GUARD` combine with them. A mask test keeps guarded or
    /// copy-on-write code pages in scope where an equality test would not.
    pub fn is_executable(&self) -> bool {
        self.protect & EXECUTE_MASK != 0
    }

    /// True when reading the region cannot fault.
    ///
    /// `PAGE_NOACCESS` pages and guard pages are committed but still trap
    /// on touch, so both are excluded.
    pub fn is_readable(&self) -> bool {
        self.committed && self.protect & (PAGE_NOACCESS | PAGE_GUARD) == 0
    }
}
