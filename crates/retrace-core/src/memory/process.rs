//! Live memory access for the current process.

use std::ffi::c_void;

use windows::Win32::System::Memory::{MEM_COMMIT, MEMORY_BASIC_INFORMATION, VirtualQuery};

use crate::error::{Error, Result};
use crate::memory::inspect::InspectMemory;
use crate::memory::region::RegionInfo;

/// The calling process's own address space.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemory;

impl ProcessMemory {
    pub fn new() -> Self {
        Self
    }
}

impl InspectMemory for ProcessMemory {
    fn query_region(&self, address: u64) -> Result<RegionInfo> {
        // SAFETY: MEMORY_BASIC_INFORMATION is plain data; all-zero is valid.
        let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
        // SAFETY: VirtualQuery writes at most `dwlength` bytes into `mbi`
        // and reports unmapped addresses through a zero return value.
        let written = unsafe {
            VirtualQuery(
                Some(address as *const c_void),
                &mut mbi,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if written == 0 {
            return Err(Error::RegionQueryFailed { address });
        }
        Ok(RegionInfo {
            base: mbi.BaseAddress as u64,
            size: mbi.RegionSize as u64,
            committed: mbi.State == MEM_COMMIT,
            protect: mbi.Protect.0,
        })
    }

    fn read_unchecked(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        // SAFETY: the gated default read only calls this once every covering
        // region reported committed, non-guard, readable pages.
        unsafe {
            std::ptr::copy_nonoverlapping(address as *const u8, buf.as_mut_ptr(), buf.len());
        }
        Ok(())
    }
}
