//! Calling-thread stack bounds.
//!
//! On x64 Windows the Thread Environment Block begins with the NT_TIB
//! header, whose second and third pointers hold the stack's high and low
//! edges. The TEB is reachable through the `gs` segment without any API
//! call, so capturing the bounds never leaves the thread.

use crate::error::{Error, Result};

/// The calling thread's stack edges plus the stack pointer at capture time.
///
/// `base` is the high edge and is exclusive; the stack grows down from it
/// toward `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRange {
    pub base: u64,
    pub limit: u64,
    pub pointer: u64,
}

impl StackRange {
    /// Capture the current thread's stack range.
    #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
    pub fn capture() -> Result<Self> {
        let (base, limit) = imp::stack_bounds();
        let pointer = imp::stack_pointer();
        if base == 0 || limit == 0 || limit >= base {
            return Err(Error::StackUnavailable);
        }
        Ok(Self {
            base,
            limit,
            pointer,
        })
    }

    #[cfg(not(all(target_os = "windows", target_arch = "x86_64")))]
    pub fn capture() -> Result<Self> {
        Err(Error::StackUnavailable)
    }

    /// Bytes between the two edges.
    pub fn span(&self) -> u64 {
        self.base.saturating_sub(self.limit)
    }
}

#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
mod imp {
    use std::arch::asm;
    use std::ffi::c_void;

    /// Leading pointers of the x64 NT_TIB.
    #[repr(C)]
    struct NtTib {
        exception_list: *const c_void,
        stack_base: *const c_void,
        stack_limit: *const c_void,
    }

    pub(super) fn stack_bounds() -> (u64, u64) {
        let tib: *const NtTib;
        // SAFETY: gs:[0x30] holds the TEB self pointer for the current
        // thread, and the NT_TIB header it starts with stays mapped for
        // the thread's lifetime.
        unsafe {
            asm!("mov {}, gs:[0x30]", out(reg) tib, options(nostack, readonly, preserves_flags));
            ((*tib).stack_base as u64, (*tib).stack_limit as u64)
        }
    }

    #[inline(always)]
    pub(super) fn stack_pointer() -> u64 {
        let rsp: u64;
        // SAFETY: reads the register without touching memory.
        unsafe {
            asm!("mov {}, rsp", out(reg) rsp, options(nomem, nostack, preserves_flags));
        }
        rsp
    }
}
