//! # retrace-core
//!
//! Resolve the base address of a loaded DLL without touching the loader.
//!
//! This crate provides:
//! - Thread stack bounds capture from the TEB
//! - Checked memory access built on region queries
//! - A stack walker that harvests candidate return addresses
//! - A backward page scanner that validates PE headers in place
//!
//! Return addresses left on the calling thread's stack necessarily point
//! into the code of loaded modules. Walking back from any of them, page by
//! page, eventually reaches the owning image's DOS header, and the export
//! directory inside names the module. No loader structure is consulted at
//! any point.

pub mod error;
pub mod locator;
pub mod memory;
pub mod name;
pub mod stack;

pub use error::{Error, Result};
pub use locator::{
    CandidateAddress, MAX_NAME_LEN, MAX_SCAN_BYTES, ModuleLocator, PAGE_SIZE, SLOT_SIZE,
    SearchStats, StackCandidates, validate_dll,
};
pub use memory::{InspectMemory, RegionInfo};
pub use name::ModuleNameKey;
pub use stack::StackRange;

#[cfg(target_os = "windows")]
pub use memory::ProcessMemory;

/// Find the base address of the loaded module called `name` using the
/// calling thread's own stack.
///
/// Returns `Ok(None)` when nothing on the stack leads to a matching
/// module.
#[cfg(target_os = "windows")]
pub fn find_module_base(name: &str) -> Result<Option<u64>> {
    let range = StackRange::capture()?;
    let memory = ProcessMemory::new();
    Ok(ModuleLocator::new(&memory).locate(range, name))
}
