//! Stack-walk module location.
//!
//! The search never consults the loader. Every 8-byte slot between the
//! captured stack pointer and the stack base is treated as a potential
//! return address; values pointing into committed executable memory are
//! walked backward page by page until a page opens with a DOS signature
//! whose header chain names the wanted module.

mod candidates;
mod constants;
pub mod header;
mod utils;

use tracing::debug;

use crate::memory::InspectMemory;
use crate::name::ModuleNameKey;
use crate::stack::StackRange;

pub use candidates::{CandidateAddress, StackCandidates};
pub use constants::{MAX_NAME_LEN, MAX_SCAN_BYTES, PAGE_SIZE, SLOT_SIZE};
pub use header::validate_dll;

use utils::page_align_down;

/// Counters describing one search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Stack slots whose value was read.
    pub slots_visited: u64,
    /// Stack slots passed over because the slot itself was unreadable.
    pub slots_skipped: u64,
    /// Slot values that pointed into committed executable memory.
    pub exec_candidates: u64,
    /// Pages probed for a DOS signature across all backward scans.
    pub pages_probed: u64,
    /// Pages carrying a DOS signature that failed validation or named a
    /// different module.
    pub headers_rejected: u64,
}

/// Finds loaded module bases by walking the thread stack.
pub struct ModuleLocator<'a, M: InspectMemory> {
    memory: &'a M,
    max_scan_bytes: u64,
}

impl<'a, M: InspectMemory> ModuleLocator<'a, M> {
    pub fn new(memory: &'a M) -> Self {
        Self {
            memory,
            max_scan_bytes: MAX_SCAN_BYTES,
        }
    }

    /// Cap each backward scan at `bytes` instead of [`MAX_SCAN_BYTES`].
    pub fn with_max_scan_bytes(mut self, bytes: u64) -> Self {
        self.max_scan_bytes = bytes;
        self
    }

    /// Find the base address of the loaded module called `name`.
    ///
    /// Returns `None` when no slot in `range` leads to a matching module.
    /// Unreadable slots and garbage candidates are skipped, so a miss is a
    /// clean miss rather than an error.
    pub fn locate(&self, range: StackRange, name: &str) -> Option<u64> {
        self.locate_with_stats(range, name).0
    }

    pub fn locate_with_stats(&self, range: StackRange, name: &str) -> (Option<u64>, SearchStats) {
        let target = ModuleNameKey::new(name);
        let mut stats = SearchStats::default();

        debug!(
            "Walking stack {:#x}..{:#x} from rsp {:#x} for '{}'",
            range.limit, range.base, range.pointer, target
        );

        let mut found = None;
        let mut candidates = StackCandidates::new(self.memory, range);
        for candidate in candidates.by_ref() {
            let region = match self.memory.query_region(candidate.value) {
                Ok(region) => region,
                Err(_) => continue,
            };
            if !region.committed || !region.is_executable() {
                continue;
            }
            stats.exec_candidates += 1;
            debug!(
                "Slot {:#x} holds {:#x}, executable region at {:#x}",
                candidate.slot, candidate.value, region.base
            );
            if let Some(base) = self.scan_backward(candidate.value, &target, &mut stats) {
                found = Some(base);
                break;
            }
        }
        stats.slots_visited = candidates.visited();
        stats.slots_skipped = candidates.skipped();

        match found {
            Some(base) => debug!("Found '{}' at {:#x} ({:?})", target, base, stats),
            None => debug!("No match for '{}' ({:?})", target, stats),
        }
        (found, stats)
    }

    /// Walk back page by page from `from` until a header chain names the
    /// target, the scan cap runs out, or the walk leaves committed
    /// memory.
    fn scan_backward(
        &self,
        from: u64,
        target: &ModuleNameKey,
        stats: &mut SearchStats,
    ) -> Option<u64> {
        let mut cursor = page_align_down(from);
        let mut scanned: u64 = 0;

        while scanned < self.max_scan_bytes {
            let region = match self.memory.query_region(cursor) {
                Ok(region) => region,
                Err(_) => return None,
            };
            if !region.committed {
                return None;
            }
            stats.pages_probed += 1;

            match self.memory.read_u16(cursor) {
                Ok(magic) if magic == header::dos::MAGIC => {
                    match header::validate_dll(self.memory, cursor) {
                        Ok(Some(name)) => {
                            debug!("Export name at {:#x}: {}", cursor, name);
                            if ModuleNameKey::new(&name) == *target {
                                return Some(cursor);
                            }
                            stats.headers_rejected += 1;
                        }
                        Ok(None) | Err(_) => stats.headers_rejected += 1,
                    }
                }
                Ok(_) => {}
                Err(_) => return None,
            }

            if cursor <= PAGE_SIZE {
                return None;
            }
            cursor -= PAGE_SIZE;
            scanned += PAGE_SIZE;
        }
        None
    }
}
