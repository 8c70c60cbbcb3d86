//! Address arithmetic helpers for the scan loops.

use super::constants::{PAGE_SIZE, SLOT_SIZE};

/// Round `address` down to the start of its page.
pub fn page_align_down(address: u64) -> u64 {
    address & !(PAGE_SIZE - 1)
}

/// Round `address` up to the next stack slot boundary.
pub fn align_up_to_slot(address: u64) -> u64 {
    address.saturating_add(SLOT_SIZE - 1) & !(SLOT_SIZE - 1)
}
