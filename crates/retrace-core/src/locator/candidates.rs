//! Candidate return addresses harvested from the thread stack.

use crate::memory::InspectMemory;
use crate::stack::StackRange;

use super::constants::SLOT_SIZE;
use super::utils::align_up_to_slot;

/// One stack slot and the value it held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateAddress {
    /// Address of the slot on the stack.
    pub slot: u64,
    /// Value read out of the slot.
    pub value: u64,
}

/// Iterator over the 8-byte slots between the captured stack pointer and
/// the stack base. Slots that cannot be read are skipped, not fatal.
pub struct StackCandidates<'a, M: InspectMemory> {
    memory: &'a M,
    cursor: u64,
    base: u64,
    limit: u64,
    visited: u64,
    skipped: u64,
}

impl<'a, M: InspectMemory> StackCandidates<'a, M> {
    pub fn new(memory: &'a M, range: StackRange) -> Self {
        Self {
            memory,
            cursor: align_up_to_slot(range.pointer),
            base: range.base,
            limit: range.limit,
            visited: 0,
            skipped: 0,
        }
    }

    /// Slots whose value was read.
    pub fn visited(&self) -> u64 {
        self.visited
    }

    /// Slots passed over because the read was refused.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<'a, M: InspectMemory> Iterator for StackCandidates<'a, M> {
    type Item = CandidateAddress;

    fn next(&mut self) -> Option<CandidateAddress> {
        while self.cursor < self.base && self.cursor > self.limit {
            let slot = self.cursor;
            self.cursor += SLOT_SIZE;
            match self.memory.read_u64(slot) {
                Ok(value) => {
                    self.visited += 1;
                    return Some(CandidateAddress { slot, value });
                }
                Err(_) => self.skipped += 1,
            }
        }
        None
    }
}
