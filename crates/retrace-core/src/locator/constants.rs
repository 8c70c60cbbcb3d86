//! Search bounds for the stack walk and the backward header scan.

/// Page size on x64 Windows.
pub const PAGE_SIZE: u64 = 0x1000;

/// Width of one stack slot.
pub const SLOT_SIZE: u64 = 8;

/// Default distance in bytes the header scan may cover walking back from a
/// candidate before the candidate is abandoned (256 MiB, 65536 pages).
pub const MAX_SCAN_BYTES: u64 = 0x1000_0000;

/// Longest export name accepted; anything longer is truncated before the
/// comparison.
pub const MAX_NAME_LEN: usize = 255;
