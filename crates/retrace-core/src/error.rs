use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to query memory region at address {address:#x}")]
    RegionQueryFailed { address: u64 },

    #[error("Memory at address {address:#x} is not committed")]
    NotCommitted { address: u64 },

    #[error("Memory at address {address:#x} is not readable")]
    NotReadable { address: u64 },

    #[error("Read of {len} bytes at address {address:#x} leaves addressable range")]
    ReadOutOfRange { address: u64, len: usize },

    #[error("Thread stack bounds are unavailable on this platform")]
    StackUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error only disqualifies a single address rather than
    /// the whole search. Candidate and page loops skip past these.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Error::StackUnavailable)
    }
}
