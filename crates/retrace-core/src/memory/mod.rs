mod inspect;
mod region;

#[cfg(target_os = "windows")]
mod process;

#[cfg(test)]
pub mod mock;

pub use inspect::InspectMemory;
pub use region::*;

#[cfg(target_os = "windows")]
pub use process::ProcessMemory;

#[cfg(test)]
pub use mock::{Access, MockMemory, MockMemoryBuilder, SyntheticDll};
