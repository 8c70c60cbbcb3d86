//! PE header validation for candidate image bases.
//!
//! A page starting with `MZ` is only accepted as a module base after the
//! whole chain holds: DOS header, NT headers for a 64-bit DLL, and an
//! export directory that names the image. Everything is read through the
//! checked access gate, so a forged `e_lfanew` or RVA lands in a rejected
//! candidate rather than a fault.

use crate::error::Result;
use crate::memory::InspectMemory;

use super::constants::MAX_NAME_LEN;

/// DOS header fields.
pub mod dos {
    /// `e_magic`, the two bytes `MZ`.
    pub const MAGIC: u16 = 0x5A4D;
    /// Offset of `e_lfanew`, the signed 32-bit offset to the NT headers.
    pub const E_LFANEW: u64 = 0x3C;
}

/// NT header fields, as offsets from the NT signature.
pub mod nt {
    /// `PE\0\0`.
    pub const SIGNATURE: u32 = 0x0000_4550;
    /// `FileHeader.Machine`.
    pub const MACHINE: u64 = 4;
    /// `FileHeader.Characteristics`.
    pub const CHARACTERISTICS: u64 = 22;
    /// `DataDirectory[0].VirtualAddress` in the 64-bit optional header.
    pub const EXPORT_DIRECTORY_RVA: u64 = 136;
}

/// Export directory fields, as offsets from the directory start.
pub mod export {
    /// RVA of the exporting module's own name.
    pub const NAME: u64 = 0x0C;
}

/// `IMAGE_FILE_MACHINE_AMD64`.
pub const MACHINE_AMD64: u16 = 0x8664;
/// `IMAGE_FILE_DLL`.
pub const IMAGE_FILE_DLL: u16 = 0x2000;

/// Walk the DOS -> NT -> export directory chain at `base` and return the
/// image's export name.
///
/// `Ok(None)` means a structural check failed. Read errors bubble up and
/// the scan loop treats them the same way.
pub fn validate_dll<M: InspectMemory>(memory: &M, base: u64) -> Result<Option<String>> {
    if memory.read_u16(base)? != dos::MAGIC {
        return Ok(None);
    }

    // e_lfanew is signed on disk; zero or negative cannot reach NT headers
    // above the base.
    let e_lfanew = memory.read_i32(base + dos::E_LFANEW)?;
    if e_lfanew <= 0 {
        return Ok(None);
    }
    let nt = match base.checked_add(e_lfanew as u64) {
        Some(nt) => nt,
        None => return Ok(None),
    };

    if memory.read_u32(nt)? != nt::SIGNATURE {
        return Ok(None);
    }
    if memory.read_u16(nt + nt::CHARACTERISTICS)? & IMAGE_FILE_DLL == 0 {
        return Ok(None);
    }
    if memory.read_u16(nt + nt::MACHINE)? != MACHINE_AMD64 {
        return Ok(None);
    }

    let export_rva = memory.read_u32(nt + nt::EXPORT_DIRECTORY_RVA)?;
    if export_rva == 0 {
        return Ok(None);
    }
    let export_dir = match base.checked_add(export_rva as u64) {
        Some(addr) => addr,
        None => return Ok(None),
    };

    let name_rva = memory.read_u32(export_dir + export::NAME)?;
    if name_rva == 0 {
        return Ok(None);
    }
    let name_addr = match base.checked_add(name_rva as u64) {
        Some(addr) => addr,
        None => return Ok(None),
    };

    let name = memory.read_cstr(name_addr, MAX_NAME_LEN)?;
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some(name))
}
