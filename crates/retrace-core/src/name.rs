//! Module name comparison.

use std::fmt;

/// Canonical form of a module name: ASCII-lowercased, with one trailing
/// `.dll` removed. Two names resolve to the same key exactly when they
/// refer to the same module, so `KERNEL32.DLL` and `kernel32` compare
/// equal while `kernel32.dll.dll` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleNameKey(String);

impl ModuleNameKey {
    pub fn new(name: &str) -> Self {
        let mut key = name.to_ascii_lowercase();
        if let Some(stripped) = key.strip_suffix(".dll") {
            key.truncate(stripped.len());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleNameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
