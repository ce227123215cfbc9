//! Static image metadata
//!
//! Reads the two things the resolver's callers need from an ELF image without
//! touching its debug info: the link-time address of its first loadable
//! segment (to translate runtime addresses) and its function symbols (a cheap
//! first guess at the symbol before the resolver tool runs).

use anyhow::{Context, Result};
use object::{Object, ObjectSegment, ObjectSymbol, SymbolKind};
use std::fs;
use std::path::Path;

/// A function symbol from the image's symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub address: u64,
    pub size: u64,
    pub name: String,
}

/// Address layout and symbols of one image
#[derive(Debug, Clone, Default)]
pub struct ImageInfo {
    /// Link-time address of the lowest loadable segment (0 for PIE and .so)
    pub link_base: u64,
    /// Sorted by address
    symbols: Vec<SymbolEntry>,
}

impl ImageInfo {
    /// Load metadata for the image at `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a supported object file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let obj = object::File::parse(&*data)
            .with_context(|| format!("Failed to parse object file {}", path.display()))?;

        let link_base = obj.segments().map(|segment| segment.address()).min().unwrap_or(0);

        // Stripped shared libraries still carry their dynamic symbols
        let mut symbols: Vec<SymbolEntry> = obj
            .symbols()
            .chain(obj.dynamic_symbols())
            .filter(|sym| sym.kind() == SymbolKind::Text && sym.is_definition())
            .filter_map(|sym| {
                let name = sym.name().ok().filter(|name| !name.is_empty())?;
                Some(SymbolEntry {
                    address: sym.address(),
                    size: sym.size(),
                    name: name.to_string(),
                })
            })
            .collect();
        symbols.sort_by_key(|sym| sym.address);
        symbols.dedup_by_key(|sym| sym.address);

        Ok(Self::from_parts(link_base, symbols))
    }

    /// Build from already-known parts; symbols need not be sorted
    #[must_use]
    pub fn from_parts(link_base: u64, mut symbols: Vec<SymbolEntry>) -> Self {
        symbols.sort_by_key(|sym| sym.address);
        Self { link_base, symbols }
    }

    /// Translate a runtime address into the image's own address space
    ///
    /// `load_base` is the runtime address of the image's first byte.
    #[must_use]
    pub fn relative_address(&self, raw_address: u64, load_base: u64) -> u64 {
        raw_address.wrapping_sub(load_base).wrapping_add(self.link_base)
    }

    /// Nearest function symbol at or below `address`
    ///
    /// Symbols with a known size only match addresses inside them.
    #[must_use]
    pub fn symbol_for(&self, address: u64) -> Option<&str> {
        let idx = self.symbols.partition_point(|sym| sym.address <= address);
        let sym = self.symbols.get(idx.checked_sub(1)?)?;
        if sym.size != 0 && address >= sym.address.saturating_add(sym.size) {
            return None;
        }
        Some(&sym.name)
    }

    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(address: u64, size: u64, name: &str) -> SymbolEntry {
        SymbolEntry { address, size, name: name.to_string() }
    }

    #[test]
    fn test_symbol_lookup() {
        let info = ImageInfo::from_parts(
            0,
            vec![sym(0x2000, 0x40, "helper"), sym(0x1000, 0x100, "main"), sym(0x3000, 0, "tail")],
        );

        assert_eq!(info.symbol_for(0x1000), Some("main"));
        assert_eq!(info.symbol_for(0x10ff), Some("main"));
        assert_eq!(info.symbol_for(0x1100), None);
        assert_eq!(info.symbol_for(0x2010), Some("helper"));
        assert_eq!(info.symbol_for(0x3500), Some("tail"));
        assert_eq!(info.symbol_for(0x0fff), None);
    }

    #[test]
    fn test_relative_address() {
        let pie = ImageInfo::from_parts(0, Vec::new());
        assert_eq!(pie.relative_address(0x55d0_c5a0_3456, 0x55d0_c5a0_0000), 0x3456);

        let fixed = ImageInfo::from_parts(0x40_0000, Vec::new());
        assert_eq!(fixed.relative_address(0x40_1234, 0x40_0000), 0x40_1234);
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-elf");
        std::fs::write(&path, b"#!/bin/sh\necho hi\n").unwrap();
        assert!(ImageInfo::load(&path).is_err());
    }

    #[test]
    fn test_load_current_executable() {
        if cfg!(target_os = "linux") {
            let exe = std::env::current_exe().unwrap();
            let info = ImageInfo::load(exe).unwrap();
            assert!(info.symbol_count() > 0);
        }
    }
}
