//! Memory mapping utilities for process address space analysis
//!
//! This module parses /proc/pid/maps to find which loaded image contains a
//! runtime address, and where that image was loaded, so absolute addresses can
//! be turned into image-relative ones for the resolver tool.

use anyhow::{Context, Result};
use log::debug;
use std::fs;

/// One file-backed mapping from /proc/pid/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMapping {
    pub start: u64,
    pub end: u64,
    pub offset: u64,
    pub path: String,
}

impl ImageMapping {
    /// Check if an address falls within this mapping
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

/// All file-backed mappings of a process
#[derive(Debug, Clone, Default)]
pub struct ProcessMaps {
    mappings: Vec<ImageMapping>,
}

impl ProcessMaps {
    /// Read /proc/pid/maps for a live process
    ///
    /// # Errors
    /// Returns an error if /proc/pid/maps cannot be read or parsed
    pub fn read(pid: i32) -> Result<Self> {
        let maps_path = format!("/proc/{pid}/maps");
        let maps = fs::read_to_string(&maps_path).context(format!("Failed to read {maps_path}"))?;
        let parsed = Self::parse(&maps)?;
        debug!("Parsed {} file-backed mappings from {maps_path}", parsed.mappings.len());
        Ok(parsed)
    }

    /// Parse the text of a maps file
    ///
    /// Anonymous and pseudo mappings (`[heap]`, `[vdso]`, ...) are skipped.
    ///
    /// # Errors
    /// Returns an error if an address range is not valid hex
    pub fn parse(maps: &str) -> Result<Self> {
        let mut mappings = Vec::new();

        for line in maps.lines() {
            // "start-end perms offset dev inode pathname"
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                continue;
            }
            let path = parts[5..].join(" ");
            if !path.starts_with('/') {
                continue;
            }

            let (start, end) = parts[0].split_once('-').context("Malformed address range")?;
            let start = u64::from_str_radix(start, 16).context("Failed to parse range start")?;
            let end = u64::from_str_radix(end, 16).context("Failed to parse range end")?;
            let offset = u64::from_str_radix(parts[2], 16).context("Failed to parse offset")?;

            mappings.push(ImageMapping { start, end, offset, path });
        }

        Ok(Self { mappings })
    }

    /// Mapping containing `addr`, if any
    #[must_use]
    pub fn find(&self, addr: u64) -> Option<&ImageMapping> {
        self.mappings.iter().find(|m| m.contains(addr))
    }

    /// Lowest address at which `path` is mapped
    ///
    /// The first mapping of an image covers file offset 0, so this is the
    /// runtime address of the image's first byte.
    #[must_use]
    pub fn load_base(&self, path: &str) -> Option<u64> {
        self.mappings
            .iter()
            .filter(|m| m.path == path)
            .filter_map(|m| m.start.checked_sub(m.offset))
            .min()
    }

    #[must_use]
    pub fn mappings(&self) -> &[ImageMapping] {
        &self.mappings
    }
}
