//! Building [`SourceFrame`]s from raw addresses
//!
//! Two ways in:
//! - [`frames_for_image`]: addresses are already relative to one image
//! - [`FrameBuilder`]: absolute addresses of a live process, located through
//!   its memory maps and translated to image-relative addresses
//!
//! Either way the image's symbol table provides a first guess at the symbol,
//! which the resolver tool later refines.

use anyhow::Result;
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

use srcline_common::SourceFrame;

use crate::symbolization::{ImageInfo, ProcessMaps};

fn load_image_info(path: &Path) -> ImageInfo {
    match ImageInfo::load(path) {
        Ok(info) => info,
        Err(e) => {
            warn!("No symbol table for {}: {e:#}", path.display());
            ImageInfo::default()
        }
    }
}

/// Frames for addresses that are already relative to `image`
#[must_use]
pub fn frames_for_image(image: &Path, addresses: &[u64]) -> Vec<SourceFrame> {
    let info = load_image_info(image);
    let image_path = image.to_string_lossy().into_owned();

    addresses
        .iter()
        .map(|&addr| {
            let frame = SourceFrame::new(addr, addr, image_path.as_str());
            match info.symbol_for(addr) {
                Some(symbol) => frame.with_symbol(symbol),
                None => frame,
            }
        })
        .collect()
}

/// Turns absolute addresses of one process into frames
pub struct FrameBuilder {
    maps: ProcessMaps,
    images: HashMap<String, ImageInfo>,
}

impl FrameBuilder {
    /// Builder for a live process
    ///
    /// # Errors
    /// Returns an error if the process's memory maps cannot be read
    pub fn for_process(pid: i32) -> Result<Self> {
        Ok(Self::from_maps(ProcessMaps::read(pid)?))
    }

    #[must_use]
    pub fn from_maps(maps: ProcessMaps) -> Self {
        Self { maps, images: HashMap::new() }
    }

    /// Pre-load image metadata instead of reading it from disk
    pub fn insert_image(&mut self, path: impl Into<String>, info: ImageInfo) {
        self.images.insert(path.into(), info);
    }

    /// Frame for one absolute address
    ///
    /// Addresses outside every file-backed mapping get an empty image path,
    /// which the resolver passes through untouched.
    pub fn build(&mut self, raw_address: u64) -> SourceFrame {
        let Some(mapping) = self.maps.find(raw_address) else {
            info!("Address 0x{raw_address:016x} is not in any mapped image");
            return SourceFrame::new(raw_address, raw_address, "");
        };

        let path = mapping.path.clone();
        let load_base = self.maps.load_base(&path).unwrap_or(mapping.start);
        let info = self
            .images
            .entry(path.clone())
            .or_insert_with(|| load_image_info(Path::new(&path)));

        let relative = info.relative_address(raw_address, load_base);
        info!("Address 0x{raw_address:016x} ({path}) -> 0x{relative:08x}");

        let frame = SourceFrame::new(raw_address, relative, path);
        match info.symbol_for(relative) {
            Some(symbol) => frame.with_symbol(symbol),
            None => frame,
        }
    }

    /// Frames for a whole trace, in order
    pub fn build_all(&mut self, raw_addresses: &[u64]) -> Vec<SourceFrame> {
        raw_addresses.iter().map(|&addr| self.build(addr)).collect()
    }
}
