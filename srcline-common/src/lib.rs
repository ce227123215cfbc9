//! # Shared Frame Types (Collaborators ↔ Resolver)
//!
//! Defines the records exchanged at the boundary of the srcline resolver:
//! whatever discovers raw addresses (an unwinder, a profiler, a crash report)
//! hands over [`SourceFrame`]s, and gets back one [`ResolvedFrame`] per input,
//! in the same order.
//!
//! ## Key Types
//!
//! - [`SourceFrame`] - Raw address plus what is already known about it
//! - [`ResolvedFrame`] - Best-effort symbol, file and line for one address
//! - [`UNKNOWN_LINE`] - Sentinel line number meaning "not resolved"
//!
//! Enable the `serde` feature to serialize both records.

// ============================================================================
// Constants
// ============================================================================

/// Line number sentinel for frames whose source line is unknown
///
/// Line numbers are never this large in practice, so the maximum value is
/// reserved instead of wrapping the field in an `Option`.
pub const UNKNOWN_LINE: u32 = u32::MAX;

// ============================================================================
// Boundary Records
// ============================================================================

/// One captured frame, as handed to the resolver
///
/// Owned by the caller; the resolver never modifies it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceFrame {
    /// Absolute runtime instruction address
    pub raw_address: u64,

    /// Address relative to the owning image's load base
    ///
    /// This is the value sent to the resolver tool.
    pub image_relative_address: u64,

    /// Path of the binary image containing the address
    ///
    /// Empty when the image is unknown; such frames are never sent to a
    /// resolver tool.
    pub owning_image_path: String,

    /// Symbol name from a prior, cheaper lookup (e.g. the image's symbol table)
    pub known_symbol: Option<String>,
}

impl SourceFrame {
    /// Frame with an address and its image, nothing else known yet
    pub fn new(
        raw_address: u64,
        image_relative_address: u64,
        owning_image_path: impl Into<String>,
    ) -> Self {
        Self {
            raw_address,
            image_relative_address,
            owning_image_path: owning_image_path.into(),
            known_symbol: None,
        }
    }

    /// Attach a symbol name that is already known for this frame
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.known_symbol = Some(symbol.into());
        self
    }

    /// Whether the owning image is known, i.e. whether the frame can be resolved
    #[must_use]
    pub fn has_image(&self) -> bool {
        !self.owning_image_path.is_empty()
    }
}

/// Resolution result for one [`SourceFrame`]
///
/// Empty strings and [`UNKNOWN_LINE`] mean "unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedFrame {
    pub address: u64,
    pub line: u32,
    pub filename: String,
    pub symbol: String,
}

impl ResolvedFrame {
    /// Pre-populate a result with everything the source frame already carries
    ///
    /// The image path stands in for the filename until the resolver finds
    /// the real source file.
    #[must_use]
    pub fn from_source(frame: &SourceFrame) -> Self {
        Self {
            address: frame.raw_address,
            line: UNKNOWN_LINE,
            filename: frame.owning_image_path.clone(),
            symbol: frame.known_symbol.clone().unwrap_or_default(),
        }
    }

    /// Whether a source line number is known
    #[must_use]
    pub fn has_line(&self) -> bool {
        self.line != UNKNOWN_LINE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_prepopulates_known_data() {
        let source =
            SourceFrame::new(0x5555_0000_1234, 0x1234, "/usr/bin/demo").with_symbol("main");
        let resolved = ResolvedFrame::from_source(&source);

        assert_eq!(resolved.address, 0x5555_0000_1234);
        assert_eq!(resolved.filename, "/usr/bin/demo");
        assert_eq!(resolved.symbol, "main");
        assert!(!resolved.has_line());
    }

    #[test]
    fn test_from_source_without_symbol() {
        let source = SourceFrame::new(0x10, 0x10, "");
        let resolved = ResolvedFrame::from_source(&source);

        assert!(resolved.symbol.is_empty());
        assert!(resolved.filename.is_empty());
        assert!(!source.has_image());
    }
}
