//! Structured error types for srcline
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving a pass of frames
///
/// Some variants only cost one image group its resolution and are absorbed
/// by the resolver; the rest mean the resolver tool broke an assumption that
/// positional parsing relies on, and end the pass.
/// See [`ResolveError::is_recoverable`].
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to spawn resolver {program} for {image}: {source}")]
    Spawn {
        program: String,
        image: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read resolver output for {image}: {source}")]
    OutputRead {
        image: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resolver exited with {status} for {image}")]
    ToolFailed { image: PathBuf, status: std::process::ExitStatus },

    #[error("Failed to write addresses to resolver for {image}: {source}")]
    InputWrite {
        image: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resolver produced {actual} lines for {expected} addresses in {image}")]
    OutputMisaligned { image: PathBuf, expected: usize, actual: usize },

    #[error("Unexpected {grammar} output line {line:?}: {reason}")]
    MalformedLine { grammar: &'static str, line: String, reason: &'static str },

    #[error("Empty address batch for {0}")]
    EmptyBatch(PathBuf),
}

impl ResolveError {
    /// Whether the pass can continue with the remaining image groups
    ///
    /// Recoverable errors leave the affected frames with their pre-populated
    /// values. Everything else risks attaching one frame's data to another.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::OutputRead { .. } | Self::ToolFailed { .. })
    }

    pub(crate) fn malformed(grammar: &'static str, line: &str, reason: &'static str) -> Self {
        Self::MalformedLine { grammar, line: line.to_string(), reason }
    }
}
