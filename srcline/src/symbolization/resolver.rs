//! Batch resolution of captured frames
//!
//! [`Resolver::resolve_all`] turns a list of [`SourceFrame`]s into the same
//! number of [`ResolvedFrame`]s, in the same order:
//!
//! 1. Pre-populate every result with what the caller already knows
//! 2. Stop there if the resolver tool is unavailable
//! 3. Group frames by owning image (one tool invocation per image)
//! 4. Run each group through the pipeline and parse one line per address
//! 5. Apply each parsed line to the frame it belongs to
//!
//! A group whose tool invocation fails keeps its pre-populated values; the
//! other groups are still resolved.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use srcline_common::{ResolvedFrame, SourceFrame};

use super::config::ResolverConfig;
use super::grammar::Grammar;
use super::pipeline::{AddressPipeline, CommandPipeline};
use super::probe::ToolProbe;
use crate::domain::ResolveError;

/// Addresses of one image, with the frame each one came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionBatch {
    pub image: PathBuf,
    /// `(image_relative_address, index into the original frame list)`
    pub entries: Vec<(u64, usize)>,
}

impl ResolutionBatch {
    fn new(image: PathBuf) -> Self {
        Self { image, entries: Vec::new() }
    }

    #[must_use]
    pub fn addresses(&self) -> Vec<u64> {
        self.entries.iter().map(|&(addr, _)| addr).collect()
    }
}

/// Group frames by image, in order of first appearance
///
/// Frames without an image are left out; nothing could resolve them.
#[must_use]
pub fn collate_frames(frames: &[SourceFrame]) -> Vec<ResolutionBatch> {
    let mut batches: Vec<ResolutionBatch> = Vec::new();
    let mut by_image: HashMap<&str, usize> = HashMap::new();

    for (index, frame) in frames.iter().enumerate() {
        if !frame.has_image() {
            continue;
        }
        let slot = *by_image.entry(frame.owning_image_path.as_str()).or_insert_with(|| {
            batches.push(ResolutionBatch::new(PathBuf::from(&frame.owning_image_path)));
            batches.len() - 1
        });
        batches[slot].entries.push((frame.image_relative_address, index));
    }

    batches
}

/// Split raw tool output into one trimmed line per record
fn split_output(output: &str) -> Vec<&str> {
    output.trim().lines().map(str::trim).collect()
}

/// Resolves frames through an external tool
pub struct Resolver<P = CommandPipeline> {
    probe: Arc<ToolProbe>,
    pipeline: P,
    grammar: Grammar,
}

impl Resolver<CommandPipeline> {
    /// Resolver for `config`, with a fresh probe
    #[must_use]
    pub fn from_config(config: ResolverConfig) -> Self {
        let grammar = config.flavor.grammar();
        let probe = Arc::new(ToolProbe::new(config.clone()));
        Self::new(probe, CommandPipeline::new(config), grammar)
    }

    /// Resolver using the platform's tool with build-time defaults
    #[must_use]
    pub fn native() -> Self {
        Self::from_config(ResolverConfig::default())
    }
}

impl<P: AddressPipeline> Resolver<P> {
    pub fn new(probe: Arc<ToolProbe>, pipeline: P, grammar: Grammar) -> Self {
        Self { probe, pipeline, grammar }
    }

    #[must_use]
    pub fn probe(&self) -> &Arc<ToolProbe> {
        &self.probe
    }

    /// Resolve every frame, preserving count and order
    ///
    /// # Errors
    /// Returns an error only when the tool's output breaks the structure the
    /// parser relies on ([`ResolveError::OutputMisaligned`],
    /// [`ResolveError::MalformedLine`]) or the address batch could not be
    /// written. Missing tools and failed invocations are not errors.
    pub fn resolve_all(
        &self,
        frames: &[SourceFrame],
    ) -> Result<Vec<ResolvedFrame>, ResolveError> {
        let mut trace: Vec<ResolvedFrame> =
            frames.iter().map(ResolvedFrame::from_source).collect();

        if !self.probe.is_available() {
            debug!("No resolver available, returning {} unresolved frames", trace.len());
            return Ok(trace);
        }

        for batch in collate_frames(frames) {
            match self.resolve_batch(&batch, &mut trace) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping {} frames: {e}", batch.entries.len());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(trace)
    }

    fn resolve_batch(
        &self,
        batch: &ResolutionBatch,
        trace: &mut [ResolvedFrame],
    ) -> Result<(), ResolveError> {
        // Some tools misbehave on empty input
        if batch.entries.is_empty() {
            return Ok(());
        }

        let output = self.pipeline.resolve(&batch.addresses(), &batch.image)?;
        let lines = split_output(&output);
        check_alignment(&batch.image, batch.entries.len(), lines.len())?;

        for (&(_, index), line) in batch.entries.iter().zip(lines) {
            self.grammar.parse_line(line)?.apply_to(&mut trace[index]);
        }

        debug!("Resolved {} frames in {}", batch.entries.len(), batch.image.display());
        Ok(())
    }
}

fn check_alignment(image: &Path, expected: usize, actual: usize) -> Result<(), ResolveError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ResolveError::OutputMisaligned { image: image.to_path_buf(), expected, actual })
    }
}
