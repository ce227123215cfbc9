//! Domain model for srcline
//!
//! Error types shared by the resolver pipeline. The frame records themselves
//! live in `srcline-common` so collaborators can depend on them alone.

pub mod errors;

pub use errors::ResolveError;
pub use srcline_common::{ResolvedFrame, SourceFrame, UNKNOWN_LINE};
