//! # srcline - Address to Source Line Resolution
//!
//! srcline turns raw instruction addresses into function names, source files
//! and line numbers by batching them through an external resolver tool
//! (`addr2line` on Linux and most Unixes, `atos` on macOS) and parsing the
//! tool's output.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   Collaborators: unwinder, profiler, crash report, CLI       │
//! │   (raw address → image, image-relative address, symbol)      │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ SourceFrame[]
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    srcline::symbolization                    │
//! │                                                              │
//! │  ToolProbe ──▶ Resolver ──▶ CommandPipeline ──▶ Grammar      │
//! │  (once)        (group by     (one process        (addr2line  │
//! │                 image)        per image)          or atos)   │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ ResolvedFrame[] (same count, same order)
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 report: text or JSON output                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`symbolization`]: the resolution pipeline (probe, process, grammars)
//! - [`frames`]: building `SourceFrame`s from images or live processes
//! - [`domain`]: error types and re-exported frame records
//! - [`report`]: rendering resolved traces
//! - [`cli`]: command-line argument parsing and configuration
//! - [`preflight`]: input validation with actionable messages
//!
//! ## Typical Usage
//!
//! ```bash
//! # Addresses relative to an image
//! srcline --image ./target/debug/demo 0x1139 0x1160
//!
//! # Absolute addresses inside a running process
//! srcline --pid 1234 0x55d0c5a03456
//! ```
//!
//! ## Build-time Configuration
//!
//! Set `SRCLINE_RESOLVER_PATH` while building to pin an absolute resolver
//! path; otherwise `addr2line`/`atos` is looked up on `PATH` at runtime.

pub mod cli;
pub mod domain;
pub mod frames;
pub mod preflight;
pub mod report;
pub mod symbolization;
