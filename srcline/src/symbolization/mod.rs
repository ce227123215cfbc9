//! # Address to Source Resolution
//!
//! This module turns image-relative instruction addresses into function names,
//! source files and line numbers by running an external resolver tool
//! (`addr2line` or `atos`) and parsing what it prints.
//!
//! ## Pipeline
//!
//! ```text
//! SourceFrame[]                                   ResolvedFrame[]
//!      │                                                ▲
//!      ▼                                                │ apply per line
//! ┌──────────┐  per image  ┌──────────────┐  text  ┌──────────┐
//! │ Resolver │────────────▶│ CommandPipe- │───────▶│ Grammar  │
//! │ (collate)│  addresses  │ line (spawn) │  lines │ (parse)  │
//! └──────────┘             └──────────────┘        └──────────┘
//!      │
//!      └── ToolProbe: is the tool there at all? (checked once)
//! ```
//!
//! ## Why one process per image
//!
//! The resolver tools accept a single image per invocation, and spawning is
//! the expensive part. All addresses belonging to the same image are sent in
//! one batch, and the tool answers with one line per address, in order.
//! Nothing in the output identifies which address a line belongs to, so the
//! resolver insists on an exact line count and a well-formed grammar.
//!
//! ## Degraded Modes
//!
//! - **No tool installed**: frames come back with the image path as filename
//!   and whatever symbol the caller already knew
//! - **Tool fails for one image**: that image's frames keep those values,
//!   other images are still resolved
//! - **Tool output breaks alignment or grammar**: the pass fails with an error
//!
//! ## Module Structure
//!
//! - **`config`**: which tool to run and how (build-time defaults)
//! - **`probe`**: cached availability check
//! - **`pipeline`**: spawning the tool and exchanging data over pipes
//! - **`grammar`**: the `addr2line` and `atos` output formats
//! - **`resolver`**: grouping, alignment checks and demultiplexing
//! - **`memory_maps`** / **`image`**: address translation and symbol table
//!   lookups used to build frames for a live process
//!
//! ## Example
//!
//! ```rust,ignore
//! let resolver = Resolver::native();
//! let frames = vec![SourceFrame::new(0x55f3_a2b4_c780, 0x780, "/usr/bin/demo")];
//! let trace = resolver.resolve_all(&frames)?;
//! // trace[0].symbol = "main", trace[0].filename = "/src/demo.c", trace[0].line = 42
//! ```

pub mod config;
pub mod grammar;
pub mod image;
pub mod memory_maps;
pub mod pipeline;
pub mod probe;
pub mod resolver;

pub use config::{InputMode, ResolverConfig, ToolFlavor, ToolLocation};
pub use grammar::{Grammar, PartialResolution};
pub use image::ImageInfo;
pub use memory_maps::{ImageMapping, ProcessMaps};
pub use pipeline::{AddressPipeline, CommandPipeline};
pub use probe::ToolProbe;
pub use resolver::{collate_frames, ResolutionBatch, Resolver};
