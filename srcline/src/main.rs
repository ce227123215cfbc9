//! # srcline - Main Entry Point
//!
//! Supports three ways of describing the addresses to resolve:
//! - **Image** (`--image <PATH> ADDRESS...`): addresses relative to one binary
//! - **Process** (`--pid <PID> ADDRESS...`): absolute addresses in a live process
//! - **Frames** (`--frames <FILE>`): a JSON array of captured frames

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::io::{self, Write};

use srcline::cli::{Args, OutputFormat};
use srcline::domain::SourceFrame;
use srcline::frames::{frames_for_image, FrameBuilder};
use srcline::preflight::{check_image_exists, check_proc_access, check_process_exists};
use srcline::report::{write_json, write_text};
use srcline::symbolization::Resolver;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Build the frames to resolve from whichever input mode was chosen
fn collect_frames(args: &Args) -> Result<Vec<SourceFrame>> {
    if let Some(ref path) = args.frames {
        if !args.addresses.is_empty() {
            bail!("--frames cannot be combined with ADDRESS arguments");
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let frames: Vec<SourceFrame> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse frames from {}", path.display()))?;
        return Ok(frames);
    }

    if args.image.is_none() && args.pid.is_none() {
        bail!(
            "Missing required argument: --image, --pid or --frames\n\n\
             Usage:\n  \
             srcline --image ./demo 0x1139       Image-relative addresses\n  \
             srcline --pid 1234 0x55d0c5a03456   Addresses in a live process\n\n\
             Run 'srcline --help' for more options"
        );
    }
    if args.addresses.is_empty() {
        bail!("Missing required argument: ADDRESS");
    }

    if let Some(ref image) = args.image {
        check_image_exists(image)?;
        let image = fs::canonicalize(image)
            .with_context(|| format!("Failed to resolve path: {}", image.display()))?;
        return Ok(frames_for_image(&image, &args.addresses));
    }

    let pid = args.pid.context("Missing required argument: --pid")?;
    check_process_exists(pid)?;
    check_proc_access(pid)?;
    Ok(FrameBuilder::for_process(pid)?.build_all(&args.addresses))
}

fn run() -> Result<()> {
    let args = Args::parse();
    let frames = collect_frames(&args)?;

    let config = args.resolver_config();
    let program = config.program().to_string_lossy().into_owned();
    let resolver = Resolver::from_config(config);

    if !resolver.probe().is_available() && !args.quiet {
        eprintln!("warning: resolver '{program}' not available, showing unresolved frames");
    }

    info!("Resolving {} frames with {program}", frames.len());
    let trace = resolver.resolve_all(&frames).context("Failed to resolve addresses")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => write_text(&mut out, &trace)?,
        OutputFormat::Json => write_json(&mut out, &trace)?,
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}
