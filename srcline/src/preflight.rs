//! Pre-flight checks for srcline
//!
//! Validates inputs before any resolver is spawned, with clear, actionable
//! error messages instead of a resolver silently printing `??`.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Check that an image given with `--image` exists and is a file
pub fn check_image_exists(image: &Path) -> Result<()> {
    if !image.exists() {
        bail!(
            "Image not found: {}\n\n\
             Make sure the path is correct and the binary exists.",
            image.display()
        );
    }
    if !image.is_file() {
        bail!(
            "Not a file: {}\n\n\
             --image must point to an executable or shared library, not a directory.",
            image.display()
        );
    }
    Ok(())
}

/// Check if the target process exists
pub fn check_process_exists(pid: i32) -> Result<()> {
    let proc_path = format!("/proc/{pid}");
    if !Path::new(&proc_path).exists() {
        bail!(
            "Process {pid} not found.\n\n\
             Is the process still running? Check with: ps -p {pid}"
        );
    }
    Ok(())
}

/// Check if we can read the process's memory maps
pub fn check_proc_access(pid: i32) -> Result<()> {
    let maps_path = format!("/proc/{pid}/maps");
    std::fs::read_to_string(&maps_path).with_context(|| {
        format!(
            "Cannot read {maps_path}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {pid})\n\
             - Permission denied (run as the process owner or with sudo)\n\
             - /proc is not mounted"
        )
    })?;
    Ok(())
}
