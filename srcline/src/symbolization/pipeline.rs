//! One resolver invocation per image
//!
//! [`CommandPipeline`] spawns the configured tool for a single image, feeds it
//! the whole address batch, and collects everything it prints. The write runs
//! on its own scoped thread while the caller drains stdout, so a batch larger
//! than the pipe buffer cannot wedge both processes.
//!
//! ```text
//!   writer thread ──"0x1a2b\n0x3c4d\n"──▶ stdin ┐
//!                                               │ addr2line -e <image> -f -C -p
//!   caller ◀──────"main at demo.c:3\n..."─ stdout ┘      (stderr → /dev/null)
//! ```

use log::debug;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use super::config::{InputMode, ResolverConfig};
use crate::domain::ResolveError;

/// Runs a batch of image-relative addresses through a resolver
///
/// Implementations must return exactly one output line per address, in
/// input order. Alignment is positional; the caller checks the line count.
pub trait AddressPipeline {
    /// Resolve `addresses`, all belonging to `image`
    ///
    /// # Errors
    /// See [`ResolveError`]; `addresses` must not be empty.
    fn resolve(&self, addresses: &[u64], image: &Path) -> Result<String, ResolveError>;
}

/// Subprocess-backed pipeline
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    config: ResolverConfig,
}

impl CommandPipeline {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    fn command(&self, addresses: &[u64], image: &Path) -> Command {
        let mut cmd = Command::new(self.config.program());
        cmd.args(&self.config.extra_args)
            .args(self.config.flavor.image_args(image))
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        match self.config.input_mode {
            InputMode::Stdin => {
                cmd.stdin(Stdio::piped());
            }
            InputMode::Arguments => {
                cmd.args(addresses.iter().map(|addr| format!("{addr:#x}")));
                cmd.stdin(Stdio::null());
            }
        }
        cmd
    }
}

/// Hex-encode a batch, one address per line
pub(crate) fn encode_addresses(addresses: &[u64]) -> String {
    addresses.iter().map(|addr| format!("{addr:#x}\n")).collect()
}

impl AddressPipeline for CommandPipeline {
    fn resolve(&self, addresses: &[u64], image: &Path) -> Result<String, ResolveError> {
        if addresses.is_empty() {
            return Err(ResolveError::EmptyBatch(image.to_path_buf()));
        }

        let mut cmd = self.command(addresses, image);
        debug!("Spawning {cmd:?} for {} addresses", addresses.len());

        let mut child = cmd.spawn().map_err(|source| ResolveError::Spawn {
            program: self.config.program().to_string_lossy().into_owned(),
            image: image.to_path_buf(),
            source,
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let payload = match self.config.input_mode {
            InputMode::Stdin => encode_addresses(addresses),
            InputMode::Arguments => String::new(),
        };

        let (written, output) = thread::scope(|scope| {
            // Dropping stdin at the end of the closure signals end-of-input
            let writer = stdin.map(|mut stdin| {
                let payload = payload.as_bytes();
                scope.spawn(move || stdin.write_all(payload))
            });

            // stdout is dropped before joining so a stuck child sees EPIPE
            let output = match stdout {
                Some(mut stdout) => {
                    let mut buf = Vec::new();
                    stdout.read_to_end(&mut buf).map(|_| buf)
                }
                None => Err(io::Error::other("resolver stdout was not captured")),
            };

            let written = match writer {
                Some(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("address writer panicked"))),
                None => Ok(()),
            };
            (written, output)
        });

        // Reap the child on every path before reporting anything
        let status = child
            .wait()
            .map_err(|source| ResolveError::OutputRead { image: image.to_path_buf(), source })?;

        // A tool that bails out early (e.g. unreadable image) stops reading
        // stdin, so its write error is a symptom of the failed exit.
        if !status.success() {
            if let Err(e) = &written {
                debug!("Resolver for {} stopped reading input: {e}", image.display());
            }
            return Err(ResolveError::ToolFailed { image: image.to_path_buf(), status });
        }

        written.map_err(|source| ResolveError::InputWrite { image: image.to_path_buf(), source })?;
        let output = output
            .map_err(|source| ResolveError::OutputRead { image: image.to_path_buf(), source })?;

        debug!("Resolver wrote {} bytes for {}", output.len(), image.display());
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
