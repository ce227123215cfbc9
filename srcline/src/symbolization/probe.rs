//! Resolver tool availability check
//!
//! Runs the configured tool once with a harmless argument and remembers
//! whether it exited cleanly. Share one [`ToolProbe`] (behind an `Arc`) between
//! every resolver that uses the same tool so the check happens once.

use log::{debug, info};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use super::config::ResolverConfig;

/// Cached answer to "is the resolver tool installed and runnable?"
#[derive(Debug)]
pub struct ToolProbe {
    config: Option<ResolverConfig>,
    available: OnceLock<bool>,
}

impl ToolProbe {
    /// Probe for the tool described by `config`; nothing runs until asked
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config: Some(config), available: OnceLock::new() }
    }

    /// A probe whose answer is already known and never spawns anything
    #[must_use]
    pub fn with_outcome(available: bool) -> Self {
        Self { config: None, available: OnceLock::from(available) }
    }

    /// Whether the tool can be used
    ///
    /// The first call runs the tool; concurrent first callers block until
    /// that single run finishes and all see the same result.
    #[must_use]
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.config.as_ref().is_some_and(run_probe))
    }

    /// Whether the probe has already produced its answer
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.available.get().is_some()
    }
}

fn run_probe(config: &ResolverConfig) -> bool {
    let program = config.program();
    let status = Command::new(program)
        .args(&config.extra_args)
        .arg(config.probe_arg())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => {
            debug!("Resolver {} is available", program.to_string_lossy());
            true
        }
        Ok(status) => {
            info!("Resolver {} exited with {status}, disabling", program.to_string_lossy());
            false
        }
        Err(e) => {
            info!("Resolver {} could not be started: {e}", program.to_string_lossy());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolization::config::ToolFlavor;
    use std::sync::Arc;

    #[test]
    fn test_preset_outcome_needs_no_tool() {
        let probe = ToolProbe::with_outcome(true);
        assert!(probe.is_checked());
        assert!(probe.is_available());
        assert!(!ToolProbe::with_outcome(false).is_available());
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let probe = ToolProbe::new(ResolverConfig::fixed(
            "/nonexistent/bin/addr2line",
            ToolFlavor::Addr2Line,
        ));
        assert!(!probe.is_checked());
        assert!(!probe.is_available());
        assert!(probe.is_checked());
        // Cached
        assert!(!probe.is_available());
    }

    #[test]
    fn test_concurrent_callers_agree() {
        let probe = Arc::new(ToolProbe::new(ResolverConfig::fixed(
            "/nonexistent/bin/atos",
            ToolFlavor::Atos,
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let probe = Arc::clone(&probe);
                std::thread::spawn(move || probe.is_available())
            })
            .collect();

        for handle in handles {
            assert!(!handle.join().unwrap());
        }
    }
}
