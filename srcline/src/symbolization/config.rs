//! Resolver tool configuration
//!
//! Which external program to run, how to pass it addresses, and which output
//! grammar to expect. Defaults are fixed at build time:
//!
//! - `SRCLINE_RESOLVER_PATH` set while compiling: run that exact binary
//! - otherwise: look the tool up on `PATH`
//!
//! The flavor (and with it the grammar) follows the target platform: `atos` on
//! Apple targets, `addr2line` everywhere else.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::grammar::Grammar;

/// Absolute resolver path baked in at build time, if any
const BUILD_TIME_RESOLVER_PATH: Option<&str> = option_env!("SRCLINE_RESOLVER_PATH");

/// Where the resolver executable comes from
///
/// Exactly one of the two is always chosen; there is no "unset" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    /// Search `PATH` for the flavor's default program name
    SearchPath,
    /// Run this executable
    Fixed(PathBuf),
}

/// Resolver tool family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFlavor {
    /// GNU/LLVM `addr2line`, line-oriented output
    Addr2Line,
    /// macOS `atos`
    Atos,
}

impl ToolFlavor {
    /// Flavor matching the platform this crate was built for
    #[must_use]
    pub fn native() -> Self {
        if cfg!(target_vendor = "apple") {
            Self::Atos
        } else {
            Self::Addr2Line
        }
    }

    /// Program name looked up on `PATH`
    #[must_use]
    pub fn program_name(self) -> &'static str {
        match self {
            Self::Addr2Line => "addr2line",
            Self::Atos => "atos",
        }
    }

    /// Output grammar this tool family produces
    #[must_use]
    pub fn grammar(self) -> Grammar {
        match self {
            Self::Addr2Line => Grammar::LineOriented,
            Self::Atos => Grammar::Atos,
        }
    }

    /// Arguments selecting the image and the output format
    pub(crate) fn image_args(self, image: &Path) -> Vec<OsString> {
        match self {
            // -f: function names, -C: demangle, -p: one line per address
            Self::Addr2Line => vec![
                "-e".into(),
                image.as_os_str().to_owned(),
                "-f".into(),
                "-C".into(),
                "-p".into(),
            ],
            Self::Atos => vec!["-o".into(), image.as_os_str().to_owned(), "-fullPath".into()],
        }
    }
}

/// How addresses reach the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Newline-separated on standard input
    Stdin,
    /// Appended to the command line
    Arguments,
}

impl InputMode {
    #[must_use]
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Arguments
        } else {
            Self::Stdin
        }
    }
}

/// Full resolver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub location: ToolLocation,
    pub flavor: ToolFlavor,
    pub input_mode: InputMode,
    /// Arguments placed before the flavor's own (e.g. `atos` for `xcrun`)
    pub extra_args: Vec<OsString>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let location = match BUILD_TIME_RESOLVER_PATH {
            Some(path) if !path.is_empty() => ToolLocation::Fixed(PathBuf::from(path)),
            _ => ToolLocation::SearchPath,
        };
        Self {
            location,
            flavor: ToolFlavor::native(),
            input_mode: InputMode::native(),
            extra_args: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Configuration running a fixed executable with the given flavor
    pub fn fixed(program: impl Into<PathBuf>, flavor: ToolFlavor) -> Self {
        Self { location: ToolLocation::Fixed(program.into()), flavor, ..Self::default() }
    }

    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = input_mode;
        self
    }

    /// Program to execute
    #[must_use]
    pub fn program(&self) -> &OsStr {
        match &self.location {
            ToolLocation::SearchPath => OsStr::new(self.flavor.program_name()),
            ToolLocation::Fixed(path) => path.as_os_str(),
        }
    }

    /// Argument used to check that the tool runs at all
    pub(crate) fn probe_arg(&self) -> &'static str {
        if cfg!(windows) {
            "--version"
        } else {
            "--help"
        }
    }
}
