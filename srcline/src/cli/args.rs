//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::symbolization::{InputMode, ResolverConfig, ToolFlavor, ToolLocation};

#[derive(Parser)]
#[command(
    name = "srcline",
    about = "Resolve instruction addresses to functions, files and lines",
    after_help = "\
EXAMPLES:
    srcline --image ./demo 0x1139 0x1160     Image-relative addresses
    srcline --pid 1234 0x55d0c5a03456        Absolute addresses in a live process
    srcline --frames frames.json --format json
    srcline --flavor atos --resolver /usr/bin/xcrun --resolver-arg atos --image ./demo 0x3b70"
)]
pub struct Args {
    /// Addresses to resolve (hex, `0x` prefix optional)
    #[arg(value_name = "ADDRESS", value_parser = parse_address)]
    pub addresses: Vec<u64>,

    /// Image the addresses are relative to
    #[arg(short, long, conflicts_with_all = ["pid", "frames"])]
    pub image: Option<PathBuf>,

    /// Process whose memory maps locate absolute addresses
    #[arg(short, long, conflicts_with = "frames")]
    pub pid: Option<i32>,

    /// JSON file holding an array of captured frames
    #[arg(long, value_name = "FILE")]
    pub frames: Option<PathBuf>,

    /// Resolver executable (default: looked up on PATH, or fixed at build time)
    #[arg(long, value_name = "PATH")]
    pub resolver: Option<PathBuf>,

    /// Resolver family, selects arguments and output grammar
    #[arg(long, value_enum)]
    pub flavor: Option<Flavor>,

    /// Extra argument passed to the resolver before its own flags (repeatable)
    #[arg(long = "resolver-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub resolver_args: Vec<String>,

    /// Pass addresses on the resolver's command line instead of stdin
    #[arg(long)]
    pub args_input: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress warnings about unavailable resolvers
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Flavor {
    Addr2line,
    Atos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// Build-time defaults with command-line overrides applied
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if let Some(flavor) = self.flavor {
            config.flavor = match flavor {
                Flavor::Addr2line => ToolFlavor::Addr2Line,
                Flavor::Atos => ToolFlavor::Atos,
            };
        }
        if let Some(ref resolver) = self.resolver {
            config.location = ToolLocation::Fixed(resolver.clone());
        }
        if self.args_input {
            config.input_mode = InputMode::Arguments;
        }
        config.with_extra_args(&self.resolver_args)
    }
}

/// Parse a hex address, with or without `0x`
fn parse_address(text: &str) -> Result<u64, String> {
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    u64::from_str_radix(hex, 16).map_err(|e| format!("invalid address '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1a2b"), Ok(0x1a2b));
        assert_eq!(parse_address("1A2B"), Ok(0x1a2b));
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let args = Args::parse_from([
            "srcline",
            "--image",
            "./demo",
            "--flavor",
            "atos",
            "--resolver",
            "/usr/bin/xcrun",
            "--resolver-arg",
            "atos",
            "--args-input",
            "0x10",
        ]);
        let config = args.resolver_config();

        assert_eq!(config.flavor, ToolFlavor::Atos);
        assert_eq!(config.location, ToolLocation::Fixed(PathBuf::from("/usr/bin/xcrun")));
        assert_eq!(config.extra_args, vec!["atos"]);
        assert_eq!(config.input_mode, InputMode::Arguments);
        assert_eq!(args.addresses, vec![0x10]);
    }

    #[test]
    fn test_image_conflicts_with_pid() {
        let result = Args::try_parse_from(["srcline", "--image", "./demo", "--pid", "1", "0x10"]);
        assert!(result.is_err());
    }
}
