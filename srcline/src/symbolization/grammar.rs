//! Resolver output grammars
//!
//! Each resolver family prints one line per address, in its own loosely
//! specified format. [`Grammar::parse_line`] turns one such line into a
//! [`PartialResolution`]: only the fields the tool actually knew are set, so
//! applying it never replaces known data with placeholders.
//!
//! ```text
//! addr2line -f -C -p      main at /src/demo.cpp:42
//!                         ?? ??:0
//!                         helper :?
//!                         helper at ??:?
//!
//! atos -fullPath          main (in demo) (/src/demo.cpp:42)
//!                         helper (in demo) + 14
//!                         0x100003b70 (in demo)
//!                         0xffffffffffffffff
//! ```
//!
//! Lines that break the structure of their grammar are errors, not "unknown":
//! alignment between addresses and output lines is positional, so guessing
//! would silently attach data to the wrong frame.

use srcline_common::ResolvedFrame;

use crate::domain::ResolveError;

/// Output grammar of a resolver tool family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `<symbol> at <path>:<line>` (addr2line)
    LineOriented,
    /// `<symbol> (in <image>) (<path>:<line>)` (atos)
    Atos,
}

/// Fields recovered from one output line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResolution {
    pub symbol: Option<String>,
    pub filename: Option<String>,
    pub line_number: Option<u32>,
}

impl PartialResolution {
    /// Overwrite the frame's fields with the ones that were resolved
    pub fn apply_to(self, frame: &mut ResolvedFrame) {
        if let Some(symbol) = self.symbol {
            frame.symbol = symbol;
        }
        if let Some(filename) = self.filename {
            frame.filename = filename;
        }
        if let Some(line) = self.line_number {
            frame.line = line;
        }
    }

    /// Whether the line carried no information at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.filename.is_none() && self.line_number.is_none()
    }
}

impl Grammar {
    /// Tool family name, as reported in parse errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LineOriented => "addr2line",
            Self::Atos => "atos",
        }
    }

    /// Parse one trimmed output line
    ///
    /// # Errors
    /// Returns [`ResolveError::MalformedLine`] if the line does not follow the
    /// grammar's structure.
    pub fn parse_line(self, line: &str) -> Result<PartialResolution, ResolveError> {
        match self {
            Self::LineOriented => parse_line_oriented(line),
            Self::Atos => parse_atos(line),
        }
    }
}

// ============================================================================
// addr2line
// ============================================================================

const A2L: &str = Grammar::LineOriented.name();

fn parse_line_oriented(line: &str) -> Result<PartialResolution, ResolveError> {
    let (symbol, location) = if let Some((symbol, location)) = line.split_once(" at ") {
        (symbol, location)
    } else if let Some(location) = line.strip_prefix("?? ") {
        ("", location)
    } else if let Some(symbol) = line.strip_suffix(" :?") {
        (symbol, ":?")
    } else {
        return Err(ResolveError::malformed(A2L, line, "no ' at ' separator"));
    };

    // "file.c:42 (discriminator 3)"
    let location = match location.find(" (discriminator ") {
        Some(idx) => &location[..idx],
        None => location,
    };

    // Rightmost colon: the path itself may contain one (C:\src\demo.cpp)
    let (filename, line_text) = location
        .rsplit_once(':')
        .ok_or_else(|| ResolveError::malformed(A2L, line, "no ':' before the line number"))?;

    let line_number = match line_text {
        "?" => None,
        text => match text.parse::<u32>() {
            // addr2line prints 0 for "no line info"; never overwrite with it
            Ok(0) => None,
            Ok(n) => Some(n),
            Err(_) => return Err(ResolveError::malformed(A2L, line, "line number is not numeric")),
        },
    };

    Ok(PartialResolution {
        symbol: known(symbol),
        filename: known(filename),
        line_number,
    })
}

/// `None` for addr2line's placeholders
fn known(field: &str) -> Option<String> {
    match field {
        "" | "??" => None,
        value => Some(value.to_string()),
    }
}

// ============================================================================
// atos
// ============================================================================

const ATOS: &str = Grammar::Atos.name();
const IN_MARKER: &str = " (in ";
const FILE_MARKER: &str = ") (";

fn parse_atos(line: &str) -> Result<PartialResolution, ResolveError> {
    let mut resolution = PartialResolution::default();

    // A bare address: atos knew nothing about it
    let Some(in_start) = line.find(IN_MARKER) else {
        return Ok(resolution);
    };

    let symbol = &line[..in_start];
    if !symbol.is_empty() && !is_bare_address(symbol) {
        resolution.symbol = Some(symbol.to_string());
    }

    let image_end = line[in_start..]
        .find(')')
        .map(|idx| in_start + idx)
        .ok_or_else(|| ResolveError::malformed(ATOS, line, "unterminated image name"))?;

    // "foo (in bar) + 14" or "foo (in bar)": no file information
    let Some(file_marker) = line[image_end..].find(FILE_MARKER) else {
        return Ok(resolution);
    };
    let location = &line[image_end + file_marker + FILE_MARKER.len()..];

    let (filename, rest) = location
        .split_once(':')
        .ok_or_else(|| ResolveError::malformed(ATOS, line, "no ':' in file location"))?;
    let line_text = rest
        .strip_suffix(')')
        .filter(|text| !text.contains(')'))
        .ok_or_else(|| ResolveError::malformed(ATOS, line, "location does not end the line"))?;
    let line_number = line_text
        .parse::<u32>()
        .map_err(|_| ResolveError::malformed(ATOS, line, "line number is not numeric"))?;

    if !filename.is_empty() {
        resolution.filename = Some(filename.to_string());
    }
    resolution.line_number = Some(line_number);
    Ok(resolution)
}

/// `0x1234abcd`, printed by atos in place of an unknown symbol
fn is_bare_address(text: &str) -> bool {
    text.strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcline_common::{SourceFrame, UNKNOWN_LINE};

    fn parse_a(line: &str) -> PartialResolution {
        Grammar::LineOriented.parse_line(line).unwrap()
    }

    fn parse_b(line: &str) -> PartialResolution {
        Grammar::Atos.parse_line(line).unwrap()
    }

    #[test]
    fn test_addr2line_full_resolution() {
        let parsed = parse_a("foo at bar.cpp:42");
        assert_eq!(parsed.symbol.as_deref(), Some("foo"));
        assert_eq!(parsed.filename.as_deref(), Some("bar.cpp"));
        assert_eq!(parsed.line_number, Some(42));
    }

    #[test]
    fn test_addr2line_total_failure() {
        assert!(parse_a("?? ??:0").is_empty());
    }

    #[test]
    fn test_addr2line_symbol_without_location() {
        let parsed = parse_a("foo :?");
        assert_eq!(parsed.symbol.as_deref(), Some("foo"));
        assert_eq!(parsed.filename, None);
        assert_eq!(parsed.line_number, None);

        let parsed = parse_a("foo at ??:?");
        assert_eq!(parsed.symbol.as_deref(), Some("foo"));
        assert_eq!(parsed.filename, None);
        assert_eq!(parsed.line_number, None);
    }

    #[test]
    fn test_addr2line_splits_at_rightmost_colon() {
        let parsed = parse_a(r"main at C:\path\to\file.cpp:10");
        assert_eq!(parsed.filename.as_deref(), Some(r"C:\path\to\file.cpp"));
        assert_eq!(parsed.line_number, Some(10));
    }

    #[test]
    fn test_addr2line_demangled_symbol_with_colons() {
        let parsed = parse_a("ns::Widget::draw(int) const at /src/widget.cpp:7");
        assert_eq!(parsed.symbol.as_deref(), Some("ns::Widget::draw(int) const"));
        assert_eq!(parsed.filename.as_deref(), Some("/src/widget.cpp"));
        assert_eq!(parsed.line_number, Some(7));
    }

    #[test]
    fn test_addr2line_discriminator_suffix() {
        let parsed = parse_a("loop_body at /src/loop.c:18 (discriminator 3)");
        assert_eq!(parsed.filename.as_deref(), Some("/src/loop.c"));
        assert_eq!(parsed.line_number, Some(18));
    }

    #[test]
    fn test_addr2line_unknown_symbol_known_file() {
        let parsed = parse_a("?? /src/start.S:12");
        assert_eq!(parsed.symbol, None);
        assert_eq!(parsed.filename.as_deref(), Some("/src/start.S"));
        assert_eq!(parsed.line_number, Some(12));
    }

    #[test]
    fn test_addr2line_rejects_unstructured_line() {
        let err = Grammar::LineOriented.parse_line("something unexpected").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLine { grammar: "addr2line", .. }));
    }

    #[test]
    fn test_addr2line_rejects_missing_colon() {
        assert!(Grammar::LineOriented.parse_line("foo at bar.cpp").is_err());
    }

    #[test]
    fn test_addr2line_rejects_non_numeric_line() {
        assert!(Grammar::LineOriented.parse_line("foo at bar.cpp:forty").is_err());
    }

    #[test]
    fn test_addr2line_zero_line_keeps_known_line() {
        let parsed = parse_a("foo at /src/bar.c:0");
        assert_eq!(parsed.symbol.as_deref(), Some("foo"));
        assert_eq!(parsed.filename.as_deref(), Some("/src/bar.c"));
        assert_eq!(parsed.line_number, None);
    }

    #[test]
    fn test_malformed_line_names_its_grammar() {
        let err = Grammar::LineOriented.parse_line("garbage").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLine { grammar: "addr2line", .. }));

        let err = Grammar::Atos.parse_line("foo (in bar").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLine { grammar: "atos", .. }));
    }

    #[test]
    fn test_atos_full_resolution() {
        let parsed = parse_b("trace() (in demo) (demo.cpp:8)");
        assert_eq!(parsed.symbol.as_deref(), Some("trace()"));
        assert_eq!(parsed.filename.as_deref(), Some("demo.cpp"));
        assert_eq!(parsed.line_number, Some(8));
    }

    #[test]
    fn test_atos_bare_address_in_image() {
        assert!(parse_b("0x100003b70 (in demo)").is_empty());
    }

    #[test]
    fn test_atos_bare_address() {
        assert!(parse_b("0xffffffffffffffff").is_empty());
    }

    #[test]
    fn test_atos_symbol_with_offset() {
        let parsed = parse_b("foo (in bar) + 14");
        assert_eq!(parsed.symbol.as_deref(), Some("foo"));
        assert_eq!(parsed.filename, None);
        assert_eq!(parsed.line_number, None);
    }

    #[test]
    fn test_atos_full_path() {
        let parsed = parse_b("-[AppDelegate run:] (in Demo) (/Users/dev/Demo/AppDelegate.m:120)");
        assert_eq!(parsed.symbol.as_deref(), Some("-[AppDelegate run:]"));
        assert_eq!(parsed.filename.as_deref(), Some("/Users/dev/Demo/AppDelegate.m"));
        assert_eq!(parsed.line_number, Some(120));
    }

    #[test]
    fn test_atos_rejects_trailing_text_after_location() {
        let err = Grammar::Atos.parse_line("foo (in bar) (foo.cpp:8) extra").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedLine { grammar: "atos", .. }));
    }

    #[test]
    fn test_atos_rejects_missing_colon() {
        assert!(Grammar::Atos.parse_line("foo (in bar) (foo.cpp)").is_err());
    }

    #[test]
    fn test_atos_rejects_unterminated_image() {
        assert!(Grammar::Atos.parse_line("foo (in bar").is_err());
    }

    #[test]
    fn test_apply_keeps_prior_values() {
        let source = SourceFrame::new(0x4000, 0x400, "/usr/bin/demo").with_symbol("demo_main");
        let mut frame = ResolvedFrame::from_source(&source);

        parse_a("?? ??:0").apply_to(&mut frame);
        assert_eq!(frame.symbol, "demo_main");
        assert_eq!(frame.filename, "/usr/bin/demo");
        assert_eq!(frame.line, UNKNOWN_LINE);

        parse_a("demo_main at /src/demo.c:3").apply_to(&mut frame);
        assert_eq!(frame.filename, "/src/demo.c");
        assert_eq!(frame.line, 3);
    }
}
