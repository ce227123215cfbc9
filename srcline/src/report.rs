//! Rendering resolved traces
//!
//! Text output follows the familiar backtrace layout; JSON output is meant for
//! other tools and omits unknown fields instead of printing placeholders.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use srcline_common::ResolvedFrame;

/// One frame in the JSON report
#[derive(Debug, Serialize)]
struct ReportFrame<'a> {
    index: usize,
    /// Hex string, JSON numbers lose precision above 2^53
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    frames: Vec<ReportFrame<'a>>,
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}

/// Format one frame for display
///
/// ```text
/// #0  0x000055d0c5a03456 main
///                       at /src/demo.c:42
/// ```
#[must_use]
pub fn format_frame(frame: &ResolvedFrame, frame_num: usize) -> String {
    let symbol = non_empty(&frame.symbol).unwrap_or("<unknown>");
    let mut output = format!("#{frame_num:<2} 0x{:016x} {symbol}", frame.address);

    if !frame.filename.is_empty() {
        output.push_str("\n                      at ");
        output.push_str(&frame.filename);
        if frame.has_line() {
            output.push(':');
            output.push_str(&frame.line.to_string());
        }
    }

    output
}

/// Write the trace as text, one frame after another
///
/// # Errors
/// Returns an error if writing fails
pub fn write_text<W: Write>(out: &mut W, trace: &[ResolvedFrame]) -> Result<()> {
    for (i, frame) in trace.iter().enumerate() {
        writeln!(out, "{}", format_frame(frame, i)).context("Failed to write trace")?;
    }
    Ok(())
}

/// Write the trace as a JSON document
///
/// # Errors
/// Returns an error if serialization or writing fails
pub fn write_json<W: Write>(out: &mut W, trace: &[ResolvedFrame]) -> Result<()> {
    let report = Report {
        frames: trace
            .iter()
            .enumerate()
            .map(|(index, frame)| ReportFrame {
                index,
                address: format!("{:#x}", frame.address),
                symbol: non_empty(&frame.symbol),
                file: non_empty(&frame.filename),
                line: frame.has_line().then_some(frame.line),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *out, &report).context("Failed to serialize trace")?;
    writeln!(out).context("Failed to write trace")?;
    Ok(())
}
