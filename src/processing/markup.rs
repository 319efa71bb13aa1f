//! Structured view of the emphasis markup in generated summaries.
//!
//! Providers are asked to wrap salient tokens in `**`. The raw summary is passed through
//! untouched; these segments give renderers a markup-free alternative.

use serde::Serialize;

const MARKER: &str = "**";

/// Piece of a summary, either plain or emphasized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum SummarySegment {
    /// Unemphasized text.
    Text(String),
    /// A salient name, date, number or concept.
    Highlight(String),
}

/// Split a summary into plain and highlighted segments.
///
/// An opening marker without a closing one is kept as literal text.
pub fn parse_highlights(summary: &str) -> Vec<SummarySegment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = summary;

    while let Some(open) = rest.find(MARKER) {
        let after_open = &rest[open + MARKER.len()..];
        let Some(close) = after_open.find(MARKER) else {
            break;
        };
        plain.push_str(&rest[..open]);
        let highlighted = &after_open[..close];
        if !highlighted.trim().is_empty() {
            if !plain.is_empty() {
                segments.push(SummarySegment::Text(std::mem::take(&mut plain)));
            }
            segments.push(SummarySegment::Highlight(highlighted.to_string()));
        }
        rest = &after_open[close + MARKER.len()..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        segments.push(SummarySegment::Text(plain));
    }
    segments
}
