//! Split field text into emphasized and plain segments for display.

use super::matcher::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

/// Segment `text` by char-offset spans. Overlapping or out-of-range spans are
/// clipped; an empty span list yields one plain segment.
pub fn segments<'a>(text: &'a str, spans: &[Span]) -> Vec<Segment<'a>> {
    // Char index -> byte offset, plus one past the end
    let mut bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    bounds.push(text.len());
    let char_len = bounds.len() - 1;

    let mut out = Vec::new();
    let mut cursor = 0;
    for span in spans {
        let start = span.start.max(cursor).min(char_len);
        let end = span.end().min(char_len);
        if start >= end {
            continue;
        }
        if start > cursor {
            out.push(Segment {
                text: &text[bounds[cursor]..bounds[start]],
                emphasized: false,
            });
        }
        out.push(Segment {
            text: &text[bounds[start]..bounds[end]],
            emphasized: true,
        });
        cursor = end;
    }
    if cursor < char_len || out.is_empty() {
        out.push(Segment {
            text: &text[bounds[cursor]..],
            emphasized: false,
        });
    }
    out
}

/// Wrap every emphasized segment in `open` / `close` markers.
pub fn mark(text: &str, spans: &[Span], open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    for segment in segments(text, spans) {
        if segment.emphasized {
            out.push_str(open);
            out.push_str(segment.text);
            out.push_str(close);
        } else {
            out.push_str(segment.text);
        }
    }
    out
}
