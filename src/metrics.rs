//! Text measurement and line wrapping.
//!
//! Widths come from a Helvetica-like advance table rather than the embedded
//! font, so they are estimates. The table is wider than the serif face the
//! PDF is set in, which keeps wrapped lines inside the margins.

use std::mem;

use crate::block::Span;

pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Bold glyphs run wider than regular ones.
const BOLD_FACTOR: f64 = 1.08;

/// Advance width of `ch` in thousandths of an em.
fn advance(ch: char) -> u16 {
    match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'f' | 't' | 'I' => 278,
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '|' => 260,
        '"' => 355,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '{' | '}' => 334,
        '^' => 469,
        '+' | '<' | '=' | '>' | '~' => 584,
        '%' => 889,
        '@' => 1015,
        '0'..='9' | '#' | '$' | '?' | '_' => 556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        'F' | 'T' | 'Z' => 611,
        'L' => 556,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'A'..='Z' | '&' => 667,
        'a'..='z' => 556,
        '\t' => 1112,
        _ => 600,
    }
}

/// Width of `text` in millimetres at `size` points.
pub fn text_width(text: &str, size: f64, bold: bool) -> f64 {
    let em: u32 = text.chars().map(|ch| u32::from(advance(ch))).sum();
    let factor = if bold { BOLD_FACTOR } else { 1.0 };
    f64::from(em) / 1000.0 * size * PT_TO_MM * factor
}

/// A styled fragment of one laid-out line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub emphasized: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Vec<Run>>,
    current: Vec<Run>,
    used: f64,
}

impl LineBuilder {
    fn push(&mut self, text: &str, emphasized: bool, width: f64) {
        match self.current.last_mut() {
            Some(last) if last.emphasized == emphasized => last.text.push_str(text),
            _ => self.current.push(Run {
                text: text.to_string(),
                emphasized,
            }),
        }
        self.used += width;
    }

    fn break_line(&mut self) {
        self.lines.push(mem::take(&mut self.current));
        self.used = 0.0;
    }

    fn finish(mut self) -> Vec<Vec<Run>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }
}

/// Greedy word wrap of styled spans into lines no wider than `max_width` mm.
///
/// Spaces at the start of a wrapped line are dropped. A word wider than a
/// whole line is broken between characters. Always returns at least one
/// (possibly empty) line.
///
/// Break points are found per span, so a word whose style changes mid-word
/// (`a**b**c`) may wrap at the style boundary.
pub fn wrap(spans: &[Span], max_width: f64, size: f64) -> Vec<Vec<Run>> {
    let mut builder = LineBuilder::default();

    for span in spans {
        let bold = span.emphasized;
        for piece in span.text.split_inclusive(' ') {
            let word = piece.trim_end_matches(' ');
            let word_width = text_width(word, size, bold);

            if !builder.current.is_empty() && builder.used + word_width > max_width {
                builder.break_line();
            }

            let piece = if builder.current.is_empty() {
                piece.trim_start_matches(' ')
            } else {
                piece
            };
            if piece.is_empty() {
                continue;
            }

            if builder.current.is_empty() && word_width > max_width {
                let mut buf = [0u8; 4];
                for ch in piece.chars() {
                    let ch_width = text_width(ch.encode_utf8(&mut buf), size, bold);
                    if ch != ' ' && !builder.current.is_empty() && builder.used + ch_width > max_width
                    {
                        builder.break_line();
                    }
                    builder.push(ch.encode_utf8(&mut buf), bold, ch_width);
                }
                continue;
            }

            builder.push(piece, bold, text_width(piece, size, bold));
        }
    }

    builder.finish()
}
