use std::sync::LazyLock;

use regex::Regex;

use crate::block::{Block, Element};
use crate::sanitize::sanitize;
use crate::table::{TableAccumulator, is_table_row};

/// `![alt](path)` at the start of a line; anything after it is ignored.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)").expect("valid image pattern"));

/// Strip a UTF-8 byte order mark left by some editors
fn strip_bom(markdown: &str) -> &str {
    markdown.strip_prefix('\u{feff}').unwrap_or(markdown)
}

/// Parse markdown text into a list of elements
pub fn parse(markdown: &str) -> Vec<Element> {
    let lines: Vec<&str> = strip_bom(markdown).lines().collect();
    let mut classifier = Classifier::default();
    let mut elements = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let lookahead = lines.get(i + 1).copied();
        if let Some(element) = classifier.step(line, lookahead) {
            elements.push(element);
        }
    }

    elements
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Default,
    InTable(TableAccumulator),
}

/// Line classifier with one line of lookahead, used only to end table runs.
#[derive(Debug, Default)]
pub struct Classifier {
    state: State,
}

impl Classifier {
    pub fn in_table(&self) -> bool {
        matches!(self.state, State::InTable(_))
    }

    /// Consume one raw source line. `lookahead` is the next raw line, or
    /// `None` at end of input.
    pub fn step(&mut self, line: &str, lookahead: Option<&str>) -> Option<Element> {
        let raw = line.trim();
        let line = sanitize(raw);

        if is_table_row(&line) {
            let mut table = match std::mem::take(&mut self.state) {
                State::InTable(table) => table,
                State::Default => TableAccumulator::default(),
            };
            table.push_row(&line);

            if lookahead.is_some_and(is_table_row) {
                self.state = State::InTable(table);
                return None;
            }
            return table.finish().map(Element::Block);
        }

        // A run is always flushed by the lookahead on its last row.
        self.state = State::Default;
        classify_line(raw, &line)
    }
}

/// Classify a line that is not part of a table. `line` is the sanitized form
/// of the trimmed `raw` line; image paths are taken from `raw` so they still
/// name the file on disk.
fn classify_line(raw: &str, line: &str) -> Option<Element> {
    if line.is_empty() {
        return Some(Element::Blank);
    }

    if matches!(line, "---" | "***" | "___") {
        return Some(Element::Block(Block::Separator));
    }

    if let Some(caps) = IMAGE_RE.captures(raw) {
        return Some(Element::Block(Block::Image {
            alt: sanitize(&caps[1]),
            path: caps[2].to_string(),
        }));
    }

    let block = if let Some(text) = line.strip_prefix("### ") {
        heading(3, text)
    } else if let Some(text) = line.strip_prefix("## ") {
        heading(2, text)
    } else if let Some(text) = line.strip_prefix("# ") {
        heading(1, text)
    } else if let Some(text) = line
        .strip_prefix("* ")
        .or_else(|| line.strip_prefix("- "))
    {
        Block::ListItem {
            text: text.to_string(),
        }
    } else {
        Block::Paragraph {
            text: line.to_string(),
        }
    };

    Some(Element::Block(block))
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.to_string(),
    }
}
