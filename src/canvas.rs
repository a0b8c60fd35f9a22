//! Display list the renderer draws into.
//!
//! Coordinates are millimetres from the top-left corner of the page. Nothing
//! here knows about the output format; `typst.rs` lowers a finished
//! [`Layout`] to markup.

use crate::image_resolver::ResolvedImage;
use crate::metrics::Run;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Point size.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn regular(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            color: Rgb::BLACK,
        }
    }

    pub const fn bold(size: f64, color: Rgb) -> Self {
        Self {
            size,
            bold: true,
            italic: false,
            color,
        }
    }

    pub const fn italic(size: f64, color: Rgb) -> Self {
        Self {
            size,
            bold: false,
            italic: true,
            color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Runs(Vec<Run>),
    /// "Page n/N"; the total is filled in by [`Canvas::finish`].
    PageFooter { page: usize },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Runs(vec![Run::plain(text)])
    }

    /// Plain concatenation of the runs; empty for an unresolved footer.
    pub fn plain_text(&self) -> String {
        match self {
            Content::Runs(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
            Content::PageFooter { .. } => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text laid out inside `frame`, vertically centred.
    Text {
        frame: Frame,
        align: Align,
        style: TextStyle,
        content: Content,
        /// Horizontal padding inside the frame.
        inset: f64,
        clip: bool,
    },
    Rule {
        x: f64,
        y: f64,
        length: f64,
        stroke: Stroke,
    },
    Rect {
        frame: Frame,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Image {
        frame: Frame,
        /// Index into [`Layout::figures`].
        figure: usize,
    },
}

/// Image bytes embedded in the document under a virtual file name.
#[derive(Debug, Clone)]
pub struct Figure {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on this page, one entry per text op.
    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.plain_text()),
                _ => None,
            })
            .collect()
    }
}

/// Pages under construction.
#[derive(Debug, Default)]
pub struct Canvas {
    pages: Vec<Page>,
    figures: Vec<Figure>,
}

impl Canvas {
    /// Start a new page and return its 1-based number.
    pub fn new_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append an operation to the current page.
    pub fn draw(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.new_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Register image bytes and return the figure index for [`DrawOp::Image`].
    pub fn add_figure(&mut self, image: &ResolvedImage) -> usize {
        let index = self.figures.len();
        self.figures.push(Figure {
            name: format!("figure-{}.{}", index, image.kind.extension()),
            bytes: image.bytes.clone(),
        });
        index
    }

    /// Close the document, replacing footer placeholders with the final page
    /// count.
    pub fn finish(self) -> Layout {
        let total = self.pages.len();
        let mut pages = self.pages;
        for page in &mut pages {
            for op in &mut page.ops {
                if let DrawOp::Text { content, .. } = op {
                    if let Content::PageFooter { page: number } = *content {
                        *content = Content::text(format!("Page {number}/{total}"));
                    }
                }
            }
        }
        Layout {
            pages,
            figures: self.figures,
        }
    }
}

/// A finished, fully paginated document.
#[derive(Debug, Clone)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub figures: Vec<Figure>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.pages.iter().flat_map(|p| p.ops.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer(page: usize) -> DrawOp {
        DrawOp::Text {
            frame: Frame {
                x: 10.0,
                y: 282.0,
                width: 190.0,
                height: 10.0,
            },
            align: Align::Center,
            style: TextStyle::italic(8.0, Rgb::gray(128)),
            content: Content::PageFooter { page },
            inset: 0.0,
            clip: false,
        }
    }

    #[test]
    fn footers_backfilled_with_total() {
        let mut canvas = Canvas::default();
        for _ in 0..3 {
            let page = canvas.new_page();
            canvas.draw(footer(page));
        }
        let layout = canvas.finish();
        assert_eq!(layout.page_count(), 3);
        let footers: Vec<String> = layout.pages.iter().flat_map(|p| p.texts()).collect();
        assert_eq!(footers, vec!["Page 1/3", "Page 2/3", "Page 3/3"]);
    }

    #[test]
    fn draw_without_page_opens_one() {
        let mut canvas = Canvas::default();
        canvas.draw(DrawOp::Rule {
            x: 10.0,
            y: 30.0,
            length: 190.0,
            stroke: Stroke {
                width: 0.5,
                color: Rgb::BLACK,
            },
        });
        assert_eq!(canvas.page_count(), 1);
    }
}
