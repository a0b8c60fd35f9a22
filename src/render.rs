//! Block layout and pagination.
//!
//! A [`Renderer`] owns the layout cursor and the canvas for exactly one
//! document. Blocks are placed top to bottom; when a block would cross the
//! bottom limit the page is closed and the block starts on a fresh one.
//! Blocks are never split.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::block::{Block, Element};
use crate::canvas::{Align, Canvas, Content, DrawOp, Frame, Layout, Rgb, Stroke, TextStyle};
use crate::config::Config;
use crate::image_resolver::{ImageResolver, ResolvedImage};
use crate::inline::{spans, strip_markers};
use crate::metrics::{Run, wrap};
use crate::table::normalize_row;

const SLATE: Rgb = Rgb(44, 62, 80);
const BLUE: Rgb = Rgb(41, 128, 185);

// Running header band.
const TOP_MARGIN: f64 = 10.0;
const BAND_TITLE_HEIGHT: f64 = 10.0;
const BAND_META_HEIGHT: f64 = 5.0;
const BAND_RULE_Y: f64 = 30.0;
const CONTENT_TOP: f64 = 39.0;

const FOOTER_HEIGHT: f64 = 10.0;

const DOC_TITLE_HEIGHT: f64 = 15.0;
const DOC_TITLE_GAP: f64 = 10.0;

const HEADING_LINE: f64 = 10.0;

const BODY_SIZE: f64 = 11.0;
const LINE_HEIGHT: f64 = 5.0;
const PARAGRAPH_GAP: f64 = 1.0;
const BULLET: &str = "\u{2022}";
const BULLET_OFFSET: f64 = 3.0;
const LIST_INDENT: f64 = 8.0;

const BLANK_GAP: f64 = 3.0;

const RULE_BEFORE: f64 = 2.0;
const RULE_AFTER: f64 = 5.0;

const IMAGE_INDENT: f64 = 5.0;
const IMAGE_BEFORE: f64 = 5.0;
const IMAGE_CAPTION_GAP: f64 = 2.0;
const CAPTION_HEIGHT: f64 = 5.0;
const IMAGE_AFTER: f64 = 5.0;

const TABLE_GAP: f64 = 5.0;
const ROW_HEIGHT: f64 = 8.0;
const TABLE_TEXT_SIZE: f64 = 10.0;
const CELL_INSET: f64 = 1.0;
const HEADER_FILL: Rgb = Rgb::gray(240);

const THIN: Stroke = Stroke {
    width: 0.2,
    color: Rgb::BLACK,
};

/// Per-document values that are not configuration.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    /// Shown once, large, on the first page.
    pub title: String,
    /// Date string for the running header.
    pub generated_on: String,
}

impl DocumentMeta {
    pub fn for_source(source: &Path, config: &Config) -> Self {
        Self {
            title: title_from_path(source),
            generated_on: config.generated_on(),
        }
    }
}

/// File stem with underscores turned into spaces.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Spacing and style of one heading level.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingTier {
    pub before: f64,
    pub after: f64,
    pub style: TextStyle,
}

pub fn heading_tier(level: u8) -> HeadingTier {
    match level {
        1 => HeadingTier {
            before: 5.0,
            after: 2.0,
            style: TextStyle::bold(18.0, SLATE),
        },
        2 => HeadingTier {
            before: 3.0,
            after: 0.0,
            style: TextStyle::bold(14.0, BLUE),
        },
        _ => HeadingTier {
            before: 2.0,
            after: 0.0,
            style: TextStyle::bold(12.0, Rgb::gray(50)),
        },
    }
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    y: f64,
    page: usize,
}

pub struct Renderer<'a> {
    config: &'a Config,
    meta: DocumentMeta,
    images: ImageResolver,
    canvas: Canvas,
    cursor: Cursor,
}

impl<'a> Renderer<'a> {
    /// Open the first page and draw the document title on it.
    pub fn new(config: &'a Config, meta: DocumentMeta, images: ImageResolver) -> Self {
        let mut renderer = Self {
            config,
            meta,
            images,
            canvas: Canvas::default(),
            cursor: Cursor {
                y: CONTENT_TOP,
                page: 0,
            },
        };
        renderer.start_page();
        renderer.draw_document_title();
        renderer
    }

    /// Current vertical position on the page, in millimetres.
    pub fn cursor_y(&self) -> f64 {
        self.cursor.y
    }

    /// 1-based number of the page being drawn.
    pub fn page(&self) -> usize {
        self.cursor.page
    }

    pub fn render(&mut self, elements: &[Element]) {
        for element in elements {
            self.render_element(element);
        }
    }

    pub fn render_element(&mut self, element: &Element) {
        match element {
            Element::Blank => self.cursor.y += BLANK_GAP,
            Element::Block(block) => self.render_block(block),
        }
    }

    pub fn render_block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, text } => self.draw_heading(*level, text),
            Block::Paragraph { text } => self.draw_text_block(text, false),
            Block::ListItem { text } => self.draw_text_block(text, true),
            Block::Separator => self.draw_separator(),
            Block::Image { alt, path } => match self.images.resolve(path) {
                Ok(image) => self.draw_image(alt, &image),
                Err(e) => warn!("Omitting image: {}", e),
            },
            Block::Table { header, rows } => self.draw_table(header, rows),
        }
    }

    /// Close the document and backfill page totals.
    pub fn finish(self) -> Layout {
        let layout = self.canvas.finish();
        info!(
            "Laid out '{}' on {} page(s)",
            self.meta.title,
            layout.page_count()
        );
        layout
    }

    fn margin(&self) -> f64 {
        self.config.page.margin
    }

    fn usable_width(&self) -> f64 {
        self.config.page.usable_width()
    }

    /// Largest block extent that fits on an empty page.
    fn capacity(&self) -> f64 {
        self.config.page.break_at() - CONTENT_TOP
    }

    fn start_page(&mut self) {
        let page = self.canvas.new_page();
        self.cursor = Cursor {
            y: CONTENT_TOP,
            page,
        };
        self.draw_header_band();
        if self.config.page.numbers {
            self.draw_footer();
        }
    }

    /// Start a new page unless a block of `height` still fits on this one.
    fn ensure_room(&mut self, height: f64) {
        if self.cursor.y + height <= self.config.page.break_at() {
            return;
        }
        if self.cursor.y > CONTENT_TOP {
            debug!("Page {} full at y={:.1}mm", self.cursor.page, self.cursor.y);
            self.start_page();
        }
        if height > self.capacity() {
            warn!(
                "Block of {:.1}mm exceeds page capacity of {:.1}mm and will overflow page {}",
                height,
                self.capacity(),
                self.cursor.page
            );
        }
    }

    fn text(&mut self, frame: Frame, align: Align, style: TextStyle, content: Content) {
        self.canvas.draw(DrawOp::Text {
            frame,
            align,
            style,
            content,
            inset: 0.0,
            clip: false,
        });
    }

    fn full_width(&self, y: f64, height: f64) -> Frame {
        Frame {
            x: self.margin(),
            y,
            width: self.usable_width(),
            height,
        }
    }

    fn draw_header_band(&mut self) {
        let header = &self.config.header;
        let title = Content::text(&header.title);
        let meta = Content::text(format!(
            "Generated on: {} | Author: {}",
            self.meta.generated_on, header.author
        ));

        let title_frame = self.full_width(TOP_MARGIN, BAND_TITLE_HEIGHT);
        self.text(title_frame, Align::Center, TextStyle::bold(16.0, SLATE), title);

        let meta_frame = self.full_width(TOP_MARGIN + BAND_TITLE_HEIGHT, BAND_META_HEIGHT);
        let meta_style = TextStyle::italic(10.0, Rgb(127, 140, 141));
        self.text(meta_frame, Align::Center, meta_style, meta);

        self.canvas.draw(DrawOp::Rule {
            x: self.margin(),
            y: BAND_RULE_Y,
            length: self.usable_width(),
            stroke: Stroke {
                width: 0.5,
                color: SLATE,
            },
        });
    }

    fn draw_footer(&mut self) {
        let frame = self.full_width(self.config.page.break_at(), FOOTER_HEIGHT);
        let content = Content::PageFooter {
            page: self.cursor.page,
        };
        self.text(frame, Align::Center, TextStyle::italic(8.0, Rgb::gray(128)), content);
    }

    fn draw_document_title(&mut self) {
        let frame = self.full_width(self.cursor.y, DOC_TITLE_HEIGHT);
        let content = Content::text(self.meta.title.clone());
        self.text(frame, Align::Center, TextStyle::bold(24.0, BLUE), content);
        self.cursor.y += DOC_TITLE_HEIGHT + DOC_TITLE_GAP;
    }

    fn draw_heading(&mut self, level: u8, text: &str) {
        let tier = heading_tier(level);
        self.ensure_room(tier.before + HEADING_LINE + tier.after);

        self.cursor.y += tier.before;
        let frame = self.full_width(self.cursor.y, HEADING_LINE);
        self.text(frame, Align::Left, tier.style, Content::text(strip_markers(text)));
        self.cursor.y += HEADING_LINE + tier.after;
    }

    fn draw_text_block(&mut self, text: &str, bulleted: bool) {
        let x = if bulleted {
            self.margin() + LIST_INDENT
        } else {
            self.margin()
        };
        let width = self.margin() + self.usable_width() - x;
        let lines = wrap(&spans(text), width, BODY_SIZE);

        self.ensure_room(lines.len() as f64 * LINE_HEIGHT + PARAGRAPH_GAP);

        if bulleted {
            let frame = Frame {
                x: self.margin() + BULLET_OFFSET,
                y: self.cursor.y,
                width: LIST_INDENT - BULLET_OFFSET,
                height: LINE_HEIGHT,
            };
            self.text(frame, Align::Left, TextStyle::regular(BODY_SIZE), Content::text(BULLET));
        }

        for line in lines {
            if !line.iter().all(|run: &Run| run.text.is_empty()) {
                let frame = Frame {
                    x,
                    y: self.cursor.y,
                    width,
                    height: LINE_HEIGHT,
                };
                self.text(frame, Align::Left, TextStyle::regular(BODY_SIZE), Content::Runs(line));
            }
            self.cursor.y += LINE_HEIGHT;
        }
        self.cursor.y += PARAGRAPH_GAP;
    }

    fn draw_separator(&mut self) {
        self.ensure_room(RULE_BEFORE + RULE_AFTER);
        self.cursor.y += RULE_BEFORE;
        self.canvas.draw(DrawOp::Rule {
            x: self.margin(),
            y: self.cursor.y,
            length: self.usable_width(),
            stroke: Stroke {
                width: 0.2,
                color: Rgb::gray(150),
            },
        });
        self.cursor.y += RULE_AFTER;
    }

    fn draw_image(&mut self, alt: &str, image: &ResolvedImage) {
        let caption = if alt.is_empty() { 0.0 } else { CAPTION_HEIGHT };
        let chrome = IMAGE_BEFORE + IMAGE_CAPTION_GAP + caption + IMAGE_AFTER;

        let full_width = self.usable_width() - 2.0 * IMAGE_INDENT;
        let mut width = full_width;
        let mut height = image.height_for_width(width);
        let max_height = self.capacity() - chrome;
        if height > max_height {
            width *= max_height / height;
            height = max_height;
        }

        self.ensure_room(chrome + height);

        self.cursor.y += IMAGE_BEFORE;
        let figure = self.canvas.add_figure(image);
        self.canvas.draw(DrawOp::Image {
            frame: Frame {
                x: self.margin() + IMAGE_INDENT + (full_width - width) / 2.0,
                y: self.cursor.y,
                width,
                height,
            },
            figure,
        });
        self.cursor.y += height + IMAGE_CAPTION_GAP;

        if !alt.is_empty() {
            let frame = self.full_width(self.cursor.y, CAPTION_HEIGHT);
            let content = Content::text(format!("Figure: {}", strip_markers(alt)));
            self.text(frame, Align::Center, TextStyle::italic(9.0, Rgb::gray(100)), content);
            self.cursor.y += CAPTION_HEIGHT;
        }
        self.cursor.y += IMAGE_AFTER;
    }

    fn draw_table(&mut self, header: &[String], rows: &[Vec<String>]) {
        let columns = header.len();
        if columns == 0 {
            return;
        }
        let column_width = self.usable_width() / columns as f64;

        self.ensure_room(TABLE_GAP + ROW_HEIGHT * (rows.len() + 1) as f64 + TABLE_GAP);
        self.cursor.y += TABLE_GAP;

        let header_style = TextStyle::bold(TABLE_TEXT_SIZE, Rgb::BLACK);
        self.draw_row(header, column_width, Some(HEADER_FILL), Align::Center, &header_style);

        let body_style = TextStyle::regular(TABLE_TEXT_SIZE);
        for row in rows {
            let cells = normalize_row(row, columns);
            self.draw_row(&cells, column_width, None, Align::Left, &body_style);
        }

        self.cursor.y += TABLE_GAP;
    }

    fn draw_row(
        &mut self,
        cells: &[String],
        column_width: f64,
        fill: Option<Rgb>,
        align: Align,
        style: &TextStyle,
    ) {
        for (i, cell) in cells.iter().enumerate() {
            let frame = Frame {
                x: self.margin() + column_width * i as f64,
                y: self.cursor.y,
                width: column_width,
                height: ROW_HEIGHT,
            };
            self.canvas.draw(DrawOp::Rect {
                frame,
                fill,
                stroke: Some(THIN),
            });
            if !cell.is_empty() {
                self.canvas.draw(DrawOp::Text {
                    frame,
                    align,
                    style: style.clone(),
                    content: Content::text(cell.as_str()),
                    inset: CELL_INSET,
                    clip: true,
                });
            }
        }
        self.cursor.y += ROW_HEIGHT;
    }
}
