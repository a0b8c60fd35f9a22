mod block;
mod canvas;
mod config;
mod error;
mod image_resolver;
mod inline;
mod metrics;
mod parser;
mod render;
mod sanitize;
mod table;
mod typst;

pub use block::{Block, Element, Span};
pub use canvas::{Align, Canvas, Content, DrawOp, Figure, Frame, Layout, Page, Rgb, Stroke, TextStyle};
pub use config::{Config, FontConfig, HeaderConfig, PageConfig};
pub use error::{Error, Result};
pub use image_resolver::{ImageError, ImageKind, ImageResolver, ResolvedImage};
pub use inline::{spans, strip_markers};
pub use metrics::{Run, text_width, wrap};
pub use parser::{Classifier, parse};
pub use render::{DocumentMeta, HeadingTier, Renderer, heading_tier, title_from_path};
pub use sanitize::sanitize;
pub use table::{RowKind, TableAccumulator, is_table_row, split_cells};
pub use typst::{compile_pdf, layout_to_typst};

use std::fs;
use std::path::Path;

use tracing::{debug, info};

/// Parse markdown and lay it out on pages. Images resolve against `base_dir`.
pub fn layout(markdown: &str, base_dir: &Path, meta: DocumentMeta, config: &Config) -> Layout {
    let elements = parse(markdown);
    debug!("Parsed {} elements", elements.len());

    let mut renderer = Renderer::new(config, meta, ImageResolver::new(base_dir));
    renderer.render(&elements);
    renderer.finish()
}

/// Convert markdown to the Typst markup used to produce the PDF.
pub fn markdown_to_typst(
    markdown: &str,
    base_dir: &Path,
    meta: DocumentMeta,
    config: &Config,
) -> String {
    let layout = layout(markdown, base_dir, meta, config);
    layout_to_typst(&layout, config)
}

/// Convert markdown to PDF bytes.
pub fn markdown_to_pdf(
    markdown: &str,
    base_dir: &Path,
    meta: DocumentMeta,
    config: &Config,
) -> Result<Vec<u8>> {
    let layout = layout(markdown, base_dir, meta, config);
    compile_pdf(layout_to_typst(&layout, config), &layout)
}

/// Convert the markdown file at `source` into a PDF at `output` using the
/// compiled-in defaults. Returns the number of pages written.
pub fn render_document(source: &Path, output: &Path) -> Result<usize> {
    render_document_with_config(source, output, &Config::compiled_default())
}

/// Convert the markdown file at `source` into a PDF at `output`.
/// Returns the number of pages written.
pub fn render_document_with_config(source: &Path, output: &Path, config: &Config) -> Result<usize> {
    let markdown = fs::read_to_string(source).map_err(|e| Error::ReadSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    let base_dir = source.parent().unwrap_or(Path::new(""));
    let meta = DocumentMeta::for_source(source, config);
    let layout = layout(&markdown, base_dir, meta, config);
    let pages = layout.page_count();
    let pdf = compile_pdf(layout_to_typst(&layout, config), &layout)?;

    fs::write(output, pdf).map_err(|e| Error::WriteOutput {
        path: output.to_path_buf(),
        source: e,
    })?;

    info!("Wrote {} ({} pages)", output.display(), pages);
    Ok(pages)
}
