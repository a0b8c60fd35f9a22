use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_library::layout::PagedDocument;
use typst_pdf::PdfOptions;

use crate::canvas::{Align, Content, DrawOp, Frame, Layout, Rgb, Stroke, TextStyle};
use crate::config::Config;
use crate::error::{Error, Result};

/// Convert a finished layout to Typst markup, one absolutely placed element
/// per draw operation.
pub fn layout_to_typst(layout: &Layout, config: &Config) -> String {
    let mut out = String::new();

    // Pages carry no margin of their own; every element is placed.
    out.push_str(&format!(
        "#set page(width: {}, height: {}, margin: 0mm)\n",
        mm(config.page.width),
        mm(config.page.height)
    ));
    out.push_str(&format!(
        "#set text(font: {}, size: 11pt)\n\n",
        string_literal(&config.font.family)
    ));

    for (i, page) in layout.pages.iter().enumerate() {
        if i > 0 {
            out.push_str("#pagebreak()\n");
        }
        for op in &page.ops {
            emit_op(op, layout, &mut out);
        }
    }

    out
}

/// Compile markup produced by [`layout_to_typst`] to PDF bytes.
pub fn compile_pdf(markup: String, layout: &Layout) -> Result<Vec<u8>> {
    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let figures: Vec<(&str, Vec<u8>)> = layout
        .figures
        .iter()
        .map(|figure| (figure.name.as_str(), figure.bytes.clone()))
        .collect();

    let engine = TypstEngine::builder()
        .main_file(markup)
        .search_fonts_with(font_options)
        .with_static_file_resolver(figures)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}

fn emit_op(op: &DrawOp, layout: &Layout, out: &mut String) {
    match op {
        DrawOp::Text {
            frame,
            align,
            style,
            content,
            inset,
            clip,
        } => {
            let align = match align {
                Align::Left => "horizon + left",
                Align::Center => "horizon + center",
            };
            place(frame.x, frame.y, out);
            out.push_str(&format!(
                "box(width: {}, height: {}, inset: (x: {}), clip: {}, align({}, [",
                mm(frame.width),
                mm(frame.height),
                mm(*inset),
                clip,
                align
            ));
            emit_content(content, style, out);
            out.push_str("])))\n");
        }
        DrawOp::Rule {
            x,
            y,
            length,
            stroke,
        } => {
            place(*x, *y, out);
            out.push_str(&format!(
                "line(length: {}, stroke: {}))\n",
                mm(*length),
                stroke_to_typst(stroke)
            ));
        }
        DrawOp::Rect {
            frame,
            fill,
            stroke,
        } => {
            let fill = fill.map_or_else(|| "none".to_string(), color);
            let stroke = stroke
                .as_ref()
                .map_or_else(|| "none".to_string(), stroke_to_typst);
            place(frame.x, frame.y, out);
            out.push_str(&format!(
                "rect(width: {}, height: {}, fill: {}, stroke: {}))\n",
                mm(frame.width),
                mm(frame.height),
                fill,
                stroke
            ));
        }
        DrawOp::Image { frame, figure } => {
            // The renderer only references figures it registered.
            let Some(figure) = layout.figures.get(*figure) else {
                return;
            };
            place(frame.x, frame.y, out);
            image_to_typst(&figure.name, frame, out);
        }
    }
}

fn place(x: f64, y: f64, out: &mut String) {
    out.push_str(&format!("#place(top + left, dx: {}, dy: {}, ", mm(x), mm(y)));
}

fn image_to_typst(name: &str, frame: &Frame, out: &mut String) {
    out.push_str(&format!(
        "image({}, width: {}, height: {}))\n",
        string_literal(name),
        mm(frame.width),
        mm(frame.height)
    ));
}

fn emit_content(content: &Content, style: &TextStyle, out: &mut String) {
    match content {
        Content::Runs(runs) => {
            for run in runs {
                text_to_typst(&run.text, style, run.emphasized, out);
            }
        }
        // Only reachable on a layout that skipped `Canvas::finish`.
        Content::PageFooter { .. } => {}
    }
}

fn text_to_typst(text: &str, style: &TextStyle, emphasized: bool, out: &mut String) {
    out.push_str(&format!("#text(size: {}pt", style.size));
    if style.bold || emphasized {
        out.push_str(", weight: \"bold\"");
    }
    if style.italic {
        out.push_str(", style: \"italic\"");
    }
    out.push_str(&format!(", fill: {}, {})", color(style.color), string_literal(text)));
}

fn stroke_to_typst(stroke: &Stroke) -> String {
    format!("{} + {}", mm(stroke.width), color(stroke.color))
}

fn color(rgb: Rgb) -> String {
    format!("rgb({}, {}, {})", rgb.0, rgb.1, rgb.2)
}

fn mm(value: f64) -> String {
    format!("{:.2}mm", value)
}

/// Quote `text` as a Typst string so no markup inside it is interpreted.
fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Figure};
    use crate::metrics::Run;

    const PREAMBLE: &str = "#set page(width: 210.00mm, height: 297.00mm, margin: 0mm)\n#set text(font: \"Libertinus Serif\", size: 11pt)\n\n";

    fn frame() -> Frame {
        Frame {
            x: 10.0,
            y: 39.0,
            width: 190.0,
            height: 5.0,
        }
    }

    fn single(op: DrawOp) -> Layout {
        let mut canvas = Canvas::default();
        canvas.draw(op);
        canvas.finish()
    }

    #[test]
    fn string_literals_escape_quotes_and_backslashes() {
        assert_eq!(string_literal("plain"), "\"plain\"");
        assert_eq!(string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(string_literal("a\\b"), "\"a\\\\b\"");
        assert_eq!(string_literal("tab\there"), "\"tab\\there\"");
    }

    #[test]
    fn markup_characters_stay_literal() {
        let layout = single(DrawOp::Text {
            frame: frame(),
            align: Align::Left,
            style: TextStyle::regular(11.0),
            content: Content::text("#heading *star* $math$ [x]"),
            inset: 0.0,
            clip: false,
        });
        let markup = layout_to_typst(&layout, &Config::default());
        assert!(markup.contains("\"#heading *star* $math$ [x]\""));
    }

    #[test]
    fn text_with_bold_run() {
        let layout = single(DrawOp::Text {
            frame: frame(),
            align: Align::Left,
            style: TextStyle::regular(11.0),
            content: Content::Runs(vec![
                Run {
                    text: "Bold".into(),
                    emphasized: true,
                },
                Run::plain(" and plain"),
            ]),
            inset: 0.0,
            clip: false,
        });
        assert_eq!(
            layout_to_typst(&layout, &Config::default()),
            format!(
                "{PREAMBLE}#place(top + left, dx: 10.00mm, dy: 39.00mm, box(width: 190.00mm, height: 5.00mm, inset: (x: 0.00mm), clip: false, align(horizon + left, [#text(size: 11pt, weight: \"bold\", fill: rgb(0, 0, 0), \"Bold\")#text(size: 11pt, fill: rgb(0, 0, 0), \" and plain\")])))\n"
            )
        );
    }

    #[test]
    fn rule_and_rect() {
        let mut canvas = Canvas::default();
        canvas.draw(DrawOp::Rule {
            x: 10.0,
            y: 30.0,
            length: 190.0,
            stroke: Stroke {
                width: 0.5,
                color: Rgb(44, 62, 80),
            },
        });
        canvas.draw(DrawOp::Rect {
            frame: frame(),
            fill: Some(Rgb::gray(240)),
            stroke: None,
        });
        let markup = layout_to_typst(&canvas.finish(), &Config::default());
        assert!(markup.contains(
            "#place(top + left, dx: 10.00mm, dy: 30.00mm, line(length: 190.00mm, stroke: 0.50mm + rgb(44, 62, 80)))\n"
        ));
        assert!(markup.contains(
            "rect(width: 190.00mm, height: 5.00mm, fill: rgb(240, 240, 240), stroke: none))\n"
        ));
    }

    #[test]
    fn pages_are_separated_by_breaks() {
        let mut canvas = Canvas::default();
        for _ in 0..3 {
            canvas.new_page();
        }
        let markup = layout_to_typst(&canvas.finish(), &Config::default());
        assert_eq!(markup.matches("#pagebreak()").count(), 2);
    }

    #[test]
    fn images_reference_their_figure_name() {
        let layout = Layout {
            pages: vec![crate::canvas::Page {
                ops: vec![DrawOp::Image {
                    frame: frame(),
                    figure: 0,
                }],
            }],
            figures: vec![Figure {
                name: "figure-0.png".into(),
                bytes: vec![],
            }],
        };
        let markup = layout_to_typst(&layout, &Config::default());
        assert!(markup.contains("image(\"figure-0.png\", width: 190.00mm, height: 5.00mm))"));
    }

    #[test]
    fn italic_style() {
        let layout = single(DrawOp::Text {
            frame: frame(),
            align: Align::Center,
            style: TextStyle::italic(8.0, Rgb::gray(128)),
            content: Content::text("Page 1/1"),
            inset: 0.0,
            clip: false,
        });
        let markup = layout_to_typst(&layout, &Config::default());
        assert!(markup.contains(
            "align(horizon + center, [#text(size: 8pt, style: \"italic\", fill: rgb(128, 128, 128), \"Page 1/1\")])"
        ));
    }
}
