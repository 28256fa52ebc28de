//! PDF report rendering via `printpdf`.
//!
//! Layout: centered header, result line colored by classification,
//! confidence line, horizontal rule, then the report body. Non-Arabic
//! bodies are rendered from the Markdown element list with builtin
//! Helvetica fonts; Arabic bodies use a stripped plain-text fallback,
//! shaped and reordered, written right-aligned with an embedded TTF.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::*;

use super::markdown::{self, DocElement, Inline};
use super::{rtl, ReportContext, ReportError};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN_LEFT: f64 = 20.0;
const MARGIN_RIGHT: f64 = 190.0;
const TOP_Y: f64 = 280.0;
const BOTTOM_Y: f64 = 20.0;

const BODY_SIZE: f64 = 11.0;
const LINE_STEP: f64 = 5.5;

/// `Mm` from our f64 layout arithmetic.
fn mm(v: f64) -> Mm {
    Mm(v as _)
}

/// Regular/bold font pair. Arabic output embeds one external TTF for both.
struct FontPair {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Cursor state for one rendering pass: current layer plus vertical position.
struct PageCursor {
    layer: PdfLayerReference,
    y: f64,
}

impl PageCursor {
    /// Start a fresh page when the cursor would run below the bottom margin.
    fn ensure_space(&mut self, doc: &PdfDocumentReference, needed: f64) {
        if self.y - needed < BOTTOM_Y {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    /// Write one line at the left margin, or right-aligned for RTL output.
    fn place_line(&self, text: &str, size: f64, align_right: bool, font: &IndirectFontRef) {
        let x = if align_right {
            (MARGIN_RIGHT - approx_width_mm(text, size)).max(MARGIN_LEFT)
        } else {
            MARGIN_LEFT
        };
        self.layer.use_text(text, size as _, mm(x), mm(self.y), font);
    }

    /// Write word-wrapped text at the left margin, paginating as needed.
    fn write_wrapped(
        &mut self,
        doc: &PdfDocumentReference,
        text: &str,
        size: f64,
        font: &IndirectFontRef,
    ) {
        for chunk in wrap_text(text, max_chars(size)) {
            self.ensure_space(doc, LINE_STEP);
            self.layer.use_text(&chunk, size as _, mm(MARGIN_LEFT), mm(self.y), font);
            self.y -= LINE_STEP;
        }
    }
}

/// Render the report into PDF bytes.
pub fn render_pdf(
    report_text: &str,
    ctx: &ReportContext,
    font_path: &Path,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "AI Medical Analysis Report",
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "Layer 1",
    );

    let fonts = load_fonts(&doc, ctx, font_path)?;
    let mut cursor = PageCursor {
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP_Y,
    };

    // Header, centered.
    let header = "AI Medical Analysis Report";
    cursor.layer.use_text(
        header,
        12.0,
        mm((PAGE_WIDTH - approx_width_mm(header, 12.0)) / 2.0),
        mm(cursor.y),
        &fonts.bold,
    );
    cursor.y -= 12.0;

    // Result line, colored by classification.
    let label = ctx.prediction.to_uppercase();
    let display_label = if ctx.is_arabic() {
        rtl::fix_text(&label)
    } else {
        label
    };
    cursor.layer.set_fill_color(result_color(ctx));
    cursor.place_line(
        &format!("Analysis Result: {display_label}"),
        14.0,
        ctx.is_arabic(),
        &fonts.regular,
    );
    cursor
        .layer
        .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    cursor.y -= 8.0;

    // Confidence line.
    cursor.place_line(
        &format!("Confidence Score: {}%", ctx.confidence_percent()),
        BODY_SIZE,
        ctx.is_arabic(),
        &fonts.regular,
    );
    cursor.y -= 7.0;

    // Horizontal rule.
    cursor.layer.set_outline_thickness(0.5);
    cursor.layer.add_line(Line {
        points: vec![
            (Point::new(mm(MARGIN_LEFT - 10.0), mm(cursor.y)), false),
            (Point::new(mm(MARGIN_RIGHT + 10.0), mm(cursor.y)), false),
        ],
        is_closed: false,
    });
    cursor.y -= 8.0;

    // Body.
    if ctx.is_arabic() {
        render_arabic_body(&doc, &mut cursor, report_text, &fonts);
    } else {
        render_markdown_body(&doc, &mut cursor, report_text, &fonts);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Render(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Render(format!("PDF buffer error: {e}")))
}

fn load_fonts(
    doc: &PdfDocumentReference,
    ctx: &ReportContext,
    font_path: &Path,
) -> Result<FontPair, ReportError> {
    if ctx.is_arabic() {
        // Builtin fonts carry no Arabic glyphs; the TTF is mandatory here.
        let file = File::open(font_path)
            .map_err(|_| ReportError::FontMissing(font_path.to_path_buf()))?;
        let arabic = doc
            .add_external_font(file)
            .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?;
        Ok(FontPair {
            regular: arabic.clone(),
            bold: arabic,
        })
    } else {
        Ok(FontPair {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| ReportError::Render(format!("PDF font error: {e}")))?,
        })
    }
}

fn result_color(ctx: &ReportContext) -> Color {
    if ctx.is_cancerous() {
        Color::Rgb(Rgb::new(0.86, 0.15, 0.15, None))
    } else {
        Color::Rgb(Rgb::new(0.09, 0.64, 0.29, None))
    }
}

/// Markdown-element body for LTR languages.
fn render_markdown_body(
    doc: &PdfDocumentReference,
    cursor: &mut PageCursor,
    report_text: &str,
    fonts: &FontPair,
) {
    let mut numbered = 0u32;

    for element in markdown::parse_elements(report_text) {
        if !matches!(element, DocElement::Numbered(_)) {
            numbered = 0;
        }
        match element {
            DocElement::Heading { level, text } => {
                let size = match level {
                    1 => 14.0,
                    2 => 12.5,
                    _ => 11.5,
                };
                cursor.ensure_space(doc, 12.0);
                cursor.y -= 3.0;
                cursor.write_wrapped(doc, &text, size, &fonts.bold);
                cursor.y -= 2.0;
            }
            DocElement::Paragraph(runs) => {
                // No inline metrics without real font data, so a paragraph
                // keeps one style: bold when every run is bold.
                let all_bold = runs.iter().all(|r| matches!(r, Inline::Bold(_)));
                let text: String = runs.iter().map(Inline::text).collect();
                let font = if all_bold { &fonts.bold } else { &fonts.regular };
                cursor.write_wrapped(doc, &text, BODY_SIZE, font);
                cursor.y -= 2.5;
            }
            DocElement::Bullet(text) => {
                cursor.write_wrapped(doc, &format!("• {text}"), BODY_SIZE, &fonts.regular);
            }
            DocElement::Numbered(text) => {
                numbered += 1;
                cursor.write_wrapped(doc, &format!("{numbered}. {text}"), BODY_SIZE, &fonts.regular);
            }
        }
    }
}

/// Plain-text body for Arabic: strip markers, shape, reorder, right-align.
fn render_arabic_body(
    doc: &PdfDocumentReference,
    cursor: &mut PageCursor,
    report_text: &str,
    fonts: &FontPair,
) {
    let clean = markdown::strip_markdown(report_text);
    let fixed = rtl::fix_text(&clean);

    for line in fixed.lines() {
        if line.trim().is_empty() {
            cursor.y -= LINE_STEP / 2.0;
            continue;
        }
        for chunk in wrap_text(line, max_chars(BODY_SIZE)) {
            cursor.ensure_space(doc, LINE_STEP);
            cursor.place_line(&chunk, BODY_SIZE, true, &fonts.regular);
            cursor.y -= LINE_STEP;
        }
    }
}

/// Rough text width for centering/right-alignment without font metrics.
fn approx_width_mm(text: &str, size_pt: f64) -> f64 {
    // Average glyph advance ≈ half the point size; 1 pt = 0.352778 mm.
    text.chars().count() as f64 * size_pt * 0.5 * 0.352_778
}

/// Characters that fit between the margins at the given size.
fn max_chars(size_pt: f64) -> usize {
    (((MARGIN_RIGHT - MARGIN_LEFT) / (size_pt * 0.5 * 0.352_778)) as usize).max(16)
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx(prediction: &str, language: &str) -> ReportContext {
        ReportContext {
            prediction: prediction.to_string(),
            confidence: 0.91,
            language: language.to_string(),
        }
    }

    const SAMPLE_REPORT: &str = "## Patient Report Summary\n\n\
        The lesion was classified as **Cancerous**.\n\n\
        ## Recommendations & Next Steps\n\n\
        - Consult a specialist for a biopsy\n\
        - Monitor for changes using the ABCDE rule\n\n\
        ## Important Disclaimer\n\n\
        This is an AI-generated report for educational purposes.";

    #[test]
    fn english_report_renders_pdf_bytes() {
        let bytes = render_pdf(SAMPLE_REPORT, &ctx("Cancerous", "English"), Path::new("missing"))
            .unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn non_cancerous_report_renders() {
        let bytes = render_pdf(
            SAMPLE_REPORT,
            &ctx("Non-Cancerous", "French"),
            Path::new("missing"),
        )
        .unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn arabic_without_font_file_is_an_error() {
        let err = render_pdf(
            "تقرير",
            &ctx("Cancerous", "Arabic"),
            &PathBuf::from("/nonexistent/Amiri-Regular.ttf"),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::FontMissing(_)));
    }

    #[test]
    fn long_report_paginates_without_panicking() {
        let long = (0..300)
            .map(|i| format!("Paragraph {i} with enough words to need wrapping on the page."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let bytes = render_pdf(&long, &ctx("Non-Cancerous", "English"), Path::new("missing"))
            .unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn wrap_text_respects_limit() {
        let text = "This is a long sentence that should be wrapped at around forty characters or so.";
        let lines = wrap_text(text, 40);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 45); // Allow some slack for word boundaries
        }
    }

    #[test]
    fn wrap_text_short_and_empty() {
        assert_eq!(wrap_text("Short", 40), vec!["Short".to_string()]);
        assert_eq!(wrap_text("", 40).len(), 1);
    }

    #[test]
    fn max_chars_scales_down_with_size() {
        assert!(max_chars(14.0) < max_chars(9.0));
        assert!(max_chars(11.0) > 40);
    }
}
