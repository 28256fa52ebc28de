//! Word report rendering via `docx-rs`.
//!
//! Same document skeleton as the PDF renderer (title, result, confidence,
//! body from the Markdown element list), but the word processor does its
//! own bidi, so Arabic only needs right-aligned paragraphs, no reshaping.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run};

use super::markdown::{self, DocElement, Inline};
use super::{ReportContext, ReportError};

/// Render the report into `.docx` bytes.
pub fn render_docx(report_text: &str, ctx: &ReportContext) -> Result<Vec<u8>, ReportError> {
    let body_align = if ctx.is_arabic() {
        AlignmentType::Right
    } else {
        AlignmentType::Left
    };

    let mut docx = Docx::new().add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text("Medical Analysis Report").bold().size(36))
            .align(AlignmentType::Center),
    );

    let result_line = format!("FINAL RESULT: {}", ctx.prediction.to_uppercase());
    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(result_line).bold().size(28))
            .align(body_align.clone()),
    );

    let confidence_line = format!("Confidence Score: {}%", ctx.confidence_percent());
    docx = docx.add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(confidence_line))
            .align(body_align.clone()),
    );

    let mut numbered = 0u32;
    for element in markdown::parse_elements(report_text) {
        if !matches!(element, DocElement::Numbered(_)) {
            numbered = 0;
        }
        let paragraph = match element {
            DocElement::Heading { level, text } => {
                let size = match level {
                    1 => 32,
                    2 => 28,
                    _ => 26,
                };
                Paragraph::new().add_run(Run::new().add_text(text).bold().size(size))
            }
            DocElement::Paragraph(runs) => {
                let mut paragraph = Paragraph::new();
                for run in runs {
                    paragraph = paragraph.add_run(styled_run(&run));
                }
                paragraph
            }
            DocElement::Bullet(text) => {
                Paragraph::new().add_run(Run::new().add_text(format!("• {text}")))
            }
            DocElement::Numbered(text) => {
                numbered += 1;
                Paragraph::new().add_run(Run::new().add_text(format!("{numbered}. {text}")))
            }
        };
        docx = docx.add_paragraph(paragraph.align(body_align.clone()));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ReportError::Render(format!("Word packaging error: {e}")))?;
    Ok(buf.into_inner())
}

fn styled_run(inline: &Inline) -> Run {
    match inline {
        Inline::Text(text) => Run::new().add_text(text.as_str()),
        Inline::Bold(text) => Run::new().add_text(text.as_str()).bold(),
        Inline::Italic(text) => Run::new().add_text(text.as_str()).italic(),
    }
}
