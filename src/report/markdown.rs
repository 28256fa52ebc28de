//! Markdown → document elements.
//!
//! The renderers consume a flat element list, one variant per construct the
//! report prompt asks the model to emit: `h1`-`h3` headings, paragraphs with
//! bold/italic runs, bullet and numbered list items. Anything else the
//! parser encounters degrades to plain text; a malformed report must never
//! fail rendering.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// A styled run inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(String),
    Italic(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Inline::Text(s) | Inline::Bold(s) | Inline::Italic(s) => s,
        }
    }
}

/// One block-level element of the report body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocElement {
    Heading { level: u8, text: String },
    Paragraph(Vec<Inline>),
    Bullet(String),
    Numbered(String),
}

/// Translate Markdown report text into the element list.
pub fn parse_elements(md: &str) -> Vec<DocElement> {
    let mut elements = Vec::new();

    let mut heading: Option<(u8, String)> = None;
    let mut paragraph: Option<Vec<Inline>> = None;
    let mut item_text: Option<String> = None;
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;

    for event in Parser::new(md) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((heading_level(level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    elements.push(DocElement::Heading {
                        level,
                        text: text.trim().to_string(),
                    });
                }
            }
            Event::Start(Tag::Paragraph) if list_stack.is_empty() => {
                paragraph = Some(Vec::new());
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(runs) = paragraph.take() {
                    if !runs.is_empty() {
                        elements.push(DocElement::Paragraph(runs));
                    }
                }
            }
            Event::Start(Tag::List(start)) => list_stack.push(start),
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
            }
            Event::Start(Tag::Item) => item_text = Some(String::new()),
            Event::End(TagEnd::Item) => {
                if let Some(text) = item_text.take() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        let ordered = list_stack.last().map(|s| s.is_some()).unwrap_or(false);
                        elements.push(if ordered {
                            DocElement::Numbered(text)
                        } else {
                            DocElement::Bullet(text)
                        });
                    }
                }
            }
            Event::Start(Tag::Strong) => bold_depth += 1,
            Event::End(TagEnd::Strong) => bold_depth = bold_depth.saturating_sub(1),
            Event::Start(Tag::Emphasis) => italic_depth += 1,
            Event::End(TagEnd::Emphasis) => italic_depth = italic_depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => {
                push_text(
                    &text,
                    &mut heading,
                    &mut item_text,
                    &mut paragraph,
                    bold_depth > 0,
                    italic_depth > 0,
                );
            }
            Event::SoftBreak | Event::HardBreak => {
                push_text(
                    " ",
                    &mut heading,
                    &mut item_text,
                    &mut paragraph,
                    bold_depth > 0,
                    italic_depth > 0,
                );
            }
            _ => {}
        }
    }

    elements
}

/// Route a text fragment to whichever block is currently open.
fn push_text(
    text: &str,
    heading: &mut Option<(u8, String)>,
    item_text: &mut Option<String>,
    paragraph: &mut Option<Vec<Inline>>,
    bold: bool,
    italic: bool,
) {
    if let Some((_, buf)) = heading {
        buf.push_str(text);
    } else if let Some(buf) = item_text {
        buf.push_str(text);
    } else if let Some(runs) = paragraph {
        push_inline(runs, text, bold, italic);
    }
}

/// Append a run, merging with the previous one when the style matches.
fn push_inline(runs: &mut Vec<Inline>, text: &str, bold: bool, italic: bool) {
    match runs.last_mut() {
        Some(Inline::Bold(s)) if bold => s.push_str(text),
        Some(Inline::Italic(s)) if italic && !bold => s.push_str(text),
        Some(Inline::Text(s)) if !bold && !italic => s.push_str(text),
        _ => runs.push(if bold {
            Inline::Bold(text.to_string())
        } else if italic {
            Inline::Italic(text.to_string())
        } else {
            Inline::Text(text.to_string())
        }),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        // The report outline only goes three levels deep.
        _ => 3,
    }
}

/// Arabic fallback: strip Markdown markers for plain-text rendering.
///
/// The Arabic PDF path writes connected plain text, so `**`/`##` would
/// show up literally. Simple string surgery is enough here.
pub fn strip_markdown(text: &str) -> String {
    text.replace("**", "").replace("##", "").replace("- ", "• ")
}
