//! Right-to-left text preparation for the PDF writer.
//!
//! The PDF text operator places glyphs left-to-right in logical order, so
//! Arabic needs two fixes before it hits the page: reshape isolated letters
//! into their joined presentation forms, then reorder each line into visual
//! order with the Unicode bidi algorithm. Word output needs neither, since
//! the word processor runs bidi itself.

use ar_reshaper::ArabicReshaper;
use unicode_bidi::BidiInfo;

/// Reshape Arabic letters and reorder text for RTL display.
///
/// Non-Arabic text passes through unchanged: the reshaper only touches
/// Arabic codepoints and the bidi reorder of an LTR line is the identity.
pub fn fix_text(text: &str) -> String {
    let reshaper = ArabicReshaper::default();
    let reshaped = reshaper.reshape(text);

    reshaped
        .lines()
        .map(reorder_visual)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reorder one logical line into visual order.
fn reorder_visual(line: &str) -> String {
    let bidi = BidiInfo::new(line, None);
    match bidi.paragraphs.first() {
        Some(para) => bidi.reorder_line(para, para.range.clone()).into_owned(),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_text_is_unchanged() {
        assert_eq!(fix_text("Analysis Result: CANCEROUS"), "Analysis Result: CANCEROUS");
    }

    #[test]
    fn arabic_letters_are_reshaped_to_presentation_forms() {
        // "سلام" in isolated codepoints; shaping joins the letters, so the
        // output must use presentation-form codepoints (U+FB50–U+FEFF).
        let out = fix_text("سلام");
        assert!(
            out.chars().any(|c| ('\u{FB50}'..='\u{FEFF}').contains(&c)),
            "expected presentation forms in {out:?}"
        );
    }

    #[test]
    fn arabic_line_is_reordered_to_visual_order() {
        // A digit-suffixed Arabic line changes order when made visual.
        let logical = "نتيجة 42";
        let visual = fix_text(logical);
        assert_ne!(visual, logical);
    }

    #[test]
    fn line_structure_is_preserved() {
        let out = fix_text("سطر أول\nسطر ثان");
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(fix_text(""), "");
    }
}
