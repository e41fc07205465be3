//! Text normalization
//!
//! Cleaning rules applied in a fixed order; whitespace collapse must run last
//! so earlier rules see the original line structure (de-hyphenation needs the
//! line breaks that collapse would destroy).

use lector_core::{Block, Sentence};

use crate::segment::SentenceSegmenter;

/// Clean raw reconstructed block text.
pub fn clean_text(text: &str) -> String {
    let text = expand_ligatures(text);
    let text = normalize_punctuation(&text);
    let text = dehyphenate(&text);
    collapse_whitespace(&text)
}

/// Single-glyph ligatures to their letter sequences.
fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ﬁ' => out.push_str("fi"),
            'ﬂ' => out.push_str("fl"),
            'ﬀ' => out.push_str("ff"),
            'ﬃ' => out.push_str("ffi"),
            'ﬄ' => out.push_str("ffl"),
            _ => out.push(c),
        }
    }
    out
}

/// Smart quotes and dashes to plain ASCII equivalents.
fn normalize_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{2014}' => out.push_str("--"),
            '\u{2013}' => out.push('-'),
            _ => out.push(c),
        }
    }
    out
}

/// Remove a hyphen immediately followed by a line break.
///
/// Naive line-wrap de-hyphenation with no dictionary lookup: a genuine
/// compound word split at a line end gets joined too. Known limitation.
fn dehyphenate(text: &str) -> String {
    text.replace("-\n", "")
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_space = true;
        } else {
            if in_space && !out.is_empty() {
                out.push(' ');
            }
            in_space = false;
            out.push(c);
        }
    }
    out
}

/// Normalize every block's text in place and segment it into sentences.
///
/// Sentence spans come back from the segmentation collaborator as offsets into
/// the cleaned text and are stored verbatim with trimmed text; contiguous
/// coverage of the input is not assumed.
pub fn normalize_blocks(blocks: &mut [Block], segmenter: &dyn SentenceSegmenter) {
    for block in blocks.iter_mut() {
        let cleaned = clean_text(&block.text);
        block.sentences = segmenter
            .segment(&cleaned)
            .into_iter()
            .map(|span| Sentence {
                text: span.text.trim().to_string(),
                start: span.start,
                end: span.end,
            })
            .collect();
        block.text = cleaned;
    }
    tracing::info!(count = blocks.len(), "Normalized and segmented blocks");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ligatures() {
        assert_eq!(clean_text("eﬃcient ﬁle ﬂow"), "efficient file flow");
    }

    #[test]
    fn test_smart_punctuation() {
        assert_eq!(
            clean_text("\u{201C}hello\u{201D} \u{2018}world\u{2019}"),
            "\"hello\" 'world'"
        );
        assert_eq!(clean_text("a\u{2014}b c\u{2013}d"), "a--b c-d");
    }

    #[test]
    fn test_dehyphenation() {
        assert_eq!(clean_text("infor-\nmation"), "information");
    }

    #[test]
    fn test_dehyphenation_joins_genuine_compounds() {
        // Documented limitation: no dictionary lookup.
        assert_eq!(clean_text("well-\nknown"), "wellknown");
    }

    #[test]
    fn test_whitespace_collapse_is_last() {
        // De-hyphenation only fires on a hyphen immediately before the line
        // break; collapse then runs last and trims the ends.
        assert_eq!(clean_text("  infor- \nmation \t has   spaces "), "infor- mation has spaces");
        assert_eq!(clean_text("infor-\nmation  here"), "information here");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(clean_text("Plain sentence."), "Plain sentence.");
    }
}
