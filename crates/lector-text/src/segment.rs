//! Sentence segmentation boundary
//!
//! The NLP model that splits text into sentences is an external collaborator:
//! cleaned text in, ordered (start, end, text) spans out. [`RuleSegmenter`] is
//! the in-process implementation; a model-backed segmenter implements the same
//! trait.

/// One sentence span with character offsets into the segmented text.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Collaborator interface: text in, ordered sentence spans out.
///
/// Callers must not assume the spans cover the input contiguously.
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<SentenceSpan>;
}

/// Rule-based segmenter: splits after sentence-final punctuation (`.`, `!`,
/// `?`, optionally followed by a closing quote or bracket) when whitespace
/// and an uppercase letter or digit follow.
#[derive(Debug, Default, Clone)]
pub struct RuleSegmenter;

impl RuleSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<SentenceSpan> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut spans = Vec::new();
        let mut start = 0usize;

        let mut i = 0;
        while i < chars.len() {
            let (_, c) = chars[i];
            if matches!(c, '.' | '!' | '?') {
                // Absorb trailing closers so the span keeps them.
                let mut j = i + 1;
                while j < chars.len() && matches!(chars[j].1, '"' | '\'' | ')' | ']') {
                    j += 1;
                }
                let boundary = j >= chars.len()
                    || (chars[j].1.is_whitespace()
                        && chars
                            .get(j + 1)
                            .map(|&(_, n)| n.is_uppercase() || n.is_ascii_digit())
                            .unwrap_or(true));
                if boundary {
                    let end = chars.get(j).map(|&(o, _)| o).unwrap_or(text.len());
                    if end > start {
                        spans.push(SentenceSpan {
                            text: text[start..end].to_string(),
                            start,
                            end,
                        });
                    }
                    // Next sentence starts after the whitespace.
                    start = chars.get(j + 1).map(|&(o, _)| o).unwrap_or(text.len());
                    i = j + 1;
                    continue;
                }
            }
            i += 1;
        }

        // Trailing text without terminal punctuation is still a sentence.
        if start < text.len() && !text[start..].trim().is_empty() {
            spans.push(SentenceSpan {
                text: text[start..].to_string(),
                start,
                end: text.len(),
            });
        }
        spans
    }
}
