//! Sentence cursor
//!
//! Lazy per-session iteration over a document's ordered, policy-filtered
//! sentence sequence. Implemented as a resumable cursor (reading-order index
//! plus in-block sentence index) rather than a generator so a session's
//! position can be inspected and rebuilt on reconnect.

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::{Block, Document, Policy};

/// One sentence within one read-policy block: the atomic item synthesized
/// and streamed.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakableUnit {
    /// `{block_id}_s{sentence_index}`
    pub id: String,
    pub text: String,
}

/// Resumable cursor over speakable units.
pub struct SentenceCursor {
    document: Arc<Document>,
    /// Effective order; may be a client-supplied override of the document's
    /// stored reading order.
    order: Vec<String>,
    /// Index into `order` of the block currently being read.
    order_index: usize,
    /// Index of the next sentence within the current block.
    sentence_index: usize,
    blocks_by_id: HashMap<String, usize>,
}

impl SentenceCursor {
    /// Build a cursor starting at `start_index` into the reading order.
    ///
    /// `order_override`, when present, replaces the document's stored order;
    /// identifiers that do not resolve to a block are skipped during
    /// iteration.
    pub fn new(
        document: Arc<Document>,
        order_override: Option<Vec<String>>,
        start_index: usize,
    ) -> Self {
        let order = order_override.unwrap_or_else(|| document.reading_order.clone());
        let blocks_by_id = document
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        Self {
            document,
            order,
            order_index: start_index,
            sentence_index: 0,
            blocks_by_id,
        }
    }

    /// Current position as (reading-order index, in-block sentence index).
    pub fn position(&self) -> (usize, usize) {
        (self.order_index, self.sentence_index)
    }

    fn current_block(&self) -> Option<&Block> {
        let id = self.order.get(self.order_index)?;
        let idx = *self.blocks_by_id.get(id)?;
        Some(&self.document.blocks[idx])
    }

    /// Advance to the next speakable unit, or `None` when the sequence is
    /// exhausted.
    pub fn next_unit(&mut self) -> Option<SpeakableUnit> {
        while self.order_index < self.order.len() {
            match self.current_block() {
                Some(block) if block.policy == Policy::Read => {
                    if let Some(sentence) = block.sentences.get(self.sentence_index) {
                        let unit = SpeakableUnit {
                            id: block.sentence_id(self.sentence_index),
                            text: sentence.text.clone(),
                        };
                        self.sentence_index += 1;
                        return Some(unit);
                    }
                }
                // Skip-policy block or dangling order id: contributes nothing.
                _ => {}
            }
            self.order_index += 1;
            self.sentence_index = 0;
        }
        None
    }
}

impl Iterator for SentenceCursor {
    type Item = SpeakableUnit;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_unit()
    }
}
