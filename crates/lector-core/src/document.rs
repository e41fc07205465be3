//! Document model
//!
//! Blocks are built once from extracted page geometry and then annotated in
//! place by each pipeline stage (classify, normalize, policy). No stage may
//! reorder or delete blocks; exclusion from playback is always expressed as
//! `Policy::Skip` so downstream consumers see the full candidate set.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Horizontal center, the signal used for column clustering.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center, used to tie-break header vs footer candidates.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y0
    }

    pub fn left(&self) -> f32 {
        self.x0
    }
}

/// A raw text block as produced by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBlock {
    pub bbox: BBox,
    pub text: String,
}

/// One extracted page. Immutable once extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index.
    #[serde(rename = "page_num")]
    pub index: usize,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub rotation: i32,
    pub blocks: Vec<RawBlock>,
}

/// Coarse structural role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Title,
    Heading,
    Body,
    ListItem,
    Quote,
    Caption,
    Header,
    Footer,
    #[serde(rename = "pagenum")]
    PageNum,
    Unknown,
}

/// Read/skip decision controlling inclusion in playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Read,
    Skip,
}

/// One sentence within a block. Offsets index into the block's normalized
/// text. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    #[serde(rename = "start_char")]
    pub start: usize,
    #[serde(rename = "end_char")]
    pub end: usize,
}

/// A geometrically contiguous unit of text on a page, the unit of role and
/// policy assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique within a document, stable across pipeline stages.
    pub id: String,
    /// Owning page index.
    pub page: usize,
    pub bbox: BBox,
    /// Assigned column index on the owning page.
    pub column: usize,
    pub role: Role,
    /// Normalized text (raw reconstructed text until the normalize stage).
    pub text: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    pub policy: Policy,
    pub confidence: f32,
}

impl Block {
    /// Block id format shared with the extraction stage: `p{page}_b{index}`.
    pub fn make_id(page: usize, index: usize) -> String {
        format!("p{page}_b{index}")
    }

    /// Stable identifier of one speakable unit inside this block.
    pub fn sentence_id(&self, sentence_index: usize) -> String {
        format!("{}_s{}", self.id, sentence_index)
    }
}

/// A resolved document: the full block set plus the reading order.
///
/// This is both the parse response payload and the structure the stream
/// orchestrator iterates, so its serialized shape is a binding contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "doc_id")]
    pub id: String,
    pub blocks: Vec<Block>,
    /// Ordered block identifiers; skip-policy blocks are excluded.
    pub reading_order: Vec<String>,
}

impl Document {
    /// Look up a block by identifier.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
