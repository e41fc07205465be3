//! Text processing for the lector pipeline
//!
//! - Normalization of raw reconstructed block text
//! - Sentence segmentation behind the [`SentenceSegmenter`] collaborator trait
//! - Read/skip policy assignment via named reading profiles

pub mod normalize;
pub mod profiles;
pub mod segment;

pub use normalize::{clean_text, normalize_blocks};
pub use profiles::apply_profile;
pub use segment::{RuleSegmenter, SentenceSegmenter, SentenceSpan};
