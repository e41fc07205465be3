//! Core types for the lector document reader
//!
//! This crate provides the foundational types shared by the parse pipeline
//! and the streaming engine:
//! - Document model (pages, blocks, sentences, reading order)
//! - Canonical audio format constants
//! - Error taxonomy
//! - Process-wide document store
//! - Resumable sentence cursor

pub mod audio;
pub mod cursor;
pub mod document;
pub mod error;
pub mod store;

pub use audio::{FRAME_MS, SAMPLES_PER_FRAME, SAMPLE_RATE};
pub use cursor::{SentenceCursor, SpeakableUnit};
pub use document::{BBox, Block, Document, Page, Policy, RawBlock, Role, Sentence};
pub use error::{CoreError, Result};
pub use store::DocumentStore;
