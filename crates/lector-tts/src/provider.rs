//! Synthesis provider abstraction
//!
//! A provider returns PCM16 mono at the canonical sample rate. Rate-limit
//! conditions surface as [`SynthError::RateLimited`], distinct from other
//! failures, so the orchestrator can pick a degradation path instead of
//! aborting the session.

use async_trait::async_trait;
use thiserror::Error;

use lector_core::SAMPLE_RATE;

/// Closed failure set for synthesis backends.
#[derive(Error, Debug)]
pub enum SynthError {
    /// Backend backpressure (429-like). Recoverable per unit.
    #[error("provider rate limited")]
    RateLimited,

    /// Any other synthesis failure. Degraded to silence per unit.
    #[error("synthesis failed: {0}")]
    Failed(String),
}

/// Capability interface over text-to-speech backends.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize `text` to PCM16 mono at [`SAMPLE_RATE`].
    async fn synth(&self, text: &str, voice: &str) -> Result<Vec<i16>, SynthError>;
}

/// Deterministic local backend for development and tests.
///
/// Emits a quiet tone with duration proportional to text length, already in
/// the canonical format, so the full streaming path can run without a real
/// synthesis backend.
#[derive(Debug, Clone)]
pub struct StubSynthesizer {
    /// Synthesized milliseconds per input character.
    pub ms_per_char: u32,
}

impl Default for StubSynthesizer {
    fn default() -> Self {
        Self { ms_per_char: 50 }
    }
}

#[async_trait]
impl SynthesisProvider for StubSynthesizer {
    async fn synth(&self, text: &str, _voice: &str) -> Result<Vec<i16>, SynthError> {
        let chars = text.chars().count();
        let samples =
            chars * (self.ms_per_char as usize) * (SAMPLE_RATE as usize) / 1000;
        // 220 Hz tone at low amplitude.
        let pcm = (0..samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                ((t * 220.0 * std::f32::consts::TAU).sin() * 3000.0) as i16
            })
            .collect();
        Ok(pcm)
    }
}
