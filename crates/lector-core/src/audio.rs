//! Canonical audio format
//!
//! One agreed sample format shared by the synthesis providers, the speech
//! cache, and the wire protocol: mono, 16-bit signed PCM, little-endian,
//! 48 kHz, framed in 20 ms chunks.

/// Canonical sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48_000;

/// Frame duration in milliseconds.
pub const FRAME_MS: u32 = 20;

/// Samples per 20 ms frame at the canonical rate.
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE as usize * FRAME_MS as usize) / 1000;

/// Serialize PCM16 samples to little-endian bytes for the wire and the cache.
pub fn pcm_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

/// Deserialize little-endian bytes back to PCM16 samples.
///
/// Returns `None` on odd-length input, which callers treat as corruption.
pub fn pcm_from_bytes(bytes: &[u8]) -> Option<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect(),
    )
}
