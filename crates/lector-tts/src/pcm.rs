//! PCM normalization
//!
//! Backends produce whatever their engine emits; these helpers bring buffers
//! to the canonical format (mono, 16-bit signed, [`SAMPLE_RATE`]) before they
//! reach the cache or the wire.

use lector_core::SAMPLE_RATE;

/// Interleaved multi-channel samples to mono by averaging.
pub fn mixdown(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resample to the canonical rate.
pub fn resample_to_canonical(input: &[f32], from_rate: u32) -> Vec<f32> {
    resample(input, from_rate, SAMPLE_RATE)
}

fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (input.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 / ratio;
        let idx_floor = src_idx.floor() as usize;
        let idx_ceil = (idx_floor + 1).min(input.len().saturating_sub(1));
        let frac = (src_idx - idx_floor as f64) as f32;
        let idx_floor = idx_floor.min(input.len() - 1);

        output.push(input[idx_floor] * (1.0 - frac) + input[idx_ceil] * frac);
    }
    output
}

/// Float samples in [-1, 1] to 16-bit signed, clamped.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}
