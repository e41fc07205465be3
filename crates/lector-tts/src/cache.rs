//! Speech cache
//!
//! Content-addressed store mapping (normalized text, voice) to synthesized
//! PCM16 audio. The key is a SHA-256 over the trimmed UTF-8 text, a
//! separator, and the voice identifier. Writes go to a temporary file in the
//! cache directory and are moved into place with an atomic rename, so a
//! concurrent `get` never observes a partially written entry; the last
//! writer wins. Corrupt entries read back as misses, never as errors.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use lector_core::audio::{pcm_from_bytes, pcm_to_bytes};

/// Hit/miss counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Directory-backed PCM cache.
pub struct SpeechCache {
    dir: PathBuf,
    pub stats: CacheStats,
}

impl SpeechCache {
    /// Open (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, stats: CacheStats::default() })
    }

    /// `sha256(trim(text) | voice)`, hex-encoded.
    fn key(text: &str, voice: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.trim().as_bytes());
        hasher.update(b"|");
        hasher.update(voice.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn path(&self, text: &str, voice: &str) -> PathBuf {
        self.dir.join(format!("{}.pcm", Self::key(text, voice)))
    }

    /// Cached PCM for (text, voice), or `None` on miss or corruption.
    pub fn get(&self, text: &str, voice: &str) -> Option<Vec<i16>> {
        let path = self.path(text, voice);
        let pcm = std::fs::read(&path).ok().and_then(|bytes| {
            let pcm = pcm_from_bytes(&bytes);
            if pcm.is_none() {
                tracing::warn!(path = %path.display(), "Corrupt cache entry, treating as miss");
            }
            pcm
        });
        match &pcm {
            Some(_) => self.stats.hits.fetch_add(1, Ordering::Relaxed),
            None => self.stats.misses.fetch_add(1, Ordering::Relaxed),
        };
        pcm
    }

    /// Store PCM for (text, voice). Empty buffers are not cached.
    pub fn put(&self, text: &str, pcm: &[i16], voice: &str) {
        if pcm.is_empty() {
            return;
        }
        let path = self.path(text, voice);
        if let Err(err) = self.write_atomic(&path, &pcm_to_bytes(pcm)) {
            // Cache writes are best-effort; synthesis output is already in hand.
            tracing::warn!(path = %path.display(), error = %err, "Cache write failed");
        }
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        std::fs::write(tmp.path(), bytes)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
