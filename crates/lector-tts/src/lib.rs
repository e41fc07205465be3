//! Text-to-speech adapters
//!
//! - [`SynthesisProvider`]: capability abstraction over synthesis backends.
//!   One required operation, a closed set of failure signals; new backends
//!   implement the trait without touching the stream orchestrator.
//! - [`Retrying`]: exponential backoff with jitter around any provider.
//! - [`SpeechCache`]: content-addressed PCM cache with atomic writes.
//! - [`pcm`]: normalization helpers to the canonical sample format.

pub mod cache;
pub mod pcm;
pub mod provider;
pub mod retry;

pub use cache::{CacheStats, SpeechCache};
pub use provider::{StubSynthesizer, SynthError, SynthesisProvider};
pub use retry::{Retrying, RetryPolicy};
