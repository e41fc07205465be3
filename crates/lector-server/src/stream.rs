//! Stream orchestrator
//!
//! Turns a resolved document into a live WebSocket session: binary PCM16
//! frames interleaved with JSON marks. One task owns the send half and runs
//! the unit loop; a second task owns the receive half and forwards control
//! messages. Sessions never share mutable state, so concurrent streams over
//! the same document need no coordination beyond the `Arc<Document>`
//! snapshot each one resolves at handshake.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use lector_core::audio::{pcm_to_bytes, SAMPLES_PER_FRAME, SAMPLE_RATE};
use lector_core::{CoreError, SentenceCursor, SpeakableUnit};
use lector_tts::{SpeechCache, SynthError, SynthesisProvider};

use crate::state::AppState;

/// Playback outcome reported in a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkStatus {
    /// Full audio for the unit was delivered.
    Done,
    /// No audio could be produced; a single silent frame stood in.
    Empty,
    /// The synthesis backend is rate limited; a single silent frame stood in.
    RateLimited,
}

/// Server-to-client text messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once after `ready`: the sample rate of every binary frame.
    Hello { sample_rate: u32 },
    /// Handshake accepted for this document.
    Ready { doc_id: String },
    /// Boundary marker after the last frame of a unit.
    Mark {
        sentence_id: String,
        status: MarkStatus,
        seq: u64,
        sample_rate: u32,
        num_samples: usize,
    },
}

/// Client-to-server messages after the handshake.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Adjust the session rate mid-stream.
    Control { rate: f32 },
}

/// Initial session configuration, from query parameters or the first text
/// message.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub doc_id: String,
    /// Client-supplied override of the document's stored reading order.
    #[serde(default)]
    pub reading_order: Option<Vec<String>>,
    /// Offset into the reading order to resume from.
    #[serde(default)]
    pub start_index: usize,
    #[serde(default = "default_rate")]
    pub rate: f32,
}

fn default_rate() -> f32 {
    1.0
}

impl SessionConfig {
    /// Build from query parameters. `None` when `doc_id` is absent, which
    /// means the client intends to send a config message instead.
    pub fn from_query(params: &HashMap<String, String>) -> Option<Self> {
        let doc_id = params.get("doc_id")?.clone();
        let start_index = params
            .get("start_index")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let rate = params
            .get("rate")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_rate);
        Some(Self { doc_id, reading_order: None, start_index, rate })
    }
}

/// Where session output goes. The WebSocket send half in production; tests
/// substitute a collecting sink to assert on the frame/mark sequence.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_pcm(&mut self, frame: &[i16]) -> Result<(), CoreError>;
    async fn send_message(&mut self, message: &ServerMessage) -> Result<(), CoreError>;
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The unit sequence is exhausted.
    Drained,
    /// The peer went away mid-stream.
    Disconnected,
}

enum UnitAudio {
    Pcm(Vec<i16>),
    RateLimited,
    Failed(String),
}

/// One client's playback session over a resolved document.
pub struct StreamSession {
    cursor: SentenceCursor,
    voice: String,
    rate: f32,
    rate_bounds: (f32, f32),
    control: mpsc::UnboundedReceiver<f32>,
    closed: watch::Receiver<bool>,
    seq: u64,
}

impl StreamSession {
    pub fn new(
        cursor: SentenceCursor,
        voice: String,
        rate: f32,
        rate_bounds: (f32, f32),
        control: mpsc::UnboundedReceiver<f32>,
        closed: watch::Receiver<bool>,
    ) -> Self {
        let mut session = Self {
            cursor,
            voice,
            rate: 1.0,
            rate_bounds,
            control,
            closed,
            seq: 0,
        };
        session.apply_rate(rate);
        session
    }

    /// Session rate after clamping, tracked for the client's benefit;
    /// synthesis-rate application is a client-side concern in this version.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    fn apply_rate(&mut self, rate: f32) {
        let clamped = rate.clamp(self.rate_bounds.0, self.rate_bounds.1);
        if clamped != rate {
            tracing::debug!(requested = rate, clamped, "Clamped session rate");
        }
        self.rate = clamped;
    }

    /// Drive the unit loop to completion, disconnect, or failure.
    pub async fn run(
        &mut self,
        sink: &mut dyn FrameSink,
        cache: &SpeechCache,
        provider: &dyn SynthesisProvider,
    ) -> Result<SessionEnd, CoreError> {
        while let Some(unit) = self.cursor.next_unit() {
            if *self.closed.borrow() {
                return Ok(SessionEnd::Disconnected);
            }
            while let Ok(rate) = self.control.try_recv() {
                self.apply_rate(rate);
            }

            match self.synthesize(cache, provider, &unit.text).await {
                UnitAudio::Pcm(pcm) if pcm.is_empty() => {
                    self.degrade(sink, &unit, MarkStatus::Empty).await?;
                }
                UnitAudio::Pcm(pcm) => {
                    if self.deliver(sink, &unit, &pcm).await? {
                        return Ok(SessionEnd::Disconnected);
                    }
                }
                UnitAudio::RateLimited => {
                    tracing::warn!(unit = %unit.id, "Synthesis rate limited, degrading to silence");
                    self.degrade(sink, &unit, MarkStatus::RateLimited).await?;
                }
                UnitAudio::Failed(err) => {
                    tracing::warn!(unit = %unit.id, error = %err, "Synthesis failed, degrading to silence");
                    self.degrade(sink, &unit, MarkStatus::Empty).await?;
                }
            }
        }
        Ok(SessionEnd::Drained)
    }

    async fn synthesize(
        &self,
        cache: &SpeechCache,
        provider: &dyn SynthesisProvider,
        text: &str,
    ) -> UnitAudio {
        if let Some(pcm) = cache.get(text, &self.voice) {
            return UnitAudio::Pcm(pcm);
        }
        match provider.synth(text, &self.voice).await {
            Ok(pcm) => {
                cache.put(text, &pcm, &self.voice);
                UnitAudio::Pcm(pcm)
            }
            Err(SynthError::RateLimited) => UnitAudio::RateLimited,
            Err(SynthError::Failed(err)) => UnitAudio::Failed(err),
        }
    }

    /// Stream a unit's audio in 20 ms frames, then its `done` mark. Returns
    /// `true` when the peer disconnected mid-unit.
    async fn deliver(
        &mut self,
        sink: &mut dyn FrameSink,
        unit: &SpeakableUnit,
        pcm: &[i16],
    ) -> Result<bool, CoreError> {
        for frame in pcm.chunks(SAMPLES_PER_FRAME) {
            if *self.closed.borrow() {
                return Ok(true);
            }
            sink.send_pcm(frame).await?;
        }
        self.mark(sink, unit, MarkStatus::Done, pcm.len()).await?;
        Ok(false)
    }

    /// One silent frame keeps client timing smooth when a unit yields no
    /// usable audio; the mark tells the client why.
    async fn degrade(
        &mut self,
        sink: &mut dyn FrameSink,
        unit: &SpeakableUnit,
        status: MarkStatus,
    ) -> Result<(), CoreError> {
        let silent = [0i16; SAMPLES_PER_FRAME];
        sink.send_pcm(&silent).await?;
        self.mark(sink, unit, status, silent.len()).await
    }

    async fn mark(
        &mut self,
        sink: &mut dyn FrameSink,
        unit: &SpeakableUnit,
        status: MarkStatus,
        num_samples: usize,
    ) -> Result<(), CoreError> {
        sink.send_message(&ServerMessage::Mark {
            sentence_id: unit.id.clone(),
            status,
            seq: self.seq,
            sample_rate: SAMPLE_RATE,
            num_samples,
        })
        .await?;
        self.seq += 1;
        Ok(())
    }
}

/// `GET /api/stream` upgrade handler.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_pcm(&mut self, frame: &[i16]) -> Result<(), CoreError> {
        self.sender
            .send(Message::Binary(pcm_to_bytes(frame)))
            .await
            .map_err(|e| CoreError::Internal(format!("socket send: {e}")))
    }

    async fn send_message(&mut self, message: &ServerMessage) -> Result<(), CoreError> {
        let text = serde_json::to_string(message)
            .map_err(|e| CoreError::Internal(format!("serialize message: {e}")))?;
        self.sender
            .send(Message::Text(text))
            .await
            .map_err(|e| CoreError::Internal(format!("socket send: {e}")))
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    params: HashMap<String, String>,
) {
    let (sender, mut receiver) = socket.split();
    let mut sink = WsSink { sender };

    let Some(config) = negotiate_config(&params, &mut receiver).await else {
        close(&mut sink.sender, 1008, "Missing initial config (doc_id)").await;
        return;
    };

    let Some(document) = state.store.get(&config.doc_id) else {
        close(
            &mut sink.sender,
            1008,
            &format!("Unknown doc_id: {}", config.doc_id),
        )
        .await;
        return;
    };

    let doc_id = document.id.clone();
    let handshake = async {
        sink.send_message(&ServerMessage::Ready { doc_id: doc_id.clone() }).await?;
        sink.send_message(&ServerMessage::Hello { sample_rate: SAMPLE_RATE }).await
    };
    if handshake.await.is_err() {
        tracing::info!(doc_id = %doc_id, "Client disconnected during handshake");
        return;
    }

    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = watch::channel(false);
    let reader = tokio::spawn(read_client(receiver, control_tx, closed_tx));

    let cursor = SentenceCursor::new(
        document,
        config.reading_order.clone(),
        config.start_index,
    );
    let mut session = StreamSession::new(
        cursor,
        state.settings.tts.voice.clone(),
        config.rate,
        (state.settings.stream.min_rate, state.settings.stream.max_rate),
        control_rx,
        closed_rx,
    );

    match session.run(&mut sink, &state.cache, state.provider.as_ref()).await {
        Ok(SessionEnd::Drained) => {
            tracing::info!(doc_id = %doc_id, "Finished streaming");
            close(&mut sink.sender, 1000, "done").await;
        }
        Ok(SessionEnd::Disconnected) => {
            tracing::info!(doc_id = %doc_id, "Client disconnected");
        }
        Err(err) => {
            tracing::error!(doc_id = %doc_id, error = %err, "Stream session failed");
            close(&mut sink.sender, 1011, "internal error").await;
        }
    }
    reader.abort();
}

/// Resolve the session config: query parameters when `doc_id` is present,
/// otherwise the first text message.
async fn negotiate_config(
    params: &HashMap<String, String>,
    receiver: &mut SplitStream<WebSocket>,
) -> Option<SessionConfig> {
    if let Some(config) = SessionConfig::from_query(params) {
        return Some(config);
    }
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => return serde_json::from_str(&text).ok(),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

/// Receive-half task: forwards control rate changes, flags disconnect.
async fn read_client(
    mut receiver: SplitStream<WebSocket>,
    control: mpsc::UnboundedSender<f32>,
    closed: watch::Sender<bool>,
) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Control { rate }) => {
                    let _ = control.send(rate);
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Ignoring unrecognized client message");
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    let _ = closed.send(true);
}

async fn close(sender: &mut SplitSink<WebSocket, Message>, code: u16, reason: &str) {
    let frame = CloseFrame {
        code,
        reason: reason.to_string().into(),
    };
    if let Err(err) = sender.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %err, "Close frame not delivered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lector_core::{BBox, Block, Document, Policy, Role, Sentence};
    use lector_tts::StubSynthesizer;

    #[derive(Debug, PartialEq)]
    enum SinkEvent {
        Pcm(Vec<i16>),
        Message(ServerMessage),
    }

    #[derive(Default)]
    struct TestSink {
        events: Vec<SinkEvent>,
    }

    #[async_trait]
    impl FrameSink for TestSink {
        async fn send_pcm(&mut self, frame: &[i16]) -> Result<(), CoreError> {
            self.events.push(SinkEvent::Pcm(frame.to_vec()));
            Ok(())
        }

        async fn send_message(&mut self, message: &ServerMessage) -> Result<(), CoreError> {
            self.events.push(SinkEvent::Message(message.clone()));
            Ok(())
        }
    }

    impl TestSink {
        fn marks(&self) -> Vec<(String, MarkStatus, u64, usize)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    SinkEvent::Message(ServerMessage::Mark {
                        sentence_id,
                        status,
                        seq,
                        num_samples,
                        ..
                    }) => Some((sentence_id.clone(), *status, *seq, *num_samples)),
                    _ => None,
                })
                .collect()
        }
    }

    fn block(id: &str, policy: Policy, sentences: &[&str]) -> Block {
        Block {
            id: id.to_string(),
            page: 0,
            bbox: BBox::new(0.0, 0.0, 1.0, 1.0),
            column: 0,
            role: Role::Body,
            text: sentences.join(" "),
            sentences: sentences
                .iter()
                .map(|s| Sentence { text: s.to_string(), start: 0, end: s.len() })
                .collect(),
            policy,
            confidence: 1.0,
        }
    }

    fn document() -> Arc<Document> {
        Arc::new(Document {
            id: "d".to_string(),
            blocks: vec![
                block("B1", Policy::Read, &["One.", "Two."]),
                block("B2", Policy::Skip, &["Hidden."]),
                block("B3", Policy::Read, &["Three."]),
            ],
            reading_order: vec!["B1".to_string(), "B2".to_string(), "B3".to_string()],
        })
    }

    fn session(doc: Arc<Document>) -> (StreamSession, mpsc::UnboundedSender<f32>, watch::Sender<bool>) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let cursor = SentenceCursor::new(doc, None, 0);
        let session = StreamSession::new(
            cursor,
            "default".to_string(),
            1.0,
            (0.8, 2.0),
            control_rx,
            closed_rx,
        );
        (session, control_tx, closed_tx)
    }

    fn cache() -> (tempfile::TempDir, SpeechCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SpeechCache::open(dir.path().join("audio")).unwrap();
        (dir, cache)
    }

    /// Rate-limits one specific sentence, synthesizes the rest.
    struct LimitOn {
        needle: &'static str,
        inner: StubSynthesizer,
    }

    #[async_trait]
    impl SynthesisProvider for LimitOn {
        async fn synth(&self, text: &str, voice: &str) -> Result<Vec<i16>, SynthError> {
            if text == self.needle {
                Err(SynthError::RateLimited)
            } else {
                self.inner.synth(text, voice).await
            }
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl SynthesisProvider for AlwaysFails {
        async fn synth(&self, _text: &str, _voice: &str) -> Result<Vec<i16>, SynthError> {
            Err(SynthError::Failed("backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_units_stream_in_order_with_done_marks() {
        let (_dir, cache) = cache();
        let provider = StubSynthesizer { ms_per_char: 5 };
        let (mut session, _control, _closed) = session_fixture();
        let mut sink = TestSink::default();

        let end = session.run(&mut sink, &cache, &provider).await.unwrap();
        assert_eq!(end, SessionEnd::Drained);

        let marks = sink.marks();
        assert_eq!(marks.len(), 3);
        assert_eq!(marks[0].0, "B1_s0");
        assert_eq!(marks[1].0, "B1_s1");
        assert_eq!(marks[2].0, "B3_s0");
        assert!(marks.iter().all(|m| m.1 == MarkStatus::Done));
        // Strictly increasing per-session seq.
        assert_eq!(marks.iter().map(|m| m.2).collect::<Vec<_>>(), vec![0, 1, 2]);
        // "One." is 4 chars at 5 ms/char: exactly one 960-sample frame.
        assert_eq!(marks[0].3, 960);
        // "Three." is 6 chars: 1440 samples, one full frame plus a partial.
        assert_eq!(marks[2].3, 1440);

        let frames: Vec<usize> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Pcm(frame) => Some(frame.len()),
                _ => None,
            })
            .collect();
        assert!(frames.iter().all(|&n| n <= SAMPLES_PER_FRAME));
        assert_eq!(frames.iter().sum::<usize>(), 960 + 960 + 1440);
    }

    fn session_fixture() -> (StreamSession, mpsc::UnboundedSender<f32>, watch::Sender<bool>) {
        session(document())
    }

    #[tokio::test]
    async fn test_rate_limited_unit_degrades_and_continues() {
        let (_dir, cache) = cache();
        let provider = LimitOn { needle: "Two.", inner: StubSynthesizer { ms_per_char: 5 } };
        let (mut session, _control, _closed) = session_fixture();
        let mut sink = TestSink::default();

        let end = session.run(&mut sink, &cache, &provider).await.unwrap();
        assert_eq!(end, SessionEnd::Drained);

        let marks = sink.marks();
        let statuses: Vec<MarkStatus> = marks.iter().map(|m| m.1).collect();
        assert_eq!(
            statuses,
            vec![MarkStatus::Done, MarkStatus::RateLimited, MarkStatus::Done]
        );
        // The degraded unit got exactly one silent frame.
        assert_eq!(marks[1].3, SAMPLES_PER_FRAME);
        let silent = sink.events.iter().find_map(|e| match e {
            SinkEvent::Pcm(frame) if frame.iter().all(|&s| s == 0) => Some(frame.len()),
            _ => None,
        });
        assert_eq!(silent, Some(SAMPLES_PER_FRAME));
        // Seq still strictly increasing across the degradation.
        assert_eq!(marks.iter().map(|m| m.2).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_failed_unit_marks_empty_and_continues() {
        let (_dir, cache) = cache();
        let (mut session, _control, _closed) = session_fixture();
        let mut sink = TestSink::default();

        let end = session.run(&mut sink, &cache, &AlwaysFails).await.unwrap();
        assert_eq!(end, SessionEnd::Drained);

        let marks = sink.marks();
        assert_eq!(marks.len(), 3);
        assert!(marks.iter().all(|m| m.1 == MarkStatus::Empty));
        assert!(marks.iter().all(|m| m.3 == SAMPLES_PER_FRAME));
    }

    #[tokio::test]
    async fn test_second_session_hits_cache() {
        let (_dir, cache) = cache();
        let provider = StubSynthesizer { ms_per_char: 5 };

        let (mut first, _c1, _w1) = session_fixture();
        let mut sink = TestSink::default();
        first.run(&mut sink, &cache, &provider).await.unwrap();

        let (mut second, _c2, _w2) = session_fixture();
        let mut sink = TestSink::default();
        second.run(&mut sink, &cache, &provider).await.unwrap();

        use std::sync::atomic::Ordering;
        assert_eq!(cache.stats.hits.load(Ordering::Relaxed), 3);
        assert_eq!(sink.marks().len(), 3);
    }

    #[tokio::test]
    async fn test_control_rate_is_clamped() {
        let (_dir, cache) = cache();
        let provider = StubSynthesizer { ms_per_char: 5 };
        let (mut session, control, _closed) = session_fixture();
        control.send(5.0).unwrap();

        let mut sink = TestSink::default();
        session.run(&mut sink, &cache, &provider).await.unwrap();
        assert_eq!(session.rate(), 2.0);
    }

    #[tokio::test]
    async fn test_disconnect_stops_stream() {
        let (_dir, cache) = cache();
        let provider = StubSynthesizer { ms_per_char: 5 };
        let (mut session, _control, closed) = session_fixture();
        closed.send(true).unwrap();

        let mut sink = TestSink::default();
        let end = session.run(&mut sink, &cache, &provider).await.unwrap();
        assert_eq!(end, SessionEnd::Disconnected);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_session_config_from_query() {
        let mut params = HashMap::new();
        params.insert("doc_id".to_string(), "f1".to_string());
        params.insert("start_index".to_string(), "3".to_string());
        params.insert("rate".to_string(), "1.5".to_string());
        let config = SessionConfig::from_query(&params).unwrap();
        assert_eq!(config.doc_id, "f1");
        assert_eq!(config.start_index, 3);
        assert_eq!(config.rate, 1.5);

        assert!(SessionConfig::from_query(&HashMap::new()).is_none());
    }

    #[test]
    fn test_session_config_message_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"doc_id":"f1"}"#).unwrap();
        assert_eq!(config.start_index, 0);
        assert_eq!(config.rate, 1.0);
        assert!(config.reading_order.is_none());
    }

    #[test]
    fn test_mark_wire_shape() {
        let mark = ServerMessage::Mark {
            sentence_id: "p0_b1_s0".to_string(),
            status: MarkStatus::RateLimited,
            seq: 4,
            sample_rate: SAMPLE_RATE,
            num_samples: 960,
        };
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(json["type"], "mark");
        assert_eq!(json["status"], "rate_limited");
        assert_eq!(json["sample_rate"], 48_000);
        assert_eq!(json["num_samples"], 960);
    }
}
