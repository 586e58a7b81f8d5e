//! The conversation bridge state machine
//!
//! `Idle → Connecting → Active → {Idle, Error}`. One bridge owns at most
//! one session, one turn buffer, and one playback clock; inbound session
//! events flow through [`ConversationBridge::process`] so there is a single
//! mutation point and no re-entrancy between event handling and stop calls.
//! Teardown is idempotent: `stop` is safe at any state, repeatedly, or when
//! the session never fully started.

use krishi_core::Language;

use crate::events::LiveEvent;
use crate::playback::{pcm_duration_secs, PlaybackScheduler, OUTPUT_SAMPLE_RATE};
use crate::session::LiveSession;
use crate::turns::{TranscriptEntry, TurnBuffer};
use crate::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    #[default]
    Idle,
    Connecting,
    Active,
    Error,
}

impl BridgeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

/// What the presentation layer sees
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// Running partial transcript of the user's speech
    PartialInput { text: String },
    /// Running partial transcript of the model's speech
    PartialOutput { text: String },
    /// A completed exchange: one user entry, one model entry
    TurnCommitted { user: TranscriptEntry, model: TranscriptEntry },
    /// Audio chunk with its scheduled start on the playback clock
    Audio { data: Vec<u8>, start_at: f64 },
    /// User barge-in: all queued playback was cancelled
    Interrupted,
    /// Session ended normally
    Closed,
    /// Session failed; the bridge is in the error state
    Failed { message: String },
}

/// Owns one live session end to end
#[derive(Default)]
pub struct ConversationBridge {
    state: BridgeState,
    session: Option<LiveSession>,
    turns: TurnBuffer,
    playback: PlaybackScheduler,
}

impl ConversationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Committed conversation history (survives stop/start)
    pub fn history(&self) -> &[TranscriptEntry] {
        self.turns.history()
    }

    /// Open a session. Errors are categorized (credential missing/invalid,
    /// transport) and leave the bridge fully torn down in the error state.
    pub async fn start(
        &mut self,
        api_key: &str,
        model: &str,
        language: Language,
    ) -> Result<(), BridgeError> {
        if matches!(self.state(), BridgeState::Connecting | BridgeState::Active) {
            return Err(BridgeError::AlreadyActive);
        }
        self.state = BridgeState::Connecting;

        match LiveSession::connect(api_key, model, language).await {
            Ok(session) => {
                self.session = Some(session);
                self.playback.interrupt();
                self.turns.clear_partials();
                self.state = BridgeState::Active;
                Ok(())
            }
            Err(error) => {
                self.teardown();
                self.state = BridgeState::Error;
                Err(error)
            }
        }
    }

    /// Push one captured microphone chunk
    pub async fn send_audio(&self, pcm: &[u8]) -> Result<(), BridgeError> {
        match &self.session {
            Some(session) if self.state() == BridgeState::Active => session.send_audio(pcm).await,
            _ => Err(BridgeError::NotActive),
        }
    }

    /// The audio source reported a permission denial; abort to error.
    pub fn microphone_denied(&mut self) {
        tracing::warn!("Microphone permission denied; aborting live session");
        self.teardown();
        self.state = BridgeState::Error;
    }

    /// Await and process the next session event.
    ///
    /// `now` is the caller's playback clock in seconds. Returns `None` when
    /// no session is attached.
    pub async fn next_event(&mut self, now: f64) -> Option<BridgeEvent> {
        loop {
            let event = match self.session.as_mut()?.recv_event().await {
                Some(event) => event,
                None => {
                    // Server closed the socket: full teardown, settle idle.
                    self.teardown();
                    self.state = BridgeState::Idle;
                    return Some(BridgeEvent::Closed);
                }
            };
            if let Some(out) = self.process(event, now) {
                return Some(out);
            }
        }
    }

    /// Apply one inbound event to the bridge state.
    ///
    /// Separated from the socket so the buffering, scheduling, and failure
    /// transitions are exercisable without a connection.
    pub fn process(&mut self, event: LiveEvent, now: f64) -> Option<BridgeEvent> {
        match event {
            LiveEvent::SetupComplete => None,
            LiveEvent::InputTranscript { text } => {
                self.turns.push_input(&text);
                Some(BridgeEvent::PartialInput { text: self.turns.partial_input().to_string() })
            }
            LiveEvent::OutputTranscript { text } => {
                self.turns.push_output(&text);
                Some(BridgeEvent::PartialOutput { text: self.turns.partial_output().to_string() })
            }
            LiveEvent::Audio { data } => {
                self.playback.prune_finished(now);
                let duration = pcm_duration_secs(data.len(), OUTPUT_SAMPLE_RATE);
                let start_at = self.playback.schedule(duration, now);
                Some(BridgeEvent::Audio { data, start_at })
            }
            LiveEvent::TurnComplete => self
                .turns
                .commit()
                .map(|(user, model)| BridgeEvent::TurnCommitted { user, model }),
            LiveEvent::Interrupted => {
                self.playback.interrupt();
                Some(BridgeEvent::Interrupted)
            }
            LiveEvent::Error { message } => {
                tracing::error!(%message, "Live session error");
                self.teardown();
                self.state = BridgeState::Error;
                Some(BridgeEvent::Failed { message })
            }
        }
    }

    /// Stop the session and settle into `Idle`. Idempotent.
    pub async fn stop(&mut self) {
        if let Some(session) = &self.session {
            session.close().await;
        }
        self.teardown();
        self.state = BridgeState::Idle;
    }

    /// Playback backlog in seconds at `now`
    pub fn playback_backlog(&self, now: f64) -> f64 {
        self.playback.backlog_secs(now)
    }

    /// Release the session and reset per-session state. Committed history
    /// is kept; uncommitted partials are dropped.
    fn teardown(&mut self) {
        self.session = None;
        self.playback.interrupt();
        self.turns.clear_partials();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turns::Speaker;

    #[test]
    fn transcript_deltas_accumulate_and_commit_once() {
        let mut bridge = ConversationBridge::new();

        bridge.process(LiveEvent::InputTranscript { text: "kitna ".into() }, 0.0);
        let partial =
            bridge.process(LiveEvent::InputTranscript { text: "paani chahiye".into() }, 0.0);
        assert_eq!(
            partial,
            Some(BridgeEvent::PartialInput { text: "kitna paani chahiye".into() })
        );
        bridge.process(LiveEvent::OutputTranscript { text: "Har teen din".into() }, 0.0);

        let committed = bridge.process(LiveEvent::TurnComplete, 0.0).unwrap();
        match committed {
            BridgeEvent::TurnCommitted { user, model } => {
                assert_eq!(user.speaker, Speaker::User);
                assert_eq!(user.text, "kitna paani chahiye");
                assert_eq!(model.text, "Har teen din");
            }
            other => panic!("expected TurnCommitted, got {other:?}"),
        }
        assert_eq!(bridge.history().len(), 2);

        // A second turn-complete with empty buffers commits nothing.
        assert_eq!(bridge.process(LiveEvent::TurnComplete, 0.0), None);
        assert_eq!(bridge.history().len(), 2);
    }

    #[test]
    fn audio_chunks_schedule_gapless_in_order() {
        let mut bridge = ConversationBridge::new();
        // 0.25 s, 0.5 s, 0.125 s of 24 kHz 16-bit mono (exact binary fractions)
        let starts: Vec<f64> = [12_000usize, 24_000, 6_000]
            .iter()
            .map(|&bytes| {
                match bridge.process(LiveEvent::Audio { data: vec![0; bytes] }, 0.0) {
                    Some(BridgeEvent::Audio { start_at, .. }) => start_at,
                    other => panic!("expected Audio, got {other:?}"),
                }
            })
            .collect();
        assert_eq!(starts, vec![0.0, 0.25, 0.75]);
        assert_eq!(bridge.playback_backlog(0.0), 0.875);
    }

    #[test]
    fn interruption_resets_the_playback_clock() {
        let mut bridge = ConversationBridge::new();
        bridge.process(LiveEvent::Audio { data: vec![0; 48_000] }, 0.0);
        assert_eq!(bridge.process(LiveEvent::Interrupted, 0.0), Some(BridgeEvent::Interrupted));
        assert_eq!(bridge.playback_backlog(0.0), 0.0);

        // Next chunk schedules as if playback were starting fresh.
        match bridge.process(LiveEvent::Audio { data: vec![0; 4_800] }, 0.0) {
            Some(BridgeEvent::Audio { start_at, .. }) => assert_eq!(start_at, 0.0),
            other => panic!("expected Audio, got {other:?}"),
        }
    }

    #[test]
    fn session_error_transitions_to_error_state() {
        let mut bridge = ConversationBridge::new();
        let event = bridge.process(LiveEvent::Error { message: "quota".into() }, 0.0);
        assert_eq!(event, Some(BridgeEvent::Failed { message: "quota".into() }));
        assert_eq!(bridge.state(), BridgeState::Error);
    }

    #[tokio::test]
    async fn stop_is_idempotent_even_when_never_started() {
        let mut bridge = ConversationBridge::new();
        bridge.stop().await;
        bridge.stop().await;
        assert_eq!(bridge.state(), BridgeState::Idle);
    }

    #[tokio::test]
    async fn stop_after_error_settles_idle_and_keeps_history() {
        let mut bridge = ConversationBridge::new();
        bridge.process(LiveEvent::InputTranscript { text: "hello".into() }, 0.0);
        bridge.process(LiveEvent::TurnComplete, 0.0);
        bridge.process(LiveEvent::Error { message: "boom".into() }, 0.0);
        assert_eq!(bridge.state(), BridgeState::Error);

        bridge.stop().await;
        assert_eq!(bridge.state(), BridgeState::Idle);
        assert_eq!(bridge.history().len(), 2);
    }

    #[test]
    fn microphone_denial_aborts_to_error() {
        let mut bridge = ConversationBridge::new();
        bridge.microphone_denied();
        assert_eq!(bridge.state(), BridgeState::Error);
    }

    #[tokio::test]
    async fn send_audio_requires_an_active_session() {
        let bridge = ConversationBridge::new();
        let err = bridge.send_audio(&[0u8; 320]).await.unwrap_err();
        assert!(matches!(err, BridgeError::NotActive));
    }
}
