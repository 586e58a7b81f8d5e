//! Live conversation WebSocket proxy
//!
//! Bridges a browser client to the live session: binary frames carry raw
//! 16 kHz PCM upstream; JSON control messages manage the session; bridge
//! events flow back down as JSON, with audio chunks carrying their
//! scheduled start offset on the playback clock.
//!
//! Each connection owns exactly one [`ConversationBridge`], the single
//! mutation point for session state, per the one-session-per-bridge rule.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use krishi_core::Language;
use krishi_live::{BridgeEvent, BridgeState, ConversationBridge};

use crate::state::AppState;

/// Client → server control messages (audio may also arrive as raw binary)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Open the live session in the given language
    Start {
        #[serde(default)]
        lang: Option<String>,
    },
    /// Base64 PCM chunk (alternative to binary frames)
    Audio { data: String },
    /// The browser denied microphone access
    MicDenied,
    /// Close the session but keep the socket
    Stop,
}

/// Server → client messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Status { state: &'static str },
    PartialInput { text: String },
    PartialOutput { text: String },
    Turn { user: String, model: String },
    Audio { data: String, start_at: f64 },
    Interrupted,
    Closed,
    Error { message: String, kind: &'static str },
}

/// GET /ws/live
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// One select step: either client traffic or a bridge event. Keeping the
/// bridge out of the select handlers sidesteps aliasing between the
/// event-wait future and the client-message mutations.
enum Step {
    Client(Option<Result<Message, axum::Error>>),
    Bridge(Option<BridgeEvent>),
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut source) = socket.split();
    let mut bridge = ConversationBridge::new();
    let clock = Instant::now();

    loop {
        let now = clock.elapsed().as_secs_f64();
        let active = bridge.state() == BridgeState::Active;
        let step = tokio::select! {
            incoming = source.next() => Step::Client(incoming),
            event = bridge.next_event(now), if active => Step::Bridge(event),
        };

        match step {
            Step::Client(Some(Ok(message))) => {
                if !handle_client_message(message, &state, &mut bridge, &mut sink).await {
                    break;
                }
            }
            Step::Client(_) => break,
            Step::Bridge(Some(event)) => {
                let outbound = bridge_event_to_message(event);
                if send(&mut sink, &outbound).await.is_err() {
                    break;
                }
            }
            Step::Bridge(None) => {}
        }
    }

    bridge.stop().await;
    tracing::debug!("Live socket closed");
}

/// Returns false when the socket should close.
async fn handle_client_message(
    message: Message,
    state: &AppState,
    bridge: &mut ConversationBridge,
    sink: &mut SplitSink<WebSocket, Message>,
) -> bool {
    match message {
        Message::Binary(pcm) => {
            if let Err(error) = bridge.send_audio(&pcm).await {
                tracing::debug!(%error, "Dropping audio frame");
            }
            true
        }
        Message::Text(text) => {
            let parsed: Result<ClientMessage, _> = serde_json::from_str(&text);
            match parsed {
                Ok(ClientMessage::Start { lang }) => {
                    let language = lang
                        .as_deref()
                        .and_then(Language::from_code)
                        .unwrap_or_default();
                    start_session(state, bridge, language, sink).await;
                    true
                }
                Ok(ClientMessage::Audio { data }) => {
                    if let Ok(pcm) = BASE64.decode(data) {
                        if let Err(error) = bridge.send_audio(&pcm).await {
                            tracing::debug!(%error, "Dropping audio frame");
                        }
                    }
                    true
                }
                Ok(ClientMessage::MicDenied) => {
                    bridge.microphone_denied();
                    let _ = send(
                        sink,
                        &ServerMessage::Error {
                            message: "Microphone permission denied".to_string(),
                            kind: "microphone_permission",
                        },
                    )
                    .await;
                    let _ = send(sink, &status(bridge)).await;
                    true
                }
                Ok(ClientMessage::Stop) => {
                    bridge.stop().await;
                    let _ = send(sink, &status(bridge)).await;
                    true
                }
                Err(error) => {
                    tracing::debug!(%error, "Unparseable client message");
                    true
                }
            }
        }
        Message::Close(_) => false,
        _ => true, // ping/pong handled by axum
    }
}

async fn start_session(
    state: &AppState,
    bridge: &mut ConversationBridge,
    language: Language,
    sink: &mut SplitSink<WebSocket, Message>,
) {
    let generators = match state.generators() {
        Ok(generators) => generators,
        Err(error) => {
            let _ = send(
                sink,
                &ServerMessage::Error { message: error.to_string(), kind: "credential_missing" },
            )
            .await;
            return;
        }
    };

    let _ = send(sink, &ServerMessage::Status { state: "connecting" }).await;
    let result = bridge
        .start(&generators.api_key, &state.settings.genai.live_model, language)
        .await;

    match result {
        Ok(()) => {
            let _ = send(sink, &status(bridge)).await;
        }
        Err(error) => {
            use krishi_live::BridgeError;
            let kind = match &error {
                BridgeError::CredentialMissing => "credential_missing",
                BridgeError::CredentialInvalid(_) => "credential_invalid",
                BridgeError::MicrophonePermissionDenied => "microphone_permission",
                BridgeError::AlreadyActive => "already_active",
                _ => "transport",
            };
            let _ = send(sink, &ServerMessage::Error { message: error.to_string(), kind }).await;
            let _ = send(sink, &status(bridge)).await;
        }
    }
}

fn bridge_event_to_message(event: BridgeEvent) -> ServerMessage {
    match event {
        BridgeEvent::PartialInput { text } => ServerMessage::PartialInput { text },
        BridgeEvent::PartialOutput { text } => ServerMessage::PartialOutput { text },
        BridgeEvent::TurnCommitted { user, model } => {
            ServerMessage::Turn { user: user.text, model: model.text }
        }
        BridgeEvent::Audio { data, start_at } => {
            ServerMessage::Audio { data: BASE64.encode(data), start_at }
        }
        BridgeEvent::Interrupted => ServerMessage::Interrupted,
        BridgeEvent::Closed => ServerMessage::Closed,
        BridgeEvent::Failed { message } => ServerMessage::Error { message, kind: "session" },
    }
}

fn status(bridge: &ConversationBridge) -> ServerMessage {
    ServerMessage::Status { state: bridge.state().as_str() }
}

async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).expect("server message serializes");
    sink.send(Message::Text(json)).await
}
