//! Live WebSocket session
//!
//! Connection flow: open the socket, send the setup frame, wait for
//! `setupComplete`, then split into an outbound pump (audio out) and an
//! inbound pump (events in). The server sends every message as a Binary
//! frame, including JSON control messages, so inbound handling probes
//! Binary payloads for JSON before anything else.

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use krishi_core::Language;

use crate::events::{parse_server_message, LiveEvent};
use crate::protocol::{
    build_audio_message, build_audio_stream_end_message, build_setup_message, LIVE_WS_URL,
};
use crate::BridgeError;

const SETUP_TIMEOUT: Duration = Duration::from_secs(15);

type WsSink = futures::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsSource = futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Outbound traffic accepted by the session
#[derive(Debug)]
pub enum OutboundMessage {
    /// Raw 16 kHz PCM microphone bytes
    Audio(Vec<u8>),
    /// Microphone stopped; flush buffered input
    AudioStreamEnd,
    /// Close the socket gracefully
    Close,
}

/// A connected live session
///
/// Audio goes in through [`LiveSession::send_audio`]; events come out of
/// [`LiveSession::recv_event`]. Dropping the handle tears both pumps down.
pub struct LiveSession {
    outbound_tx: mpsc::Sender<OutboundMessage>,
    event_rx: mpsc::Receiver<LiveEvent>,
}

impl LiveSession {
    /// Connect and complete setup.
    ///
    /// The credential rides in the URL query; a provider rejection at the
    /// handshake surfaces as `CredentialInvalid`.
    pub async fn connect(
        api_key: &str,
        model: &str,
        language: Language,
    ) -> Result<Self, BridgeError> {
        if api_key.trim().is_empty() {
            return Err(BridgeError::CredentialMissing);
        }
        let url = format!("{LIVE_WS_URL}?key={api_key}");

        tracing::info!(model, language = language.code(), "Connecting live session");
        let (mut stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(map_connect_error)?;

        let setup = build_setup_message(model, language);
        let setup_json = serde_json::to_string(&setup)
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        stream
            .send(WsMessage::Text(setup_json))
            .await
            .map_err(|e| BridgeError::Transport(format!("setup send failed: {e}")))?;

        wait_for_setup_complete(&mut stream).await?;

        let (sink, source) = stream.split();
        let (outbound_tx, outbound_rx) = mpsc::channel::<OutboundMessage>(256);
        let (event_tx, event_rx) = mpsc::channel::<LiveEvent>(256);

        tokio::spawn(outbound_pump(outbound_rx, sink));
        tokio::spawn(inbound_pump(source, event_tx));

        Ok(Self { outbound_tx, event_rx })
    }

    /// Queue one microphone chunk. Empty chunks are dropped.
    pub async fn send_audio(&self, pcm: &[u8]) -> Result<(), BridgeError> {
        if pcm.is_empty() {
            return Ok(());
        }
        self.outbound_tx
            .send(OutboundMessage::Audio(pcm.to_vec()))
            .await
            .map_err(|_| BridgeError::NotActive)
    }

    /// Signal the end of the microphone stream
    pub async fn end_audio_stream(&self) -> Result<(), BridgeError> {
        self.outbound_tx
            .send(OutboundMessage::AudioStreamEnd)
            .await
            .map_err(|_| BridgeError::NotActive)
    }

    /// Next inbound event; `None` once the session is closed
    pub async fn recv_event(&mut self) -> Option<LiveEvent> {
        self.event_rx.recv().await
    }

    /// Request a graceful close. Safe to call when already closed.
    pub async fn close(&self) {
        let _ = self.outbound_tx.send(OutboundMessage::Close).await;
    }
}

fn map_connect_error(err: tokio_tungstenite::tungstenite::Error) -> BridgeError {
    use tokio_tungstenite::tungstenite::Error;
    match &err {
        Error::Http(response) if response.status().as_u16() == 401 || response.status().as_u16() == 403 => {
            BridgeError::CredentialInvalid(format!("HTTP {}", response.status()))
        }
        _ => BridgeError::Transport(format!("connect failed: {err}")),
    }
}

/// Consume frames until `setupComplete`, tolerating the JSON-in-Binary
/// framing.
async fn wait_for_setup_complete(
    stream: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
) -> Result<(), BridgeError> {
    let wait = async {
        while let Some(message) = stream.next().await {
            match message {
                Ok(WsMessage::Binary(data)) if data.first() == Some(&b'{') => {
                    if std::str::from_utf8(&data)
                        .map(|text| text.contains("setupComplete"))
                        .unwrap_or(false)
                    {
                        return Ok(());
                    }
                }
                Ok(WsMessage::Text(text)) if text.contains("setupComplete") => return Ok(()),
                Ok(WsMessage::Close(frame)) => {
                    return Err(BridgeError::Transport(format!(
                        "closed before setupComplete: {frame:?}"
                    )));
                }
                Err(e) => {
                    return Err(BridgeError::Transport(format!(
                        "error before setupComplete: {e}"
                    )));
                }
                _ => {}
            }
        }
        Err(BridgeError::Transport("stream ended before setupComplete".to_string()))
    };

    match tokio::time::timeout(SETUP_TIMEOUT, wait).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Transport("setupComplete timeout".to_string())),
    }
}

async fn outbound_pump(mut rx: mpsc::Receiver<OutboundMessage>, mut sink: WsSink) {
    while let Some(message) = rx.recv().await {
        let frame = match message {
            OutboundMessage::Audio(pcm) => {
                match serde_json::to_string(&build_audio_message(&pcm)) {
                    Ok(json) => WsMessage::Text(json),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize audio frame");
                        continue;
                    }
                }
            }
            OutboundMessage::AudioStreamEnd => match serde_json::to_string(
                &build_audio_stream_end_message(),
            ) {
                Ok(json) => WsMessage::Text(json),
                Err(_) => continue,
            },
            OutboundMessage::Close => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
        };
        if sink.send(frame).await.is_err() {
            tracing::warn!("Live socket send failed; stopping outbound pump");
            break;
        }
    }
    tracing::debug!("Outbound pump terminated");
}

async fn inbound_pump(mut source: WsSource, event_tx: mpsc::Sender<LiveEvent>) {
    while let Some(message) = source.next().await {
        let text = match message {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(data)) => {
                // JSON-in-Binary is the norm; anything else is unexpected.
                if data.first() == Some(&b'{') {
                    match String::from_utf8(data) {
                        Ok(text) => text,
                        Err(_) => continue,
                    }
                } else {
                    tracing::warn!(len = data.len(), "Unexpected non-JSON binary frame");
                    continue;
                }
            }
            Ok(WsMessage::Close(frame)) => {
                tracing::info!(?frame, "Live session closed by server");
                break;
            }
            Ok(_) => continue, // ping/pong handled by tungstenite
            Err(e) => {
                let _ = event_tx
                    .send(LiveEvent::Error { message: format!("WebSocket error: {e}") })
                    .await;
                break;
            }
        };

        for event in parse_server_message(&text) {
            if event_tx.send(event).await.is_err() {
                tracing::debug!("Event receiver dropped; stopping inbound pump");
                return;
            }
        }
    }
    tracing::debug!("Inbound pump terminated");
}
