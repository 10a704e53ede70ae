//! WebSocket transport.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::{Frame, Link};
use crate::error::TransportError;

/// Connects to `url` (`ws://` or `wss://`) and spawns the reader and writer tasks.
///
/// The writer ends, sending a close frame, once the link's outbound sender is
/// dropped. The reader ends when the server closes or the inbound receiver is
/// dropped.
pub async fn connect(url: &str) -> Result<Link, TransportError> {
    let (stream, _response) = tokio_tungstenite::connect_async(url).await?;
    info!(name: "chat.transport.connected", url = %url, "WebSocket connected");

    let (mut sink, mut source) = stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Frame>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<Frame>();

    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let text = match frame.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!(name: "chat.transport.encode_failed", event = %frame.event, error = %e, "Dropping frame");
                    continue;
                }
            };
            if let Err(e) = sink.send(WsMessage::text(text)).await {
                warn!(name: "chat.transport.write_failed", error = %e, "WebSocket write failed");
                return;
            }
        }
        let _ = sink.close().await;
        debug!(name: "chat.transport.writer_closed", "WebSocket writer closed");
    });

    tokio::spawn(async move {
        while let Some(item) = source.next().await {
            match item {
                Ok(WsMessage::Text(text)) => match Frame::decode(text.as_str()) {
                    Ok(frame) => {
                        if in_tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(name: "chat.transport.malformed_frame", error = %e, "Ignoring malformed frame");
                    }
                },
                Ok(WsMessage::Close(_)) => break,
                // ping/pong are answered by tungstenite
                Ok(_) => {}
                Err(e) => {
                    warn!(name: "chat.transport.read_failed", error = %e, "WebSocket read failed");
                    break;
                }
            }
        }
        debug!(name: "chat.transport.reader_closed", "WebSocket reader closed");
    });

    Ok(Link::new(out_tx, in_rx))
}
