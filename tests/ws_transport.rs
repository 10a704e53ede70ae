use std::time::Duration;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use chatline::domain::{Identity, User};
use chatline::session::Session;
use chatline::transport::{Frame, events, ws};
use serde_json::{Value, json};
use tokio::sync::mpsc;

async fn ws_handler(upgrade: WebSocketUpgrade) -> impl IntoResponse {
    upgrade.on_upgrade(fake_backend)
}

/// Acknowledges `setup` and answers `join chat` with one message in that chat.
async fn fake_backend(mut socket: WebSocket) {
    while let Some(Ok(msg)) = socket.recv().await {
        let WsMessage::Text(text) = msg else {
            continue;
        };
        let Ok(frame) = Frame::decode(text.as_str()) else {
            continue;
        };
        let reply = match frame.event.as_str() {
            events::SETUP => Frame::new(events::CONNECTED, Value::Null),
            events::JOIN_CHAT => Frame::new(
                events::MESSAGE_RECEIVED,
                json!({
                    "_id": "m1",
                    "chat": {"_id": frame.data, "users": []},
                    "sender": {"_id": "u2", "name": "Bo"},
                    "content": "welcome",
                    "createdAt": "2024-03-01T10:00:00Z"
                }),
            ),
            _ => continue,
        };
        let text = reply.encode().unwrap();
        if socket.send(WsMessage::Text(text.into())).await.is_err() {
            break;
        }
    }
}

async fn spawn_server() -> String {
    let app = Router::new().route("/ws", get(ws_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/ws")
}

fn identity() -> Identity {
    Identity::new(User::new("u1", "Ana"), "token-1")
}

#[tokio::test]
async fn test_setup_is_acknowledged_over_websocket() {
    let url = spawn_server().await;
    let link = ws::connect(&url).await.unwrap();
    let session = Session::open(link, identity());

    assert!(session.wait_connected(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_join_then_receive_over_websocket() {
    let url = spawn_server().await;
    let link = ws::connect(&url).await.unwrap();
    let session = Session::open(link, identity());
    assert!(session.wait_connected(Duration::from_secs(5)).await);

    let (tx, mut rx) = mpsc::unbounded_channel();
    session.on(events::MESSAGE_RECEIVED, move |data| {
        let _ = tx.send(data);
    });
    session.emit(events::JOIN_CHAT, "c1");

    let data = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(data["chat"]["_id"], "c1");
    assert_eq!(data["content"], "welcome");
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(ws::connect(&format!("ws://{addr}/ws")).await.is_err());
}
