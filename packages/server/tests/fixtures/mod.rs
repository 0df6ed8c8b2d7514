//! Test fixtures: an in-process server on an ephemeral port.

#![allow(dead_code)]

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use chattrix_server::{
    infrastructure::{
        db,
        mailer::{SmtpMailer, SmtpSettings},
        storage::LocalImageStore,
    },
    ui::{router, state::AppState},
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const FRAME_TIMEOUT: Duration = Duration::from_secs(3);

/// Server backed by an in-memory database and a scratch upload directory
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    upload_dir: PathBuf,
    pub pool: SqlitePool,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    pub async fn start_with_email_verification() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(email_verification: bool) -> Self {
        chattrix_shared::logger::setup_logger("chattrix-server-tests", "debug");

        let pool = db::init("sqlite::memory:")
            .await
            .expect("Failed to open database");
        let upload_dir = std::env::temp_dir().join(format!("chattrix-{}", uuid::Uuid::new_v4()));
        let mailer = SmtpMailer::new(&SmtpSettings {
            from: "Chattrix <no-reply@chattrix.local>".to_string(),
            ..SmtpSettings::default()
        })
        .expect("Failed to build mailer");

        let state = Arc::new(AppState::new(
            pool.clone(),
            Arc::new(mailer),
            Arc::new(LocalImageStore::new(upload_dir.clone())),
            email_verification,
        ));
        let cors = router::cors_layer("*").expect("Invalid CORS origin");
        let app = router::build_router(state, &upload_dir, cors);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            addr,
            handle,
            upload_dir,
            pool,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Register `username` (password "secret1") and return the new user's id
pub async fn register(client: &reqwest::Client, server: &TestServer, username: &str) -> i64 {
    let response = client
        .post(format!("{}/api/auth/register", server.base_url()))
        .json(&json!({
            "username": username,
            "first_name": format!("{username}-first"),
            "last_name": "Tester",
            "email": format!("{username}@example.com"),
            "password": "secret1",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201, "registration of {username} failed");
    let body: Value = response.json().await.expect("Failed to parse JSON");
    body["user"]["id"].as_i64().expect("user id")
}

/// Create (or fetch) the chat between two users and return its id
pub async fn create_chat(client: &reqwest::Client, server: &TestServer, user: i64, other: i64) -> i64 {
    let response = client
        .post(format!("{}/api/chats", server.base_url()))
        .json(&json!({"userId": user, "otherUserId": other}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    body["chat"]["id"].as_i64().expect("chat id")
}

/// Post a text message and return the raw response
pub async fn post_text(
    client: &reqwest::Client,
    server: &TestServer,
    chat_id: i64,
    user: i64,
    text: &str,
) -> reqwest::Response {
    let form = reqwest::multipart::Form::new()
        .text("userId", user.to_string())
        .text("message_text", text.to_string());
    client
        .post(format!("{}/api/chats/{}/messages", server.base_url(), chat_id))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request")
}

/// Push-channel client
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    pub connection_id: String,
}

impl WsClient {
    /// Connect and consume the `connected` frame
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        let mut client = Self {
            stream,
            connection_id: String::new(),
        };
        let connected = client.next_event().await;
        assert_eq!(connected["event"], "connected");
        client.connection_id = connected["data"]["connectionId"]
            .as_str()
            .expect("connection id")
            .to_string();
        client
    }

    /// Connect, announce `user_id` and consume the resulting online-users frame
    pub async fn connect_as(server: &TestServer, user_id: i64) -> Self {
        let mut client = Self::connect(server).await;
        client.emit("user-online", json!(user_id)).await;
        client.next_named("online-users").await;
        client
    }

    pub async fn emit(&mut self, event: &str, data: Value) {
        let frame = json!({"event": event, "data": data}).to_string();
        self.send_raw(&frame).await;
    }

    pub async fn send_raw(&mut self, frame: &str) {
        self.stream
            .send(Message::text(frame.to_string()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn send_binary(&mut self, payload: &[u8]) {
        self.stream
            .send(Message::binary(payload.to_vec()))
            .await
            .expect("Failed to send frame");
    }

    /// Wait until every frame sent so far has been handled by the server.
    ///
    /// Re-announcing the bound user makes the server answer this connection
    /// alone, and frames from one connection are handled in order.
    pub async fn sync(&mut self, user_id: i64) {
        self.emit("user-online", json!(user_id)).await;
        self.next_named("online-users").await;
    }

    /// Next text frame as JSON
    pub async fn next_event(&mut self) -> Value {
        loop {
            let message = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for a frame")
                .expect("Connection closed")
                .expect("WebSocket error");
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
            }
        }
    }

    /// Next frame with the given event name; others are skipped
    pub async fn next_named(&mut self, event: &str) -> Value {
        loop {
            let frame = self.next_event().await;
            if frame["event"] == event {
                return frame;
            }
        }
    }

    /// Assert that no text frame arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => panic!("Unexpected frame: {}", text.as_str()),
                Ok(Some(Ok(_))) => continue,
                Ok(other) => panic!("Connection ended: {:?}", other.map(|r| r.is_ok())),
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
