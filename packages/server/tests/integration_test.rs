//! End-to-end tests: a real server on an ephemeral port, driven over
//! WebSocket and HTTP.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hookcast_server::{
    client::ConnectionSettings,
    domain::MessageHistory,
    hub::Hub,
    infrastructure::HtmxRosterFormatter,
    ui::Server,
    usecase::{AcceptConnectionUseCase, ListClientsUseCase, PublishWebhookUseCase},
};
use hookcast_shared::time::SystemClock;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// Helper struct to manage the server lifecycle
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let (hub, _hub_handle) = Hub::spawn(Arc::new(HtmxRosterFormatter));
        let server = Server::new(
            hub.clone(),
            Arc::new(AcceptConnectionUseCase::new(
                hub.clone(),
                ConnectionSettings::default(),
            )),
            Arc::new(PublishWebhookUseCase::new(
                Arc::new(hub.clone()),
                MessageHistory::new(10),
                Arc::new(SystemClock),
            )),
            Arc::new(ListClientsUseCase::new(hub)),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, signal) = oneshot::channel::<()>();
        let assets_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        let handle = tokio::spawn(server.serve(listener, assets_dir, async move {
            let _ = signal.await;
        }));

        TestServer {
            addr,
            shutdown: Some(shutdown),
            handle,
        }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self, name: &str) -> Socket {
        let url = format!("ws://{}/events?name={}", self.addr, name);
        let (socket, _response) = connect_async(url).await.expect("Failed to connect");
        socket
    }

    async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = tokio::time::timeout(WAIT, self.handle).await;
    }
}

/// Read text frames until a line (frames may hold several payloads joined by
/// newlines) satisfies `predicate`.
async fn wait_for_line(socket: &mut Socket, predicate: impl Fn(&str) -> bool) -> String {
    let read = async {
        while let Some(message) = socket.next().await {
            if let Message::Text(text) = message.expect("WebSocket error") {
                if let Some(line) = text.as_str().lines().find(|line| predicate(line)) {
                    return line.to_string();
                }
            }
        }
        panic!("connection closed before the expected line arrived");
    };
    tokio::time::timeout(WAIT, read)
        .await
        .expect("timed out waiting for line")
}

#[tokio::test]
async fn test_webhook_is_broadcast_to_all_clients() {
    // テスト項目: Webhook の本文が接続中の全クライアントに届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    wait_for_line(&mut alice, |line| line.contains("2 users connected")).await;
    wait_for_line(&mut bob, |line| line.contains("2 users connected")).await;

    // when (操作):
    let response = reqwest::Client::new()
        .post(server.http_url("/webhook"))
        .body("deploy finished")
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let expected = "<li class=\"message\">deploy finished</li>";
    wait_for_line(&mut alice, |line| line.contains(expected)).await;
    wait_for_line(&mut bob, |line| line.contains(expected)).await;

    let page = reqwest::get(server.http_url("/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("<li class=\"message\" title=\"Received "));
    assert!(page.contains("\">deploy finished</li>"));

    server.stop().await;
}

#[tokio::test]
async fn test_presence_follows_visibility_and_disconnects() {
    // テスト項目: hidden の送信と切断がロスターに反映される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;
    let mut bob = server.connect("bob").await;
    wait_for_line(&mut bob, |line| line.contains("2 users connected")).await;

    // when (操作): alice がタブを隠す
    alice.send(Message::Text("hidden".into())).await.unwrap();

    // then (期待する結果):
    let roster = wait_for_line(&mut bob, |line| line.contains("(away)")).await;
    assert!(roster.contains("<li class=\"self\">bob</li><li class=\"inactive\">alice (away)</li>"));

    // when (操作): alice が切断する
    alice.close(None).await.unwrap();

    // then (期待する結果):
    let roster = wait_for_line(&mut bob, |line| line.contains("1 user connected")).await;
    assert!(roster.contains("<li class=\"self\">bob</li></ul>"));

    let clients: serde_json::Value = reqwest::get(server.http_url("/api/clients"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = clients
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|client| client["name"].as_str())
        .collect();
    assert_eq!(names, vec!["bob"]);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_client_connections() {
    // テスト項目: サーバー停止時にクライアントへクローズフレームが送られる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("alice").await;
    wait_for_line(&mut alice, |line| line.contains("1 user connected")).await;

    // when (操作):
    server.stop().await;

    // then (期待する結果):
    let closed = tokio::time::timeout(WAIT, async {
        while let Some(message) = alice.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => return true,
                Ok(_) => continue,
            }
        }
        true
    })
    .await;
    assert_eq!(closed, Ok(true));
}

#[tokio::test]
async fn test_health_and_sprite_endpoints() {
    // テスト項目: ヘルスチェックと静的ファイルが提供される
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let health: serde_json::Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let sprite = reqwest::get(server.http_url("/sprite.png")).await.unwrap();

    // then (期待する結果):
    assert_eq!(health, serde_json::json!({"status": "ok"}));
    assert_eq!(sprite.status(), reqwest::StatusCode::OK);
    assert_eq!(
        sprite.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );

    server.stop().await;
}
