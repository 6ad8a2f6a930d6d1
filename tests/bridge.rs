//! End-to-end tests against a fake bridge sidecar on a UNIX socket.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use wolfies_whatsapp::bootstrap::{SessionBootstrap, SessionState};
use wolfies_whatsapp::bridge::BridgeClient;
use wolfies_whatsapp::pipeline::{EventSink, MessageHandler, NormalizedEvent, Normalizer};
use wolfies_whatsapp::render::PairingCodeRenderer;
use wolfies_whatsapp::store::{DeviceSession, DeviceStore, SqliteStore};
use wolfies_whatsapp::transport::Transport;
use wolfies_whatsapp::Error;

type Script = Box<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// Accepts one connection, records each request, answers with the scripted frames.
fn spawn_fake_bridge(path: &Path, script: Script) -> Arc<Mutex<Vec<Value>>> {
    let listener = UnixListener::bind(path).unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            seen.lock().unwrap().push(request.clone());
            for frame in script(&request) {
                let mut out = serde_json::to_string(&frame).unwrap();
                out.push('\n');
                if write_half.write_all(out.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    });

    requests
}

fn ok(request: &Value) -> Value {
    json!({ "id": request["id"], "ok": true, "result": {} })
}

#[derive(Default)]
struct RecordingRenderer {
    codes: Mutex<Vec<String>>,
}

impl PairingCodeRenderer for RecordingRenderer {
    fn render(&self, code: &str) {
        self.codes.lock().unwrap().push(code.to_string());
    }
}

struct ChannelSink(mpsc::UnboundedSender<NormalizedEvent>);

impl EventSink for ChannelSink {
    fn emit(&self, event: &NormalizedEvent) {
        let _ = self.0.send(event.clone());
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    socket: PathBuf,
    store: Arc<SqliteStore>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("bridge.sock");
        let store = Arc::new(SqliteStore::open(&dir.path().join("store.db")).unwrap());
        Self {
            _dir: dir,
            socket,
            store,
        }
    }

    fn client(&self) -> Arc<BridgeClient> {
        Arc::new(
            BridgeClient::new(&self.socket, self.store.clone())
                .with_timeout(Duration::from_secs(5)),
        )
    }
}

#[tokio::test]
async fn test_first_run_pairs_and_normalizes_lid_sender() {
    let harness = Harness::new();
    let requests = spawn_fake_bridge(
        &harness.socket,
        Box::new(|request| match request["method"].as_str() {
            Some("connect") => vec![
                ok(request),
                json!({"event": "pair_code", "code": "2@first", "timeout": 60}),
                json!({"event": "pair_code", "code": "2@second", "timeout": 20}),
                json!({"event": "pair_success", "id": "15550001111:7@s.whatsapp.net",
                       "push_name": "Me", "platform": "android"}),
                json!({"event": "lid_mapping", "lid": "123456789@lid",
                       "pn": "15551230000@s.whatsapp.net"}),
                json!({"event": "contact", "jid": "15551230000@s.whatsapp.net",
                       "full_name": "Ada Lovelace"}),
                json!({"event": "message",
                       "info": {"id": "M1", "sender": "123456789@lid",
                                "chat": "123456789@lid", "timestamp": 1700000000},
                       "message": {"conversation": "hello"}}),
            ],
            _ => vec![ok(request)],
        }),
    );

    let bridge = harness.client();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handler = Arc::new(MessageHandler::new(
        Normalizer::new(harness.store.clone(), harness.store.clone()),
        Arc::new(ChannelSink(tx)),
    ));
    bridge.add_event_handler(handler.into_event_handler());

    let renderer = Arc::new(RecordingRenderer::default());
    let mut bootstrap =
        SessionBootstrap::new(harness.store.clone(), bridge.clone(), renderer.clone());
    let session = bootstrap.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(bootstrap.codes_shown(), 2);
    assert_eq!(*renderer.codes.lock().unwrap(), vec!["2@first", "2@second"]);

    let device = session.device().expect("paired device stored");
    assert_eq!(device.id.to_string(), "15550001111:7@s.whatsapp.net");
    assert_eq!(device.platform.as_deref(), Some("android"));

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.sender.to_string(), "15551230000@s.whatsapp.net");
    assert_eq!(event.sender_name, "Ada Lovelace");
    assert_eq!(event.text, "hello");
    assert!(!event.is_group);

    assert_eq!(session.disconnect().await, SessionState::Terminated);

    let requests = requests.lock().unwrap();
    let methods: Vec<&str> = requests.iter().filter_map(|r| r["method"].as_str()).collect();
    assert_eq!(methods, vec!["connect", "disconnect"]);
    assert_eq!(requests[0]["params"], json!({}));
    assert_eq!(requests[0]["v"], 1);
}

#[tokio::test]
async fn test_code_burst_before_connect_response_is_not_lost() {
    let harness = Harness::new();
    spawn_fake_bridge(
        &harness.socket,
        Box::new(|request| match request["method"].as_str() {
            Some("connect") => {
                let mut frames: Vec<Value> = (0..20)
                    .map(|i| json!({"event": "pair_code", "code": format!("2@code{}", i)}))
                    .collect();
                frames.push(ok(request));
                frames.push(json!({"event": "pair_timeout"}));
                frames
            }
            _ => vec![ok(request)],
        }),
    );

    let renderer = Arc::new(RecordingRenderer::default());
    let bridge = Arc::new(
        BridgeClient::new(&harness.socket, harness.store.clone())
            .with_timeout(Duration::from_secs(2)),
    );
    let mut bootstrap = SessionBootstrap::new(harness.store.clone(), bridge, renderer.clone());
    let session = tokio::time::timeout(
        Duration::from_secs(5),
        bootstrap.run(&CancellationToken::new()),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(bootstrap.codes_shown(), 20);
    assert_eq!(renderer.codes.lock().unwrap().last().unwrap(), "2@code19");
    assert!(session.device().is_none());
    session.disconnect().await;
}

#[tokio::test]
async fn test_stored_device_resumes_without_pairing() {
    let harness = Harness::new();
    harness
        .store
        .put_device(&DeviceSession {
            id: "15550001111:7@s.whatsapp.net".parse().unwrap(),
            push_name: None,
            platform: None,
            paired_at: chrono::Utc::now(),
        })
        .unwrap();
    let requests = spawn_fake_bridge(&harness.socket, Box::new(|request| vec![ok(request)]));

    let renderer = Arc::new(RecordingRenderer::default());
    let mut bootstrap = SessionBootstrap::new(harness.store.clone(), harness.client(), renderer.clone());
    let session = bootstrap.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(bootstrap.codes_shown(), 0);
    assert!(renderer.codes.lock().unwrap().is_empty());
    assert_eq!(session.state(), SessionState::Connected);
    session.disconnect().await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests[0]["method"], "connect");
    assert_eq!(requests[0]["params"]["device"], "15550001111:7@s.whatsapp.net");
}

#[tokio::test]
async fn test_connect_rejected_by_bridge_is_fatal() {
    let harness = Harness::new();
    spawn_fake_bridge(
        &harness.socket,
        Box::new(|request| {
            vec![json!({
                "id": request["id"],
                "ok": false,
                "error": {"code": "CONNECT_FAILED", "message": "websocket refused"}
            })]
        }),
    );

    let mut bootstrap = SessionBootstrap::new(
        harness.store.clone(),
        harness.client(),
        Arc::new(RecordingRenderer::default()),
    );
    let err = bootstrap.run(&CancellationToken::new()).await.err().unwrap();

    assert!(matches!(err, Error::Bridge { ref code, .. } if code == "CONNECT_FAILED"));
    assert_eq!(bootstrap.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_missing_socket_is_an_io_error() {
    let harness = Harness::new();
    let mut bootstrap = SessionBootstrap::new(
        harness.store.clone(),
        harness.client(),
        Arc::new(RecordingRenderer::default()),
    );

    let err = bootstrap.run(&CancellationToken::new()).await.err().unwrap();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(bootstrap.state(), SessionState::Terminated);
}
