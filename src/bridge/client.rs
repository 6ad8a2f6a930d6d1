//! UNIX socket client for the protocol bridge.
//!
//! The bridge sidecar owns the WhatsApp wire protocol. This client sends
//! requests, waits for matching responses, and routes pushed events: pairing
//! frames to the pairing stream, the rest to the handler registry. Store writes
//! that belong to the protocol side (new device, contact and LID sync) happen
//! here before the event is dispatched.
//!
//! CHANGELOG:
//! - 10/18/2026 - Unbounded pairing channel so the reader never waits on the pairing loop
//! - 10/18/2026 - Initial implementation (async, one reader task per connection)

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::protocol::{parse_frame, Frame, Request, Response, WireEvent};
use crate::error::{Error, Result};
use crate::events::{Event, EventBus, EventHandler, HandlerId};
use crate::store::{ContactUpdate, DeviceSession, Store};
use crate::transport::{PairingEvent, PairingStream, Transport};

/// How long to wait for a response before giving up.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bridge client. Cheap to share behind an `Arc`.
pub struct BridgeClient {
    socket_path: PathBuf,
    timeout: Duration,
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<Option<OwnedWriteHalf>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

/// State touched by both the caller and the reader task.
struct Shared {
    store: Arc<dyn Store>,
    bus: EventBus,
    pending: Mutex<HashMap<String, oneshot::Sender<Response>>>,
    pairing: Mutex<Option<mpsc::UnboundedSender<PairingEvent>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BridgeClient {
    pub fn new(socket_path: impl AsRef<Path>, store: Arc<dyn Store>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            shared: Arc::new(Shared {
                store,
                bus: EventBus::new(),
                pending: Mutex::new(HashMap::new()),
                pairing: Mutex::new(None),
            }),
            writer: tokio::sync::Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Open the socket and start the reader task, once.
    async fn ensure_open(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        if writer.is_some() {
            return Ok(());
        }

        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            warn!(socket = %self.socket_path.display(), error = %e, "bridge socket unavailable");
            Error::Io(e)
        })?;
        let (read_half, write_half) = stream.into_split();
        info!(socket = %self.socket_path.display(), "bridge socket open");

        let shared = Arc::clone(&self.shared);
        *lock(&self.reader) = Some(tokio::spawn(read_loop(read_half, shared)));
        *writer = Some(write_half);
        Ok(())
    }

    /// Send a request and wait for its response.
    async fn call(&self, request: Request) -> Result<serde_json::Value> {
        let (tx, rx) = oneshot::channel();
        lock(&self.shared.pending).insert(request.id.clone(), tx);

        if let Err(e) = self.write_line(&request).await {
            lock(&self.shared.pending).remove(&request.id);
            return Err(e);
        }
        debug!(id = %request.id, method = %request.method, "bridge request sent");

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response.into_result(),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                lock(&self.shared.pending).remove(&request.id);
                Err(Error::bridge(
                    "TIMEOUT",
                    format!("no response to {} after {:?}", request.method, self.timeout),
                ))
            }
        }
    }

    async fn write_line(&self, request: &Request) -> Result<()> {
        let line = request.to_ndjson_line()?;
        let mut writer = self.writer.lock().await;
        let stream = writer.as_mut().ok_or(Error::ConnectionClosed)?;
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Close the socket and stop the reader task.
    async fn close(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }
        if let Some(reader) = lock(&self.reader).take() {
            reader.abort();
        }
        self.shared.close_pending();
    }
}

#[async_trait]
impl Transport for BridgeClient {
    async fn pairing_stream(&self) -> Result<PairingStream> {
        self.ensure_open().await?;
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.shared.pairing) = Some(tx);
        Ok(rx)
    }

    async fn connect(&self, device: Option<&DeviceSession>) -> Result<()> {
        self.ensure_open().await?;
        let params = match device {
            Some(device) => json!({ "device": device.id }),
            None => json!({}),
        };
        self.call(Request::new("connect", params)).await?;
        info!(resumed = device.is_some(), "bridge connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let result = self.call(Request::no_params("disconnect")).await.map(|_| ());
        self.close().await;
        info!("bridge disconnected");
        result
    }

    fn add_event_handler(&self, handler: EventHandler) -> HandlerId {
        self.shared.bus.add_handler(handler)
    }

    fn remove_event_handler(&self, id: HandlerId) -> bool {
        self.shared.bus.remove_handler(id)
    }
}

async fn read_loop(read_half: OwnedReadHalf, shared: Arc<Shared>) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_frame(&line) {
                    Ok(frame) => shared.handle_frame(frame),
                    Err(e) => warn!(error = %e, "dropping unreadable bridge frame"),
                }
            }
            Ok(None) => {
                info!("bridge closed the connection");
                break;
            }
            Err(e) => {
                warn!(error = %e, "bridge read failed");
                break;
            }
        }
    }

    shared.close_pending();
    shared.bus.dispatch(&Event::Disconnected);
}

impl Shared {
    fn handle_frame(&self, frame: Frame) {
        match frame {
            Frame::Response(response) => {
                let waiter = lock(&self.pending).remove(&response.id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => debug!(id = %response.id, "response with no waiter"),
                }
            }
            Frame::Event(event) => self.handle_event(event),
            Frame::UnknownEvent { kind } => self.bus.dispatch(&Event::Unknown { kind }),
        }
    }

    fn handle_event(&self, event: WireEvent) {
        match event {
            WireEvent::PairCode { code, timeout } => {
                self.forward_pairing(PairingEvent::Code {
                    code,
                    timeout: Duration::from_secs(timeout),
                });
            }
            WireEvent::PairSuccess {
                id,
                push_name,
                platform,
            } => {
                let device = DeviceSession {
                    id: id.clone(),
                    push_name,
                    platform,
                    paired_at: Utc::now(),
                };
                if let Err(e) = self.store.put_device(&device) {
                    warn!(device = %id, error = %e, "failed to store paired device");
                }
                self.forward_pairing(PairingEvent::Success { id });
            }
            WireEvent::PairTimeout => self.forward_pairing(PairingEvent::Timeout),
            WireEvent::PairError { message } => {
                self.forward_pairing(PairingEvent::Error { message });
            }
            WireEvent::Message(message) => self.bus.dispatch(&Event::Message(Box::new(message))),
            WireEvent::Connected => self.bus.dispatch(&Event::Connected),
            WireEvent::Disconnected => self.bus.dispatch(&Event::Disconnected),
            WireEvent::LoggedOut { reason } => {
                warn!(reason = ?reason, "logged out by the network");
                self.bus.dispatch(&Event::LoggedOut { reason });
            }
            WireEvent::Contact {
                jid,
                full_name,
                first_name,
                push_name,
                business_name,
            } => {
                let update = ContactUpdate {
                    full_name,
                    first_name,
                    push_name,
                    business_name,
                };
                if let Err(e) = self.store.put_contact(&jid, &update) {
                    warn!(jid = %jid, error = %e, "failed to store contact");
                }
                self.bus.dispatch(&Event::Contact { jid, update });
            }
            WireEvent::LidMapping { lid, pn } => {
                if let Err(e) = self.store.put_lid_mapping(&lid, &pn) {
                    warn!(lid = %lid, error = %e, "failed to store LID mapping");
                }
                self.bus.dispatch(&Event::LidMapping { lid, pn });
            }
        }
    }

    /// Send on the pairing stream; a terminal event closes it.
    fn forward_pairing(&self, event: PairingEvent) {
        let sender = if event.is_terminal() {
            lock(&self.pairing).take()
        } else {
            lock(&self.pairing).clone()
        };

        let Some(sender) = sender else {
            debug!(event = event.kind(), "pairing event with no listener");
            return;
        };

        if sender.send(event).is_err() {
            // Receiver gone: stop sending to it.
            lock(&self.pairing).take();
        }
    }

    /// Fail every in-flight request and close the pairing stream.
    fn close_pending(&self) {
        lock(&self.pending).clear();
        lock(&self.pairing).take();
    }
}
