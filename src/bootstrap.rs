//! Session bootstrap: resume a stored device or pair a new one, then connect.
//!
//! ```text
//! Start -> Resuming -> Connected -> Disconnecting -> Terminated
//!       \-> Pairing --/
//! ```
//!
//! Any failure before `Connected` goes straight to `Terminated`. Disconnect is only
//! reachable through [`ConnectedSession::disconnect`], which consumes the session.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::render::PairingCodeRenderer;
use crate::store::{DeviceSession, DeviceStore};
use crate::transport::{PairingEvent, PairingStream, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Resuming,
    Pairing,
    Connected,
    Disconnecting,
    Terminated,
}

pub struct SessionBootstrap {
    devices: Arc<dyn DeviceStore>,
    transport: Arc<dyn Transport>,
    renderer: Arc<dyn PairingCodeRenderer>,
    state: SessionState,
    codes_shown: usize,
}

impl SessionBootstrap {
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn PairingCodeRenderer>,
    ) -> Self {
        Self {
            devices,
            transport,
            renderer,
            state: SessionState::Start,
            codes_shown: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Linking codes forwarded to the renderer so far.
    pub fn codes_shown(&self) -> usize {
        self.codes_shown
    }

    fn advance(&mut self, to: SessionState) {
        info!(from = ?self.state, to = ?to, "session state");
        self.state = to;
    }

    /// Run the bootstrap once. Errors are fatal: no retry happens here.
    ///
    /// `cancel` only cuts the pairing wait short; a stop request never skips
    /// the connect step that is already in flight.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<ConnectedSession> {
        match self.start(cancel).await {
            Ok(session) => Ok(session),
            Err(e) => {
                error!(state = ?self.state, error = %e, "session bootstrap failed");
                self.advance(SessionState::Terminated);
                Err(e)
            }
        }
    }

    async fn start(&mut self, cancel: &CancellationToken) -> Result<ConnectedSession> {
        match self.devices.first_device()? {
            Some(device) => {
                self.advance(SessionState::Resuming);
                info!(device = %device.id, "resuming stored session");
                self.transport.connect(Some(&device)).await?;
                self.advance(SessionState::Connected);
                Ok(ConnectedSession::new(Arc::clone(&self.transport), Some(device)))
            }
            None => {
                self.advance(SessionState::Pairing);
                let mut codes = self.transport.pairing_stream().await?;
                self.transport.connect(None).await?;
                self.pair(&mut codes, cancel).await;
                self.advance(SessionState::Connected);

                let device = self.devices.first_device().unwrap_or_else(|e| {
                    warn!(error = %e, "could not read device after pairing");
                    None
                });
                Ok(ConnectedSession::new(Arc::clone(&self.transport), device))
            }
        }
    }

    /// Forward linking codes until the stream closes or a stop is requested.
    async fn pair(&mut self, codes: &mut PairingStream, cancel: &CancellationToken) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("stop requested during pairing");
                    break;
                }
                event = codes.recv() => event,
            };

            let Some(event) = event else {
                info!(codes_shown = self.codes_shown, "pairing stream closed");
                break;
            };

            match event {
                PairingEvent::Code { code, timeout } => {
                    info!(timeout_secs = timeout.as_secs(), "new linking code");
                    self.codes_shown += 1;
                    self.renderer.render(&code);
                }
                PairingEvent::Success { id } => info!(device = %id, "login event: success"),
                other => info!(event = other.kind(), "login event"),
            }
        }
    }
}

/// A live connection. Dropping it does not disconnect; call [`Self::disconnect`].
pub struct ConnectedSession {
    transport: Arc<dyn Transport>,
    device: Option<DeviceSession>,
    state: SessionState,
}

impl ConnectedSession {
    fn new(transport: Arc<dyn Transport>, device: Option<DeviceSession>) -> Self {
        Self {
            transport,
            device,
            state: SessionState::Connected,
        }
    }

    pub fn device(&self) -> Option<&DeviceSession> {
        self.device.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Disconnect once and end the session. Returns the final state.
    pub async fn disconnect(mut self) -> SessionState {
        info!(from = ?self.state, to = ?SessionState::Disconnecting, "session state");
        self.state = SessionState::Disconnecting;

        if let Err(e) = self.transport.disconnect().await {
            warn!(error = %e, "disconnect failed");
        }

        info!(from = ?self.state, to = ?SessionState::Terminated, "session state");
        self.state = SessionState::Terminated;
        self.state
    }
}
