//! Pairing code presentation.
//!
//! CHANGELOG:
//! - 10/18/2026 - Draw the linking code as a terminal QR code
//! - 10/18/2026 - Initial implementation

use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};
use std::io::{self, Write};
use tracing::warn;

pub trait PairingCodeRenderer: Send + Sync {
    /// Show a linking code. Fire-and-forget.
    fn render(&self, code: &str);
}

/// Draws the code as a half-block QR code on stdout, followed by the raw code.
pub struct TerminalRenderer;

impl PairingCodeRenderer for TerminalRenderer {
    fn render(&self, code: &str) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = write_code(&mut out, code) {
            warn!(error = %e, "failed to print linking code");
        }
    }
}

/// Write the QR block (when the code encodes) and the `QR code:` line.
pub fn write_code<W: Write>(out: &mut W, code: &str) -> io::Result<()> {
    match QrCode::with_error_correction_level(code.as_bytes(), EcLevel::L) {
        Ok(qr) => {
            let block = qr.render::<Dense1x2>().quiet_zone(true).build();
            writeln!(out, "{}", block)?;
        }
        Err(e) => warn!(error = %e, "linking code does not fit a QR code"),
    }
    writeln!(out, "QR code: {}", code)?;
    out.flush()
}
