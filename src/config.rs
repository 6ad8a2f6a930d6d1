//! Path configuration for the store and the bridge socket.
//!
//! Resolution order for each path:
//! 1. Explicit CLI flag
//! 2. Environment variable
//! 3. `~/.wolfies-whatsapp/<file>`
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial implementation

use std::path::PathBuf;

pub const DB_ENV: &str = "WOLFIES_WHATSAPP_DB";
pub const SOCKET_ENV: &str = "WOLFIES_WHATSAPP_SOCKET";

const APP_DIR: &str = ".wolfies-whatsapp";
const DB_FILE: &str = "store.db";
const SOCKET_FILE: &str = "bridge.sock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub socket_path: PathBuf,
}

impl Config {
    /// Resolve paths from optional CLI flags, falling back to env vars and defaults.
    pub fn resolve(db: Option<&str>, socket: Option<&str>) -> Self {
        Self {
            db_path: resolve_path(db, DB_ENV, DB_FILE),
            socket_path: resolve_path(socket, SOCKET_ENV, SOCKET_FILE),
        }
    }
}

fn resolve_path(flag: Option<&str>, env_var: &str, file: &str) -> PathBuf {
    if let Some(path) = flag {
        return expand(path);
    }
    if let Ok(path) = std::env::var(env_var) {
        if !path.is_empty() {
            return expand(&path);
        }
    }
    app_dir().join(file)
}

/// `~/.wolfies-whatsapp`, or the working directory when there is no home.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
