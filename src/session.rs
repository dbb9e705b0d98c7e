use std::path::{Path, PathBuf};

use crate::error::{CreditoError, Result};
use crate::models::Session;
use crate::settings::session_path;

/// Persists the logged-in user between runs.
///
/// Created once at the composition root and handed to whatever needs the
/// session; nothing reads the file behind its back.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved session, if any. A corrupt file counts as logged out.
    pub fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) if session.user_id != 0 => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("discarding unreadable session file: {e}");
                None
            }
        }
    }

    pub fn require(&self) -> Result<Session> {
        self.load().ok_or(CreditoError::NoSession)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        tracing::info!("session saved for user {}", session.user_id);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
