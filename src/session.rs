//! Admin session state.
//!
//! A session exists only between a successful login and an explicit
//! logout (or a refresh the backend rejects). It is persisted as JSON
//! under the dunamis home directory so consecutive CLI invocations share
//! it; nothing else in the crate holds tokens.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::paths::SESSION_FILE_NAME;

#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

/// Session persistence errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Token pair obtained at login
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token sent on authenticated requests
    pub token: String,

    /// Exchanged for a new token after a 401
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Login email, for display only
    pub email: String,

    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, refresh_token: Option<String>, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token,
            email: email.into(),
            created_at: Utc::now(),
        }
    }
}

// Tokens never reach logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// JSON file holding the current session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside a dunamis home directory
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session, `None` when logged out
    pub async fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Persist the session, replacing any previous one.
    ///
    /// On unix the file is readable by the owner only.
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let content = serde_json::to_string_pretty(session)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(SESSION_FILE_MODE);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        // mode() only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(SESSION_FILE_MODE))
                .await
                .map_err(|source| self.io_error(source))?;
        }

        file.write_all(content.as_bytes())
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))
    }

    /// Remove the session. Returns whether one existed.
    pub async fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
