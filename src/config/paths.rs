//! Canonical local paths.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ```text
//! ~/.dunamis/
//! ├── config.yaml      # optional, see crate::config
//! └── session.json     # admin session, present only while logged in
//! ```

use std::path::PathBuf;

use anyhow::Result;

/// Get the dunamis home directory (~/.dunamis unless overridden)
pub fn dunamis_home() -> Result<PathBuf> {
    Ok(crate::config::config()?.home.clone())
}

/// Get the admin session file path
pub fn session_file() -> Result<PathBuf> {
    Ok(dunamis_home()?.join(SESSION_FILE_NAME))
}

/// File name of the persisted admin session
pub const SESSION_FILE_NAME: &str = "session.json";

