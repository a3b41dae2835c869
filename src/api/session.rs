use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::config_dir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub instance_url: String,
    pub access_token: String,
    pub account_id: String,
    pub username: String,
}

fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn save_session(session: &SessionData) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))?;
    }

    let json = serde_json::to_string_pretty(session)?;
    let path = session_path();
    std::fs::write(&path, &json)?;

    // The access token is a bearer credential
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub fn load_session() -> Result<Option<SessionData>> {
    let path = session_path();
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(&path)?;
    let session: SessionData = serde_json::from_str(&json)?;
    Ok(Some(session))
}

pub fn clear_session() -> Result<()> {
    let path = session_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

pub fn last_instance() -> Option<String> {
    load_session().ok()?.map(|s| s.instance_url)
}
