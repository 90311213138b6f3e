//! Persistent local profile for the support chat client.
//!
//! Holds the identifiers the synchronizer reads once at session start
//! (`userId`, `chatId`) in a JSON document under the platform config
//! directory. Lookup order: environment variable first, then the profile
//! document. The synchronizer itself only ever reads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Environment override for the local user id.
pub const USER_ID_ENV: &str = "SUPPORT_CHAT_USER_ID";
/// Environment override for the active chat id.
pub const CHAT_ID_ENV: &str = "SUPPORT_CHAT_CHAT_ID";

/// Result type for explicit-path profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Errors from explicit-path profile operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed profile document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Identifiers persisted between runs of the client.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredProfile {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
}

/// Get the profile document path
fn profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("support_chat").join("profile.json"))
}

/// Load the profile from an explicit path.
pub fn load_profile_from(path: &Path) -> Result<StoredProfile> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Save the profile to an explicit path, creating parent directories.
pub fn save_profile_to(path: &Path, profile: &StoredProfile) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create profile dir {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json).with_context(|| format!("Failed to write profile at {:?}", path))?;
    Ok(())
}

/// Load the profile from the platform config directory.
///
/// An absent or unreadable document is not an error for callers; it is
/// logged and reported as no profile.
pub fn load_profile() -> Option<StoredProfile> {
    let path = profile_path()?;
    if !path.exists() {
        return None;
    }

    match load_profile_from(&path) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Failed to load profile at {:?}: {}", path, e);
            None
        }
    }
}

/// Save the profile to the platform config directory.
pub fn save_profile(profile: &StoredProfile) -> anyhow::Result<()> {
    let path = profile_path().ok_or_else(|| anyhow::anyhow!("Could not determine config dir"))?;
    save_profile_to(&path, profile)
}

/// Local user id: environment override first, then the stored profile.
pub fn stored_user_id() -> Option<String> {
    if let Ok(val) = std::env::var(USER_ID_ENV) {
        if !val.is_empty() {
            return Some(val);
        }
    }
    load_profile().and_then(|p| p.user_id)
}

/// Active chat id: environment override first, then the stored profile.
pub fn stored_chat_id() -> Option<String> {
    if let Ok(val) = std::env::var(CHAT_ID_ENV) {
        if !val.is_empty() {
            return Some(val);
        }
    }
    load_profile().and_then(|p| p.chat_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_profile_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("profile.json");

        let profile = StoredProfile {
            user_id: Some("user-1".into()),
            chat_id: Some("chat-9".into()),
        };
        save_profile_to(&path, &profile).unwrap();

        let loaded = load_profile_from(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_partial_profile_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "chat_id": "chat-9" }"#).unwrap();

        let loaded = load_profile_from(&path).unwrap();
        assert_eq!(loaded.user_id, None);
        assert_eq!(loaded.chat_id.as_deref(), Some("chat-9"));
    }

    #[test]
    fn test_malformed_profile_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_profile_from(&path).unwrap_err();
        assert!(matches!(err, ProfileError::Malformed(_)));
    }

    #[test]
    fn test_missing_profile_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = load_profile_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ProfileError::Io(_)));
    }
}
