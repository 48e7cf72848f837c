// Saved on quit and loaded on startup so the jukebox comes back with the
// same audio mode and volumes it had.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seqtone::{AudioConfig, AudioMode};

pub const SEQTONE_DIR: &str = ".seqtone";
const SESSION_FILE: &str = "session.json";
pub const LOG_FILE: &str = "seqtone.log";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub mode: AudioMode,
    pub audio: AudioConfig,
    pub root: Option<String>, // last root note used in the jukebox
}

// <project_dir>/.seqtone/session.json
fn session_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SEQTONE_DIR).join(SESSION_FILE)
}

pub fn load_session(project_dir: &Path) -> Option<Session> {
    let path = session_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("ignoring unreadable session {}: {e}", path.display());
            None
        }
    }
}

// Save the session to disk, making the files if they don't exist already
pub fn save_session(project_dir: &Path, session: &Session) -> anyhow::Result<()> {
    let path = session_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .seqtone/ if needed
    }
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_session(dir.path()).is_none());

        let session = Session {
            mode: AudioMode::Sfx,
            audio: AudioConfig { music_volume: 0.25, ..AudioConfig::default() },
            root: Some("D3".into()),
        };
        save_session(dir.path(), &session).unwrap();
        assert_eq!(load_session(dir.path()), Some(session));
    }

    #[test]
    fn corrupt_or_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(SEQTONE_DIR)).unwrap();
        let path = session_file_path(dir.path());

        std::fs::write(&path, "][").unwrap();
        assert!(load_session(dir.path()).is_none());

        std::fs::write(&path, r#"{ "mode": "bogus" }"#).unwrap();
        let session = load_session(dir.path()).unwrap();
        assert_eq!(session.mode, AudioMode::On);
        assert_eq!(session.audio, AudioConfig::default());
    }
}
