use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::models::Role;

/// How many recently opened lectures are kept per user.
pub const RECENT_LECTURES_CAP: usize = 10;

const STATE_FILE: &str = "session.json";

/// Authenticated session as returned by login/invite acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    session: Option<Session>,
    /// Recently opened lecture ids per user id, most recent first.
    #[serde(default)]
    recent_lectures: HashMap<i64, Vec<i64>>,
}

/// Persistent client-side state, the counterpart of the browser's local
/// storage. One JSON file; every mutation writes it back.
pub struct SessionStore {
    path: PathBuf,
    state: StoredState,
}

impl SessionStore {
    /// Opens the store in `dir`, starting fresh when the file is missing.
    /// A corrupt file is discarded rather than blocking the client.
    pub fn open(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(STATE_FILE);
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding corrupt state file {}: {}", path.display(), e);
                StoredState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredState::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, state })
    }

    /// Default state directory, overridable via `SKOLAMAT_STATE_DIR`.
    pub fn default_dir(override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skolamat")
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    pub fn set_session(&mut self, session: Session) -> Result<(), AppError> {
        self.state.session = Some(session);
        self.save()
    }

    /// Logout: drops token, user id and role. Per-user recents survive.
    pub fn clear_session(&mut self) -> Result<(), AppError> {
        self.state.session = None;
        self.save()
    }

    /// Moves `lecture_id` to the front of the current user's recency
    /// list, deduplicated and capped. No-op without a session.
    pub fn record_recent(&mut self, lecture_id: i64) -> Result<(), AppError> {
        let Some(user_id) = self.state.session.as_ref().map(|s| s.user_id) else {
            return Ok(());
        };
        let recents = self.state.recent_lectures.entry(user_id).or_default();
        recents.retain(|id| *id != lecture_id);
        recents.insert(0, lecture_id);
        recents.truncate(RECENT_LECTURES_CAP);
        self.save()
    }

    /// Recency list for the current user, most recent first.
    pub fn recent_lectures(&self) -> Vec<i64> {
        self.state
            .session
            .as_ref()
            .and_then(|s| self.state.recent_lectures.get(&s.user_id))
            .cloned()
            .unwrap_or_default()
    }

    fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: i64) -> Session {
        Session {
            token: "tok".to_string(),
            user_id,
            role: Role::Lecturer,
        }
    }

    #[test]
    fn test_recents_dedupe_and_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::open(dir.path()).expect("open store");
        store.set_session(session(1)).expect("set session");

        store.record_recent(5).expect("record");
        store.record_recent(7).expect("record");
        store.record_recent(5).expect("record");

        assert_eq!(store.recent_lectures(), vec![5, 7]);
    }

    #[test]
    fn test_recents_capped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::open(dir.path()).expect("open store");
        store.set_session(session(1)).expect("set session");

        for id in 0..20 {
            store.record_recent(id).expect("record");
        }

        let recents = store.recent_lectures();
        assert_eq!(recents.len(), RECENT_LECTURES_CAP);
        assert_eq!(recents[0], 19);
    }

    #[test]
    fn test_recents_are_per_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::open(dir.path()).expect("open store");

        store.set_session(session(1)).expect("set session");
        store.record_recent(10).expect("record");

        store.set_session(session(2)).expect("set session");
        assert!(store.recent_lectures().is_empty());
        store.record_recent(20).expect("record");

        store.set_session(session(1)).expect("set session");
        assert_eq!(store.recent_lectures(), vec![10]);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut store = SessionStore::open(dir.path()).expect("open store");
            store.set_session(session(3)).expect("set session");
            store.record_recent(42).expect("record");
        }

        let store = SessionStore::open(dir.path()).expect("reopen store");
        assert_eq!(store.session().map(|s| s.user_id), Some(3));
        assert_eq!(store.recent_lectures(), vec![42]);
    }

    #[test]
    fn test_clear_session_keeps_recents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = SessionStore::open(dir.path()).expect("open store");
        store.set_session(session(1)).expect("set session");
        store.record_recent(8).expect("record");

        store.clear_session().expect("clear");
        assert!(store.session().is_none());

        store.set_session(session(1)).expect("set session again");
        assert_eq!(store.recent_lectures(), vec![8]);
    }

    #[test]
    fn test_corrupt_state_file_is_discarded() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(STATE_FILE), "{not json").expect("write");

        let store = SessionStore::open(dir.path()).expect("open store");
        assert!(store.session().is_none());
    }
}
