use crate::model::{CountMode, CountdownSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

/// Everything that survives a restart: the set list, the active index,
/// the running flag, the count mode and the theme name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub sets: Vec<CountdownSet>,
    #[serde(default)]
    pub active_index: usize,
    /// Persisted as-is, but never honored on load; see `restored`.
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub mode: CountMode,
    #[serde(default = "Session::default_theme")]
    pub theme: String,
}

impl Session {
    fn default_theme() -> String {
        "dark".into()
    }

    /// A restored session always comes back paused: resuming a countdown
    /// with no surrounding timer context is never what the operator wants.
    pub fn restored(mut self) -> Self {
        self.is_running = false;
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            active_index: 0,
            is_running: false,
            mode: CountMode::Single,
            theme: "dark".into(),
        }
    }
}

/// Injected load/save capability. Both sides are best-effort: the caller
/// falls back to defaults on a failed load and drops a failed save.
pub trait SessionStore {
    /// `Ok(None)` for a missing or unreadable-as-a-session file.
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Session>> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<()> {
        (**self).save(session)
    }
}

pub fn session_path() -> PathBuf {
    // STAGECOUNT_SESSION env var overrides for testing.
    if let Ok(path) = std::env::var("STAGECOUNT_SESSION") {
        return PathBuf::from(path);
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("stagecount")
        .join("session.json")
}

/// JSON session file on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_path() -> Self {
        Self::new(session_path())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading session from {}", self.path.display()))?;
        // Malformed content degrades to a fresh session rather than failing
        Ok(serde_json::from_str(&contents).ok())
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(session).context("serializing session")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("writing session to {}", self.path.display()))
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            sets: vec![CountdownSet::new(5), CountdownSet { start_value: 3, current_value: 1 }],
            active_index: 1,
            is_running: true,
            mode: CountMode::Hold,
            theme: "light".into(),
        }
    }

    // --- restored ---

    #[test]
    fn restored_forces_running_off() {
        let session = sample_session().restored();
        assert!(!session.is_running);
        // Everything else survives
        assert_eq!(session.active_index, 1);
        assert_eq!(session.mode, CountMode::Hold);
        assert_eq!(session.theme, "light");
    }

    // --- JSON round-trip ---

    #[test]
    fn session_round_trips_through_json() {
        let session = sample_session();
        let json = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let decoded: Session = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded, Session::default());
        assert_eq!(decoded.theme, "dark");
    }

    // --- file store ---

    #[test]
    fn file_store_round_trips() {
        let dir = std::env::temp_dir().join("stagecount-test-session");
        let _ = std::fs::remove_dir_all(&dir);
        let store = FileSessionStore::new(dir.join("session.json"));

        assert!(store.load().unwrap().is_none(), "missing file loads as None");

        let session = sample_session();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_tolerates_garbage() {
        let dir = std::env::temp_dir().join("stagecount-test-garbage");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileSessionStore::new(path);
        assert!(store.load().unwrap().is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    // --- memory store ---

    #[test]
    fn memory_store_round_trips() {
        let store = MemorySessionStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_session()));
    }
}
