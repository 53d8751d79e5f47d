//! Timer snapshots in the key-value store
//!
//! Two mutually exclusive records describe an interrupted run: `timer.running`
//! and `timer.paused`. Which one is present is the only recovery signal. This
//! module just serializes them; persistence failures are logged here and never
//! reach the timer.

use super::store::KeyValueStore;
use crate::domain::SubjectSelection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RUNNING_KEY: &str = "timer.running";
pub const PAUSED_KEY: &str = "timer.paused";

/// Persisted form of a running timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningSnapshot {
    /// Most recent start/resume instant
    pub started_at: DateTime<Utc>,
    /// Time banked before `started_at`
    pub accumulated_seconds: u64,
    /// Instant of the original start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_started_at: Option<DateTime<Utc>>,
    pub selection: SubjectSelection,
}

/// Persisted form of a paused timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PausedSnapshot {
    pub accumulated_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_started_at: Option<DateTime<Utc>>,
    pub selection: SubjectSelection,
}

/// What was found in the store at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveredSnapshot {
    Running(RunningSnapshot),
    Paused(PausedSnapshot),
    None,
}

/// Reads and writes the two timer snapshot keys
#[derive(Debug, Clone)]
pub struct SnapshotManager<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SnapshotManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn write_running(&self, snapshot: &RunningSnapshot) {
        self.write(RUNNING_KEY, snapshot);
    }

    pub fn write_paused(&self, snapshot: &PausedSnapshot) {
        self.write(PAUSED_KEY, snapshot);
    }

    pub fn remove_running(&self) {
        self.remove(RUNNING_KEY);
    }

    pub fn remove_paused(&self) {
        self.remove(PAUSED_KEY);
    }

    /// Remove both snapshots
    pub fn clear(&self) {
        self.remove(RUNNING_KEY);
        self.remove(PAUSED_KEY);
    }

    /// Load whichever snapshot is present. A running snapshot wins over a
    /// paused one; anything unreadable clears both keys and counts as absent.
    pub fn load(&self) -> RecoveredSnapshot {
        match self.read::<RunningSnapshot>(RUNNING_KEY) {
            Ok(Some(running)) => {
                if matches!(self.store.get(PAUSED_KEY), Ok(Some(_))) {
                    tracing::warn!("Both timer snapshots present, dropping the paused one");
                    self.remove(PAUSED_KEY);
                }
                return RecoveredSnapshot::Running(running);
            }
            Ok(None) => {}
            Err(message) => {
                tracing::warn!("Discarding unreadable running snapshot: {}", message);
                self.clear();
                return RecoveredSnapshot::None;
            }
        }

        match self.read::<PausedSnapshot>(PAUSED_KEY) {
            Ok(Some(paused)) => RecoveredSnapshot::Paused(paused),
            Ok(None) => RecoveredSnapshot::None,
            Err(message) => {
                tracing::warn!("Discarding unreadable paused snapshot: {}", message);
                self.clear();
                RecoveredSnapshot::None
            }
        }
    }

    fn read<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, String> {
        let raw = self.store.get(key).map_err(|e| e.to_string())?;
        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| format!("{}: {}", key, e)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, &json) {
            tracing::error!("Failed to write timer snapshot: {}", e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::error!("Failed to remove timer snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Subject;
    use crate::persistence::store::MemoryStore;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn running() -> RunningSnapshot {
        RunningSnapshot {
            started_at: t0(),
            accumulated_seconds: 30,
            session_started_at: Some(t0()),
            selection: SubjectSelection::Chapter {
                subject: Subject::Physics,
                chapter_serial: 5,
                chapter_name: "Optics".to_string(),
                material: Some("Notes".to_string()),
            },
        }
    }

    fn paused() -> PausedSnapshot {
        PausedSnapshot {
            accumulated_seconds: 30,
            session_started_at: Some(t0()),
            selection: SubjectSelection::default(),
        }
    }

    #[test]
    fn test_load_empty_store() {
        let manager = SnapshotManager::new(MemoryStore::new());
        assert_eq!(manager.load(), RecoveredSnapshot::None);
    }

    #[test]
    fn test_write_and_load_running() {
        let manager = SnapshotManager::new(MemoryStore::new());
        manager.write_running(&running());
        assert_eq!(manager.load(), RecoveredSnapshot::Running(running()));
    }

    #[test]
    fn test_write_and_load_paused() {
        let manager = SnapshotManager::new(MemoryStore::new());
        manager.write_paused(&paused());
        assert_eq!(manager.load(), RecoveredSnapshot::Paused(paused()));
    }

    #[test]
    fn test_running_wins_when_both_present() {
        let store = MemoryStore::new();
        let manager = SnapshotManager::new(store.clone());
        manager.write_running(&running());
        manager.write_paused(&paused());

        assert_eq!(manager.load(), RecoveredSnapshot::Running(running()));
        assert!(store.contains(RUNNING_KEY));
        assert!(!store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_corrupt_snapshot_clears_both_keys() {
        let store = MemoryStore::new();
        store.set(RUNNING_KEY, "{not json").unwrap();
        store.set(PAUSED_KEY, &serde_json::to_string(&paused()).unwrap()).unwrap();

        let manager = SnapshotManager::new(store.clone());
        assert_eq!(manager.load(), RecoveredSnapshot::None);
        assert!(!store.contains(RUNNING_KEY));
        assert!(!store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_corrupt_paused_snapshot_is_absent() {
        let store = MemoryStore::new();
        store.set(PAUSED_KEY, "{\"accumulated_seconds\": -4}").unwrap();

        let manager = SnapshotManager::new(store.clone());
        assert_eq!(manager.load(), RecoveredSnapshot::None);
        assert!(!store.contains(PAUSED_KEY));
    }

    #[test]
    fn test_snapshot_without_session_start_still_loads() {
        let store = MemoryStore::new();
        store
            .set(
                RUNNING_KEY,
                r#"{"started_at":"2024-03-01T10:00:00Z","accumulated_seconds":12,"selection":{"kind":"custom","title":"Reading"}}"#,
            )
            .unwrap();

        let manager = SnapshotManager::new(store);
        match manager.load() {
            RecoveredSnapshot::Running(snapshot) => {
                assert_eq!(snapshot.accumulated_seconds, 12);
                assert_eq!(snapshot.session_started_at, None);
            }
            other => panic!("expected running snapshot, got {:?}", other),
        }
    }
}
