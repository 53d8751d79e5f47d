//! Session ledger: the recorded study sessions
//!
//! The whole ledger is stored as one JSON array under the `sessions` key and
//! rewritten after every mutation.

use crate::domain::StudySession;
use crate::persistence::KeyValueStore;
use anyhow::{Context, Result};
use uuid::Uuid;

pub const SESSIONS_KEY: &str = "sessions";

pub struct SessionLedger<S: KeyValueStore> {
    store: S,
    sessions: Vec<StudySession>,
}

impl<S: KeyValueStore> SessionLedger<S> {
    /// Load the ledger from the store. An unreadable ledger is an error rather
    /// than an empty one so that recorded history is never overwritten.
    pub fn load(store: S) -> Result<Self> {
        let sessions = match store.get(SESSIONS_KEY)? {
            Some(text) if !text.trim().is_empty() => {
                serde_json::from_str(&text).context("Failed to parse session ledger")?
            }
            _ => Vec::new(),
        };

        Ok(Self { store, sessions })
    }

    /// All sessions in insertion order
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StudySession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Sessions whose ID starts with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&StudySession> {
        self.sessions
            .iter()
            .filter(|s| s.id.starts_with(prefix))
            .collect()
    }

    /// Sessions ordered by end time, oldest first; insertion order breaks ties
    pub fn sorted_by_end_time(&self) -> Vec<&StudySession> {
        let mut sorted: Vec<&StudySession> = self.sessions.iter().collect();
        sorted.sort_by_key(|s| s.end_time);
        sorted
    }

    /// Append a session under a fresh ID and save. Returns the stored record.
    pub fn append(&mut self, mut session: StudySession) -> Result<StudySession> {
        session.id = Uuid::new_v4().to_string();
        while self.get(&session.id).is_some() {
            session.id = Uuid::new_v4().to_string();
        }

        self.sessions.push(session.clone());
        if let Err(e) = self.save() {
            self.sessions.pop();
            return Err(e);
        }

        tracing::info!(
            "Recorded session {} \"{}\" ({}s)",
            session.short_id(),
            session.title,
            session.duration
        );
        Ok(session)
    }

    /// Remove a session. Unknown IDs are a no-op and return false.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            tracing::debug!("Remove of unknown session {}", id);
            return Ok(false);
        };

        let removed = self.sessions.remove(index);
        if let Err(e) = self.save() {
            self.sessions.insert(index, removed);
            return Err(e);
        }
        tracing::info!("Removed session {}", id);
        Ok(true)
    }

    /// Replace the session with the same ID. Unknown IDs are a no-op and return false.
    pub fn update(&mut self, session: StudySession) -> Result<bool> {
        let Some(existing) = self.sessions.iter_mut().find(|s| s.id == session.id) else {
            tracing::debug!("Update of unknown session {}", session.id);
            return Ok(false);
        };

        let previous = std::mem::replace(existing, session);
        if let Err(e) = self.save() {
            if let Some(existing) = self.sessions.iter_mut().find(|s| s.id == previous.id) {
                *existing = previous;
            }
            return Err(e);
        }
        tracing::info!("Updated session {}", previous.id);
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.sessions)
            .context("Failed to serialize session ledger")?;
        self.store
            .set(SESSIONS_KEY, &json)
            .context("Failed to save session ledger")?;
        Ok(())
    }
}
