//! Session memory: the durable record of every planning session, as a
//! single atomically-rewritten JSON file.

use crate::error::Result;
use crate::graph::atomic_write_json;
use banquet_types::BeliefState;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle status of a session record, independent of its belief
/// `SessionState` — this tracks whether the session is still reachable at
/// all, not how far its plan has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRecordStatus {
    /// Accepts further `user_request` messages.
    Active,
    /// Dormant but not archived; informational only.
    Inactive,
    /// Archived: the Planner refuses further `user_request` messages for
    /// this session.
    Archived,
}

/// One session's durable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The user this session belongs to.
    pub user_id: String,
    /// The session's current belief state.
    pub beliefs: BeliefState,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last time any belief in this session changed.
    pub last_activity: DateTime<Utc>,
    /// Lifecycle status.
    pub status: SessionRecordStatus,
    /// When the session was archived, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    /// When the session was marked inactive, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivated_at: Option<DateTime<Utc>>,
}

/// The `session_memory.json` store: `map<session_id, SessionRecord>`,
/// guarded by a single mutex and rewritten atomically on every change.
pub struct SessionMemory {
    path: PathBuf,
    sessions: Mutex<BTreeMap<Uuid, SessionRecord>>,
}

impl SessionMemory {
    /// Load `session_memory.json` from `path`, or start empty if it
    /// doesn't exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sessions = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|source| crate::error::GraphError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_slice(&bytes).map_err(|source| crate::error::GraphError::Malformed {
                path: path.display().to_string(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    /// Create and persist a new active session record for `user_id`.
    pub fn create(&self, session_id: Uuid, user_id: impl Into<String>) -> Result<()> {
        let now = Utc::now();
        let record = SessionRecord {
            user_id: user_id.into(),
            beliefs: BeliefState::new(),
            created_at: now,
            last_activity: now,
            status: SessionRecordStatus::Active,
            archived_at: None,
            inactivated_at: None,
        };
        self.sessions.lock().insert(session_id, record);
        self.persist()
    }

    /// Overwrite `session_id`'s beliefs and bump `last_activity`.
    pub fn update_beliefs(&self, session_id: Uuid, beliefs: BeliefState) -> Result<()> {
        {
            let mut sessions = self.sessions.lock();
            if let Some(record) = sessions.get_mut(&session_id) {
                record.beliefs = beliefs;
                record.last_activity = Utc::now();
            }
        }
        self.persist()
    }

    /// A clone of `session_id`'s record, if it exists.
    pub fn get(&self, session_id: Uuid) -> Option<SessionRecord> {
        self.sessions.lock().get(&session_id).cloned()
    }

    /// True if the session is archived (the Planner must refuse further
    /// `user_request` messages for it).
    pub fn is_archived(&self, session_id: Uuid) -> bool {
        self.sessions
            .lock()
            .get(&session_id)
            .map(|r| r.status == SessionRecordStatus::Archived)
            .unwrap_or(false)
    }

    /// Mark a session inactive.
    pub fn deactivate(&self, session_id: Uuid) -> Result<()> {
        {
            let mut sessions = self.sessions.lock();
            if let Some(record) = sessions.get_mut(&session_id) {
                record.status = SessionRecordStatus::Inactive;
                record.inactivated_at = Some(Utc::now());
            }
        }
        self.persist()
    }

    /// Archive a session. Once archived, the Planner refuses
    /// `user_request` messages for it.
    pub fn archive(&self, session_id: Uuid) -> Result<()> {
        {
            let mut sessions = self.sessions.lock();
            if let Some(record) = sessions.get_mut(&session_id) {
                record.status = SessionRecordStatus::Archived;
                record.archived_at = Some(Utc::now());
            }
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let sessions = self.sessions.lock();
        atomic_write_json(&self.path, &*sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session_memory.json");
        let memory = SessionMemory::load(&path).unwrap();
        let session_id = Uuid::new_v4();
        memory.create(session_id, "user-1").unwrap();

        let reloaded = SessionMemory::load(&path).unwrap();
        let record = reloaded.get(session_id).unwrap();
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.status, SessionRecordStatus::Active);
    }

    #[test]
    fn archived_sessions_are_reported_as_archived() {
        let dir = tempfile::tempdir().unwrap();
        let memory = SessionMemory::load(dir.path().join("session_memory.json")).unwrap();
        let session_id = Uuid::new_v4();
        memory.create(session_id, "user-1").unwrap();
        assert!(!memory.is_archived(session_id));
        memory.archive(session_id).unwrap();
        assert!(memory.is_archived(session_id));
    }
}
