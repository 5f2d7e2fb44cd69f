//! Session-scoped conversion history.
//!
//! Each browser session (identified by a cookie UUID, minted in the HTTP
//! layer) owns a bounded list of [`ConversionRecord`]s — one per conversion
//! attempt, success or failure, newest last. Nothing is persisted: records
//! live in process memory and disappear when the session idles past its TTL
//! or the process restarts.
//!
//! The store is an explicit object held in shared state and handed to
//! whoever needs it, so tests construct an isolated store per scenario.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::imaging::OutputFormat;

/// Timestamp format for history display, e.g. `2026-08-25 14:03:59`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one conversion attempt, as shown on the history panel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversionRecord {
    pub filename: String,
    pub output_format: OutputFormat,
    pub success: bool,
    pub timestamp: String,
}

impl ConversionRecord {
    /// Build a record stamped with the current local time.
    pub fn new(filename: impl Into<String>, output_format: OutputFormat, success: bool) -> Self {
        Self {
            filename: filename.into(),
            output_format,
            success,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

struct Session {
    records: VecDeque<ConversionRecord>,
    last_seen: Instant,
}

/// In-memory, bounded, TTL-swept history store for all sessions.
pub struct SessionStore {
    capacity: usize,
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    /// `capacity` bounds the records kept per session (oldest dropped
    /// first); `ttl` is how long an idle session survives between sweeps.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Append a record to a session's history, creating the session entry
    /// on first use and evicting the oldest record past capacity.
    pub fn append(&self, id: Uuid, record: ConversionRecord) {
        if let Ok(mut sessions) = self.sessions.lock() {
            let session = sessions.entry(id).or_insert_with(|| Session {
                records: VecDeque::new(),
                last_seen: Instant::now(),
            });
            session.records.push_back(record);
            while session.records.len() > self.capacity {
                session.records.pop_front();
            }
            session.last_seen = Instant::now();
        }
    }

    /// The session's records, oldest first. Touches the session's idle
    /// clock. Unknown sessions yield an empty list.
    pub fn list(&self, id: Uuid) -> Vec<ConversionRecord> {
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.get_mut(&id) {
                session.last_seen = Instant::now();
                return session.records.iter().cloned().collect();
            }
        }
        Vec::new()
    }

    /// Drop all records for a session, keeping the session alive.
    pub fn clear(&self, id: Uuid) {
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.get_mut(&id) {
                session.records.clear();
                session.last_seen = Instant::now();
            }
        }
    }

    /// Remove sessions idle longer than the TTL. Returns how many were
    /// dropped. Called periodically from a background task.
    pub fn sweep(&self) -> usize {
        if let Ok(mut sessions) = self.sessions.lock() {
            let before = sessions.len();
            sessions.retain(|_, session| session.last_seen.elapsed() <= self.ttl);
            before - sessions.len()
        } else {
            0
        }
    }

    /// Number of live sessions (diagnostics and tests).
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}
