//! Session-keyed conversation memory.
//!
//! Each session owns an ordered list of (input, output) turns held in
//! process memory. Sessions are created on first use, evicted after an
//! idle timeout, and removable through an explicit close. A per-session
//! permit serializes turns so at most one is in flight per session and
//! memory is appended exactly once per completed turn.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::config::MemorySettings;

pub const DEFAULT_SESSION_ID: &str = "default";

/// One completed exchange: what the user asked and what the assistant said.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub input: String,
    pub output: String,
}

struct SessionEntry {
    turns: Vec<ConversationTurn>,
    last_active: Instant,
    permit: Arc<Mutex<()>>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
            permit: Arc::new(Mutex::new(())),
        }
    }
}

pub struct MemoryRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl MemoryRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn from_settings(settings: &MemorySettings) -> Self {
        Self::new(Duration::from_secs(settings.idle_timeout_secs))
    }

    /// Acquire the turn permit for a session, creating the session if it
    /// does not exist yet. The returned guard must be held for the whole
    /// turn; a second caller for the same session waits here. Idle
    /// sessions are purged on the way in.
    pub async fn begin_turn(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let permit = {
            let mut sessions = self.sessions.lock().await;
            purge_idle(&mut sessions, self.idle_timeout);
            let entry = sessions
                .entry(session_id.to_string())
                .or_insert_with(SessionEntry::new);
            entry.last_active = Instant::now();
            Arc::clone(&entry.permit)
        };
        // Awaited outside the map lock so a long turn in one session
        // cannot block every other session.
        permit.lock_owned().await
    }

    /// Snapshot of the session's turn history, oldest first. Unknown
    /// sessions have an empty history.
    pub async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default()
    }

    pub async fn append(&self, session_id: &str, input: String, output: String) {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionEntry::new);
        entry.last_active = Instant::now();
        entry.turns.push(ConversationTurn { input, output });
    }

    /// Drop a session and its history. Returns whether it existed.
    pub async fn close(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn purge_idle(sessions: &mut HashMap<String, SessionEntry>, idle_timeout: Duration) {
    sessions.retain(|session_id, entry| {
        // A strong count above one means a turn holds (or is waiting on)
        // the permit; such sessions are never evicted mid-turn.
        let in_flight = Arc::strong_count(&entry.permit) > 1;
        let keep = in_flight || entry.last_active.elapsed() < idle_timeout;
        if !keep {
            tracing::info!("Evicting idle session: {}", session_id);
        }
        keep
    });
}
