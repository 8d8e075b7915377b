// src/chat/session.rs — In-memory, per-client chat session store
//
// Locking: an RwLock guards the id → session map and each session has its
// own Mutex, so appends to one session never wait on another. No lock is
// ever held across an await point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use uuid::Uuid;

/// Default history cap per session.
pub const MAX_HISTORY: usize = 50;

/// Paper context captured alongside a message. May be empty.
pub type PaperContext = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Question,
    Answer,
}

/// One recorded turn. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "paper_context")]
    pub context_snapshot: PaperContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub history: Vec<Message>,
}

impl Session {
    fn new(session_id: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            last_activity_at: now,
            history: Vec::new(),
        }
    }
}

/// How `resolve_or_create` satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Created,
    Resumed,
}

/// Whether a write found its session. Writes to an absent session are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session_id: String,
    pub outcome: SessionOutcome,
    /// Snapshot taken after the activity timestamp was updated.
    pub session: Session,
}

type SessionSlot = Arc<Mutex<Session>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    max_history: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl SessionStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history: max_history.max(1),
        }
    }

    /// Return the session for `session_id`, creating a fresh one (with a new
    /// id) when the id is absent or unknown. Always succeeds.
    pub fn resolve_or_create(&self, session_id: Option<&str>) -> ResolvedSession {
        if let Some(slot) = session_id.and_then(|id| self.slot(id)) {
            let session = touch(&slot);
            return ResolvedSession {
                session_id: session.session_id.clone(),
                outcome: SessionOutcome::Resumed,
                session: session.clone(),
            };
        }

        let session_id = Uuid::new_v4().to_string();
        let session = Session::new(session_id.clone());
        let snapshot = session.clone();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));

        tracing::debug!(session = %short_id(&session_id), "Created chat session");

        ResolvedSession {
            session_id,
            outcome: SessionOutcome::Created,
            session: snapshot,
        }
    }

    /// Append to the tail of the session's history, evicting from the head
    /// once the cap is exceeded.
    pub fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: impl Into<String>,
        context_snapshot: PaperContext,
    ) -> Presence {
        let Some(slot) = self.slot(session_id) else {
            return Presence::Absent;
        };

        let message = Message {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            context_snapshot,
        };

        let mut session = lock(&slot);
        session.history.push(message);
        let len = session.history.len();
        if len > self.max_history {
            session.history.drain(..len - self.max_history);
        }
        Presence::Present
    }

    /// Current history, oldest first. Empty when the session does not exist.
    /// Counts as activity on an existing session.
    pub fn get_history(&self, session_id: &str) -> Vec<Message> {
        self.slot(session_id)
            .map(|slot| touch(&slot).history.clone())
            .unwrap_or_default()
    }

    pub fn clear_history(&self, session_id: &str) -> Presence {
        match self.slot(session_id) {
            Some(slot) => {
                touch(&slot).history.clear();
                Presence::Present
            }
            None => Presence::Absent,
        }
    }

    /// Snapshot of an existing session, refreshing its activity time.
    /// Never creates.
    pub fn access(&self, session_id: &str) -> Option<Session> {
        self.slot(session_id).map(|slot| touch(&slot).clone())
    }

    /// Read-only snapshot; never creates and never touches activity.
    pub fn lookup(&self, session_id: &str) -> Option<Session> {
        self.slot(session_id).map(|slot| lock(&slot).clone())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were removed.
    /// A `ttl` that is negative or reaches before the representable range
    /// removes nothing.
    pub fn sweep_idle(&self, ttl: chrono::Duration) -> usize {
        if ttl < chrono::Duration::zero() {
            return 0;
        }
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, slot| lock(slot).last_activity_at >= cutoff);
        before - sessions.len()
    }

    fn slot(&self, session_id: &str) -> Option<SessionSlot> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }
}

fn lock(slot: &SessionSlot) -> MutexGuard<'_, Session> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn touch(slot: &SessionSlot) -> MutexGuard<'_, Session> {
    let mut session = lock(slot);
    session.last_activity_at = Utc::now();
    session
}

/// Client-facing abbreviation of a session id: first 8 chars + "...".
pub fn short_id(session_id: &str) -> String {
    let prefix: String = session_id.chars().take(8).collect();
    format!("{prefix}...")
}

/// Periodically evict idle sessions until the runtime shuts down.
pub fn spawn_idle_sweeper(
    store: Arc<SessionStore>,
    ttl: chrono::Duration,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = store.sweep_idle(ttl);
            if removed > 0 {
                tracing::info!(removed, remaining = store.len(), "Evicted idle chat sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(title: &str) -> PaperContext {
        let mut map = PaperContext::new();
        map.insert("title".into(), serde_json::json!(title));
        map
    }

    #[test]
    fn test_new_session_is_empty_and_fresh() {
        let store = SessionStore::default();
        let resolved = store.resolve_or_create(None);

        assert_eq!(resolved.outcome, SessionOutcome::Created);
        assert!(resolved.session.history.is_empty());
        assert_eq!(resolved.session.created_at, resolved.session.last_activity_at);
        assert_eq!(resolved.session.session_id, resolved.session_id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_gets_a_new_id() {
        let store = SessionStore::default();
        let resolved = store.resolve_or_create(Some("not-a-real-session"));

        assert_eq!(resolved.outcome, SessionOutcome::Created);
        assert_ne!(resolved.session_id, "not-a-real-session");
        assert!(store.lookup("not-a-real-session").is_none());
    }

    #[test]
    fn test_known_id_resumes_and_touches_activity() {
        let store = SessionStore::default();
        let first = store.resolve_or_create(None);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.resolve_or_create(Some(&first.session_id));

        assert_eq!(second.outcome, SessionOutcome::Resumed);
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(second.session.created_at, first.session.created_at);
        assert!(second.session.last_activity_at > first.session.last_activity_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let store = SessionStore::default();
        let a = store.resolve_or_create(None);
        let b = store.resolve_or_create(None);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_preserves_order_and_context() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;

        store.append_message(&id, Role::Question, "q1", ctx("Paper A"));
        store.append_message(&id, Role::Answer, "a1", PaperContext::new());

        let history = store.get_history(&id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Question);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[0].context_snapshot["title"], "Paper A");
        assert_eq!(history[1].role, Role::Answer);
        assert!(history[1].context_snapshot.is_empty());
    }

    #[test]
    fn test_history_capped_fifo() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;

        for i in 0..73 {
            store.append_message(&id, Role::Question, format!("m{i}"), PaperContext::new());
        }

        let history = store.get_history(&id);
        assert_eq!(history.len(), MAX_HISTORY);
        let contents: Vec<String> = history.iter().map(|m| m.content.clone()).collect();
        let expected: Vec<String> = (23..73).map(|i| format!("m{i}")).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_custom_cap() {
        let store = SessionStore::new(3);
        let id = store.resolve_or_create(None).session_id;
        for i in 0..5 {
            store.append_message(&id, Role::Answer, i.to_string(), PaperContext::new());
        }
        let contents: Vec<String> = store
            .get_history(&id)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_missing_session_operations_are_noops() {
        let store = SessionStore::default();

        assert_eq!(
            store.append_message("ghost", Role::Question, "hi", PaperContext::new()),
            Presence::Absent
        );
        assert!(store.get_history("ghost").is_empty());
        assert_eq!(store.clear_history("ghost"), Presence::Absent);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_history_keeps_session() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;
        store.append_message(&id, Role::Question, "q", PaperContext::new());

        assert_eq!(store.clear_history(&id), Presence::Present);
        assert!(store.get_history(&id).is_empty());
        assert!(store.lookup(&id).is_some());
    }

    #[test]
    fn test_sweep_idle_removes_only_stale_sessions() {
        let store = SessionStore::default();
        let stale = store.resolve_or_create(None).session_id;
        std::thread::sleep(std::time::Duration::from_millis(300));
        let fresh = store.resolve_or_create(None).session_id;

        let removed = store.sweep_idle(chrono::Duration::milliseconds(150));
        assert_eq!(removed, 1);
        assert!(store.lookup(&stale).is_none());
        assert!(store.lookup(&fresh).is_some());
    }

    #[test]
    fn test_sweep_with_huge_ttl_keeps_everything() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;

        // Far past the representable date range.
        let forever = chrono::Duration::try_minutes(1_000_000_000_000).unwrap();
        assert_eq!(store.sweep_idle(forever), 0);
        assert!(store.lookup(&id).is_some());
    }

    #[test]
    fn test_sweep_with_negative_ttl_keeps_everything() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;

        assert_eq!(store.sweep_idle(chrono::Duration::minutes(-1)), 0);
        assert!(store.lookup(&id).is_some());
    }

    #[test]
    fn test_reads_refresh_activity() {
        let store = SessionStore::default();
        let id = store.resolve_or_create(None).session_id;
        let created = store.lookup(&id).unwrap().last_activity_at;

        std::thread::sleep(std::time::Duration::from_millis(300));
        store.get_history(&id);
        let after_read = store.lookup(&id).unwrap().last_activity_at;
        assert!(after_read > created);

        std::thread::sleep(std::time::Duration::from_millis(5));
        store.clear_history(&id);
        let after_clear = store.lookup(&id).unwrap().last_activity_at;
        assert!(after_clear > after_read);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let accessed = store.access(&id).unwrap();
        assert!(accessed.last_activity_at > after_clear);

        assert_eq!(store.sweep_idle(chrono::Duration::milliseconds(150)), 0);
        assert!(store.lookup(&id).is_some());
    }

    #[test]
    fn test_access_never_creates() {
        let store = SessionStore::default();
        assert!(store.access("ghost").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567...");
        assert_eq!(short_id("abc"), "abc...");
    }

    #[test]
    fn test_message_serializes_with_wire_names() {
        let msg = Message {
            role: Role::Answer,
            content: "hello".into(),
            timestamp: Utc::now(),
            context_snapshot: PaperContext::new(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "answer");
        assert_eq!(json["content"], "hello");
        assert!(json["paper_context"].is_object());
    }
}
