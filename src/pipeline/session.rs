//! In-memory store of live chat sessions.
//!
//! Sessions are immutable apart from their conversation, so each entry keeps the
//! document, summary, and metadata lock-free and guards only the transcript with a
//! `tokio` mutex. That mutex doubles as the one-in-flight-chat rule: it is held across
//! the provider call, so a second question on the same session waits its turn while
//! other sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::conversation::Conversation;
use super::types::{Document, DocumentSummary};

/// One live session.
pub struct SessionEntry {
    /// Session identifier.
    pub id: Uuid,
    /// File name supplied at upload.
    pub file_name: String,
    /// Creation moment.
    pub created_at: OffsetDateTime,
    /// The ingested document.
    pub document: Document,
    /// Summary generated during ingest.
    pub summary: DocumentSummary,
    /// Transcript, guarded by the per-session lock.
    pub conversation: Mutex<Conversation>,
}

/// Concurrent map of live sessions keyed by id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry and return the shared handle.
    pub async fn insert(&self, entry: SessionEntry) -> Arc<SessionEntry> {
        let entry = Arc::new(entry);
        self.sessions
            .write()
            .await
            .insert(entry.id, Arc::clone(&entry));
        entry
    }

    /// Look up a session by id.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session, returning it when it existed.
    pub async fn remove(&self, id: &Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.write().await.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> SessionEntry {
        SessionEntry {
            id: Uuid::new_v4(),
            file_name: "report.txt".into(),
            created_at: OffsetDateTime::now_utc(),
            document: Document {
                id: Uuid::new_v4(),
                raw_text: "text".into(),
                truncated_text: "text".into(),
            },
            summary: DocumentSummary {
                short: "s".into(),
                detailed: "d".into(),
                bullets: vec![],
                insights: vec![],
                keywords: vec![],
            },
            conversation: Mutex::new(Conversation::new()),
        }
    }

    #[tokio::test]
    async fn stores_and_returns_entries_by_id() {
        let store = SessionStore::new();
        let inserted = store.insert(entry()).await;

        let found = store.get(&inserted.id).await.expect("entry present");
        assert_eq!(found.file_name, "report.txt");
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn remove_is_terminal() {
        let store = SessionStore::new();
        let inserted = store.insert(entry()).await;

        assert!(store.remove(&inserted.id).await.is_some());
        assert!(store.remove(&inserted.id).await.is_none());
        assert!(store.get(&inserted.id).await.is_none());
    }
}
