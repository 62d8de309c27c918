use continuity_store::{MessageRecord, RoleMessage, Store};
use tracing::{info, instrument};

use crate::{
    error::Result,
    types::{pair_flush, InboundMessage},
};

/// The message-window engine: paired user/assistant records, per-message
/// task-completion marks, and bounded-tail cleanup, layered over the
/// shared artifact store's `session_messages` table.
#[derive(Clone)]
pub struct WindowEngine {
    store: Store,
}

impl WindowEngine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist one turn's flat role-tagged sequence as paired records.
    /// `messages_id` is the turn-level id shared by every record this call
    /// creates.
    #[instrument(skip(self, messages), fields(session_id, messages_id))]
    pub fn upload(
        &self,
        session_id: &str,
        messages: &[InboundMessage],
        messages_id: &str,
        now: &str,
    ) -> Result<Vec<String>> {
        let pairs = pair_flush(messages);
        let mut ids = Vec::with_capacity(pairs.len());
        for (user_content, assistant_content) in pairs {
            let id = self
                .store
                .insert_message(session_id, &user_content, &assistant_content, now, messages_id)?;
            ids.push(id);
        }
        Ok(ids)
    }

    pub fn count(&self, session_id: &str) -> Result<usize> {
        Ok(self.store.count_messages(session_id)?)
    }

    /// Role-tagged view of the window, ascending by `created_at`. Each
    /// record yields a `user` line and, if non-empty, an `assistant` line.
    pub fn get(&self, session_id: &str) -> Result<Vec<RoleMessage>> {
        let records = self.store.list_messages(session_id)?;
        let mut out = Vec::with_capacity(records.len() * 2);
        for rec in records {
            out.push(RoleMessage {
                role: "user".to_string(),
                content: rec.user_content.clone(),
                timestamp: rec.created_at.clone(),
                created_at: rec.created_at.clone(),
            });
            if !rec.assistant_content.is_empty() {
                out.push(RoleMessage {
                    role: "assistant".to_string(),
                    content: rec.assistant_content,
                    timestamp: rec.created_at.clone(),
                    created_at: rec.created_at,
                });
            }
        }
        Ok(out)
    }

    pub fn mark_task(
        &self,
        session_id: &str,
        task_index: u8,
        task_id: &str,
    ) -> Result<Vec<MessageRecord>> {
        Ok(self.store.mark_task(session_id, task_index, task_id)?)
    }

    /// Floor-preserving retention sweep: never deletes a record with an
    /// unclaimed task, and always leaves at least `min(total, keep)`
    /// records behind.
    #[instrument(skip(self), fields(session_id, keep))]
    pub fn clean(&self, session_id: &str, keep: usize) -> Result<usize> {
        let records = self.store.list_messages(session_id)?;
        let total = records.len();

        let mut filtered: Vec<&MessageRecord> =
            records.iter().filter(|r| r.fully_claimed()).collect();
        // `list_messages` already returns ascending by created_at.
        let filtered_count = filtered.len();

        if filtered_count <= keep {
            return Ok(0);
        }

        let to_delete: Vec<String> = if total - filtered_count >= keep {
            filtered.iter().map(|r| r.id.clone()).collect()
        } else {
            let keep_from_filtered = keep - (total - filtered_count);
            let delete_count = filtered_count - keep_from_filtered;
            filtered.truncate(delete_count);
            filtered.iter().map(|r| r.id.clone()).collect()
        };

        let deleted = self.store.delete_message_ids(&to_delete)?;
        info!(session_id, deleted, "window retention swept");
        Ok(deleted)
    }

    pub fn delete(&self, session_id: &str) -> Result<usize> {
        Ok(self.store.delete_messages(session_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> WindowEngine {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        WindowEngine::new(store)
    }

    fn claim_all(engine: &WindowEngine, session_id: &str) {
        engine.mark_task(session_id, 1, "t1").unwrap();
        engine.mark_task(session_id, 2, "t2").unwrap();
        engine.mark_task(session_id, 3, "t3").unwrap();
    }

    #[test]
    fn upload_pairs_and_flushes_trailing_user() {
        let e = engine();
        let msgs = vec![
            InboundMessage::user("hi"),
            InboundMessage::assistant("hello"),
            InboundMessage::user("bye"),
        ];
        let ids = e.upload("sess", &msgs, "turn-1", "2026-01-01T00:00:00Z").unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(e.count("sess").unwrap(), 2);

        let view = e.get("sess").unwrap();
        assert_eq!(view.len(), 3); // hi/hello pair + lone "bye"
        assert_eq!(view[0].role, "user");
        assert_eq!(view[1].role, "assistant");
    }

    #[test]
    fn clean_is_noop_when_filtered_under_keep() {
        let e = engine();
        for i in 0..3 {
            e.upload(
                "sess",
                &[InboundMessage::user(format!("msg {i}"))],
                "turn",
                "2026-01-01T00:00:00Z",
            )
            .unwrap();
        }
        claim_all(&e, "sess");
        let deleted = e.clean("sess", 10).unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(e.count("sess").unwrap(), 3);
    }

    #[test]
    fn clean_deletes_all_filtered_when_unprocessed_tail_covers_keep() {
        let e = engine();
        for i in 0..5 {
            e.upload(
                "sess",
                &[InboundMessage::user(format!("old {i}"))],
                "turn-old",
                &format!("2026-01-01T00:00:0{i}Z"),
            )
            .unwrap();
        }
        claim_all(&e, "sess");
        for i in 0..5 {
            e.upload(
                "sess",
                &[InboundMessage::user(format!("new {i}"))],
                "turn-new",
                &format!("2026-01-02T00:00:0{i}Z"),
            )
            .unwrap();
        }
        // total=10, filtered=5, keep=3: total-filtered=5 >= keep=3 -> delete all filtered
        let deleted = e.clean("sess", 3).unwrap();
        assert_eq!(deleted, 5);
        assert_eq!(e.count("sess").unwrap(), 5);
    }

    #[test]
    fn clean_preserves_newest_within_filtered_set() {
        let e = engine();
        // 15 processed records, keep=10: deletes oldest 5, leaves newest 10.
        for i in 0..15 {
            e.upload(
                "sess",
                &[InboundMessage::user(format!("msg {i}"))],
                "turn",
                &format!("2026-01-01T00:{:02}:00Z", i),
            )
            .unwrap();
        }
        claim_all(&e, "sess");
        let deleted = e.clean("sess", 10).unwrap();
        assert_eq!(deleted, 5);
        assert_eq!(e.count("sess").unwrap(), 10);
    }
}
