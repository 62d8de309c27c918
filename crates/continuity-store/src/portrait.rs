use std::collections::BTreeMap;

use continuity_core::Node;
use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use crate::{error::Result, manager::Store, types::UserPortraitDoc};

impl Store {
    /// Fetch the portrait document for `session_id`, or `None` if the
    /// session has never been profiled.
    pub fn get_portrait(&self, session_id: &str) -> Result<Option<UserPortraitDoc>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT id, portrait, created_at, updated_at
                 FROM user_portrait WHERE session_id = ?1",
                params![session_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((id, portrait_json, created_at, updated_at)) = row else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&portrait_json)?;
        Ok(Some(UserPortraitDoc {
            id,
            session_id: session_id.to_string(),
            user_portrait: Node::from(value),
            created_at,
            updated_at,
        }))
    }

    /// Return the current portrait, or an empty `Object` skeleton if none
    /// exists yet — the shape the profile worker's merge step expects.
    pub fn get_portrait_or_empty(&self, session_id: &str) -> Result<Node> {
        Ok(self
            .get_portrait(session_id)?
            .map(|doc| doc.user_portrait)
            .unwrap_or_else(|| Node::Object(BTreeMap::new())))
    }

    /// Upsert the merged portrait, preserving `created_at` across updates.
    #[instrument(skip(self, portrait), fields(session_id))]
    pub fn upsert_portrait(&self, session_id: &str, portrait: &Node, now: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let existing_id: Option<String> = conn
            .query_row(
                "SELECT id FROM user_portrait WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        let portrait_json = serde_json::to_string(portrait)?;

        match existing_id {
            Some(id) => {
                conn.execute(
                    "UPDATE user_portrait SET portrait = ?1, updated_at = ?2 WHERE id = ?3",
                    params![portrait_json, now, id],
                )?;
            }
            None => {
                let id = uuid::Uuid::now_v7().to_string();
                conn.execute(
                    "INSERT INTO user_portrait (id, session_id, portrait, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![id, session_id, portrait_json, now],
                )?;
            }
        }
        Ok(())
    }

    pub fn delete_portrait(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM user_portrait WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn missing_portrait_yields_empty_skeleton() {
        let s = store();
        let node = s.get_portrait_or_empty("sess").unwrap();
        assert!(node.is_empty_collection());
    }

    #[test]
    fn upsert_preserves_created_at_across_updates() {
        let s = store();
        let portrait = Node::from(serde_json::json!({"basic_information": {"age": "20"}}));
        s.upsert_portrait("sess", &portrait, "2026-01-01T00:00:00Z").unwrap();
        let first = s.get_portrait("sess").unwrap().unwrap();

        let updated = Node::from(serde_json::json!({"basic_information": {"age": "21"}}));
        s.upsert_portrait("sess", &updated, "2026-01-02T00:00:00Z").unwrap();
        let second = s.get_portrait("sess").unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.updated_at, "2026-01-02T00:00:00Z");
    }
}
