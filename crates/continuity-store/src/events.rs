use rusqlite::params;
use tracing::instrument;

use crate::{
    error::Result,
    manager::Store,
    types::{EventRecord, EventType, SessionEvents},
};

/// Past/future buckets are capped to this many entries each, newest first
/// by `execution_time` — matches `GetSessionEvents`'s top-5/top-5 contract.
const BUCKET_LIMIT: i64 = 5;

impl Store {
    #[instrument(skip(self, event), fields(session_id))]
    pub fn insert_event(
        &self,
        session_id: &str,
        event: &str,
        created_at: &str,
        execution_time: &str,
        event_type: EventType,
    ) -> Result<String> {
        let id = uuid::Uuid::now_v7().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO chat_event (id, session_id, created_at, event, execution_time, event_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, session_id, created_at, event, execution_time, event_type.as_i64()],
        )?;
        Ok(id)
    }

    /// Top-5 past and top-5 future events, each ordered by `execution_time`
    /// descending (most recently relevant first).
    pub fn get_session_events(&self, session_id: &str) -> Result<SessionEvents> {
        Ok(SessionEvents {
            past: self.events_by_type(session_id, EventType::Past)?,
            future: self.events_by_type(session_id, EventType::Future)?,
        })
    }

    fn events_by_type(&self, session_id: &str, event_type: EventType) -> Result<Vec<EventRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, created_at, event, execution_time, event_type
             FROM chat_event
             WHERE session_id = ?1 AND event_type = ?2
             ORDER BY execution_time DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![session_id, event_type.as_i64(), BUCKET_LIMIT],
            row_to_event,
        )?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn delete_events(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM chat_event WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(n)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRecord> {
    let event_type: i64 = row.get(5)?;
    Ok(EventRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        created_at: row.get(2)?,
        event: row.get(3)?,
        execution_time: row.get(4)?,
        event_type: EventType::from_i64(event_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn events_bucketed_by_past_and_future() {
        let s = store();
        s.insert_event(
            "sess",
            "dentist appointment",
            "2025-01-01T00:00:00Z",
            "2026-01-01T00:00:00Z",
            EventType::Past,
        )
        .unwrap();
        s.insert_event(
            "sess",
            "birthday trip",
            "2027-01-01T00:00:00Z",
            "2026-01-01T00:00:00Z",
            EventType::Future,
        )
        .unwrap();

        let events = s.get_session_events("sess").unwrap();
        assert_eq!(events.past.len(), 1);
        assert_eq!(events.future.len(), 1);
        assert_eq!(events.past[0].event, "dentist appointment");
    }

    #[test]
    fn bucket_caps_at_five_newest() {
        let s = store();
        for i in 0..8 {
            s.insert_event(
                "sess",
                &format!("event {i}"),
                &format!("2020-01-{:02}T00:00:00Z", i + 1),
                "2026-01-01T00:00:00Z",
                EventType::Past,
            )
            .unwrap();
        }
        let events = s.get_session_events("sess").unwrap();
        assert_eq!(events.past.len(), 5);
        assert_eq!(events.past[0].event, "event 7");
    }
}
