use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};
use tracing::{debug, instrument};

use crate::{db::init_db, error::Result, types::QueueMessage};

/// A named FIFO job queue backed by a shared SQLite connection.
///
/// Each worker service owns one `Queue` (by name) in the shared store. All
/// operations are synchronous and bounded by SQLite's own locking — callers
/// on the async side wrap these in `spawn_blocking` if contention ever
/// becomes a concern on a single embedded connection.
#[derive(Clone)]
pub struct Queue {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl Queue {
    pub fn new(conn: Arc<Mutex<Connection>>, name: impl Into<String>) -> Result<Self> {
        {
            let guard = conn.lock().unwrap();
            init_db(&guard)?;
        }
        Ok(Self {
            conn,
            name: name.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push `msg` onto the tail of the queue.
    #[instrument(skip(self, msg), fields(queue = %self.name, session_id = %msg.session_id, task_id = %msg.task_id))]
    pub fn enqueue(&self, msg: &QueueMessage) -> Result<()> {
        let payload = serde_json::to_string(&msg.payload)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO job_queue (queue_name, task_id, session_id, timestamp, retry, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.name,
                msg.task_id,
                msg.session_id,
                msg.timestamp,
                msg.retry,
                payload
            ],
        )?;
        debug!("enqueued");
        Ok(())
    }

    /// Pop the head of the queue. Returns `None` — the empty sentinel — if
    /// the queue has no pending jobs.
    #[instrument(skip(self), fields(queue = %self.name))]
    pub fn dequeue(&self) -> Result<Option<QueueMessage>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(i64, String, String, i64, u32, String)> = conn
            .query_row(
                "SELECT id, task_id, session_id, timestamp, retry, payload
                 FROM job_queue WHERE queue_name = ?1 ORDER BY id LIMIT 1",
                params![self.name],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .ok();

        let Some((id, task_id, session_id, timestamp, retry, payload_str)) = row else {
            return Ok(None);
        };

        conn.execute("DELETE FROM job_queue WHERE id = ?1", params![id])?;

        let payload: serde_json::Value = serde_json::from_str(&payload_str)?;
        Ok(Some(QueueMessage {
            task_id,
            session_id,
            timestamp,
            retry,
            payload,
        }))
    }

    /// Number of pending jobs in this queue.
    pub fn length(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM job_queue WHERE queue_name = ?1",
            params![self.name],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Remove every pending job for `session_id` from this queue. Used by
    /// session deletion so derivation jobs don't fire for a session that no
    /// longer exists.
    #[instrument(skip(self), fields(queue = %self.name, session_id))]
    pub fn delete_by_session(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM job_queue WHERE queue_name = ?1 AND session_id = ?2",
            params![self.name, session_id],
        )?;
        Ok(n)
    }

    /// Re-enqueue `msg` with its retry counter incremented. The caller is
    /// responsible for checking the retry ceiling first and routing to the
    /// dead-letter alert instead once it is reached.
    pub fn requeue_with_retry(&self, msg: QueueMessage) -> Result<()> {
        self.enqueue(&msg.with_incremented_retry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_queue(name: &str) -> Queue {
        let conn = Connection::open_in_memory().unwrap();
        Queue::new(Arc::new(Mutex::new(conn)), name).unwrap()
    }

    #[test]
    fn dequeue_empty_queue_yields_none() {
        let q = test_queue("profile");
        assert!(q.dequeue().unwrap().is_none());
    }

    #[test]
    fn fifo_ordering_is_preserved() {
        let q = test_queue("profile");
        q.enqueue(&QueueMessage::new("s1", serde_json::json!({"n": 1})))
            .unwrap();
        q.enqueue(&QueueMessage::new("s1", serde_json::json!({"n": 2})))
            .unwrap();
        let first = q.dequeue().unwrap().unwrap();
        let second = q.dequeue().unwrap().unwrap();
        assert_eq!(first.payload["n"], 1);
        assert_eq!(second.payload["n"], 2);
        assert!(q.dequeue().unwrap().is_none());
    }

    #[test]
    fn length_tracks_pending_jobs() {
        let q = test_queue("topic");
        assert_eq!(q.length().unwrap(), 0);
        q.enqueue(&QueueMessage::new("s1", serde_json::json!({})))
            .unwrap();
        assert_eq!(q.length().unwrap(), 1);
        q.dequeue().unwrap();
        assert_eq!(q.length().unwrap(), 0);
    }

    #[test]
    fn delete_by_session_only_removes_matching_rows() {
        let q = test_queue("event");
        q.enqueue(&QueueMessage::new("s1", serde_json::json!({})))
            .unwrap();
        q.enqueue(&QueueMessage::new("s2", serde_json::json!({})))
            .unwrap();
        let removed = q.delete_by_session("s1").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(q.length().unwrap(), 1);
        let remaining = q.dequeue().unwrap().unwrap();
        assert_eq!(remaining.session_id, "s2");
    }

    #[test]
    fn requeue_with_retry_increments_counter() {
        let q = test_queue("profile");
        let msg = QueueMessage::new("s1", serde_json::json!({}));
        q.requeue_with_retry(msg).unwrap();
        let popped = q.dequeue().unwrap().unwrap();
        assert_eq!(popped.retry, 1);
    }

    #[test]
    fn distinct_queue_names_do_not_interfere() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let profile = Queue::new(conn.clone(), "profile").unwrap();
        let topic = Queue::new(conn, "topic").unwrap();
        profile
            .enqueue(&QueueMessage::new("s1", serde_json::json!({})))
            .unwrap();
        assert_eq!(profile.length().unwrap(), 1);
        assert_eq!(topic.length().unwrap(), 0);
        assert!(topic.dequeue().unwrap().is_none());
    }
}
