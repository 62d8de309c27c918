use rusqlite::params;
use tracing::instrument;

use crate::{error::Result, manager::Store, types::MessageRecord};

impl Store {
    /// Insert one paired record. Returns the generated id.
    #[instrument(skip(self, user_content, assistant_content), fields(session_id, messages_id))]
    pub fn insert_message(
        &self,
        session_id: &str,
        user_content: &str,
        assistant_content: &str,
        created_at: &str,
        messages_id: &str,
    ) -> Result<String> {
        let id = uuid::Uuid::now_v7().to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session_messages
             (id, session_id, user_content, assistant_content, created_at, messages_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, session_id, user_content, assistant_content, created_at, messages_id],
        )?;
        Ok(id)
    }

    /// Count of records for `session_id`.
    pub fn count_messages(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM session_messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// All records for `session_id`, ordered ascending by `created_at`.
    pub fn list_messages(&self, session_id: &str) -> Result<Vec<MessageRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, user_content, assistant_content, created_at,
                    messages_id, task1_id, task2_id, task3_id, task4_id, status
             FROM session_messages WHERE session_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![session_id], row_to_message)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Claim every currently-unclaimed record for `(session_id, task_index)`
    /// by setting its `taskN_id` to `task_id`. Returns the claimed records
    /// (post-claim view). Idempotent: a record already claimed by an earlier
    /// call is invisible to this one.
    #[instrument(skip(self), fields(session_id, task_index, task_id))]
    pub fn mark_task(
        &self,
        session_id: &str,
        task_index: u8,
        task_id: &str,
    ) -> Result<Vec<MessageRecord>> {
        let column = task_column(task_index);
        let conn = self.conn.lock().unwrap();

        let mut select_stmt = conn.prepare(&format!(
            "SELECT id FROM session_messages
             WHERE session_id = ?1 AND {column} = ''"
        ))?;
        let ids: Vec<String> = select_stmt
            .query_map(params![session_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        drop(select_stmt);

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        for id in &ids {
            conn.execute(
                &format!("UPDATE session_messages SET {column} = ?1 WHERE id = ?2 AND {column} = ''"),
                params![task_id, id],
            )?;
        }

        let mut fetch_stmt = conn.prepare(&format!(
            "SELECT id, session_id, user_content, assistant_content, created_at,
                    messages_id, task1_id, task2_id, task3_id, task4_id, status
             FROM session_messages WHERE {column} = ?1 AND session_id = ?2
             ORDER BY created_at ASC"
        ))?;
        let rows = fetch_stmt.query_map(params![task_id, session_id], row_to_message)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Hard-delete the given record ids.
    pub fn delete_message_ids(&self, ids: &[String]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("DELETE FROM session_messages WHERE id IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> =
            ids.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
        let n = stmt.execute(params.as_slice())?;
        Ok(n)
    }

    /// Hard-delete all records for `session_id`.
    pub fn delete_messages(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM session_messages WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(n)
    }
}

fn task_column(task_index: u8) -> &'static str {
    match task_index {
        1 => "task1_id",
        2 => "task2_id",
        3 => "task3_id",
        _ => "task4_id",
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_content: row.get(2)?,
        assistant_content: row.get(3)?,
        created_at: row.get(4)?,
        messages_id: row.get(5)?,
        task1_id: row.get(6)?,
        task2_id: row.get(7)?,
        task3_id: row.get(8)?,
        task4_id: row.get(9)?,
        status: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn mark_task_claims_only_unclaimed_records() {
        let s = store();
        s.insert_message("sess", "hi", "hello", "2026-01-01T00:00:00Z", "turn-1")
            .unwrap();
        let claimed = s.mark_task("sess", 1, "task-a").unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].task1_id, "task-a");

        // Second claim attempt sees nothing, because the record is already claimed.
        let claimed_again = s.mark_task("sess", 1, "task-b").unwrap();
        assert!(claimed_again.is_empty());
    }

    #[test]
    fn fully_claimed_reflects_all_three_tasks() {
        let s = store();
        s.insert_message("sess", "hi", "hello", "2026-01-01T00:00:00Z", "turn-1")
            .unwrap();
        s.mark_task("sess", 1, "t1").unwrap();
        s.mark_task("sess", 2, "t2").unwrap();
        let claimed = s.mark_task("sess", 3, "t3").unwrap();
        assert!(claimed[0].fully_claimed());
    }
}
