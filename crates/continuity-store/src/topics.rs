use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use crate::{
    error::Result,
    manager::Store,
    types::{ActiveTopicEntry, TopicIndexDoc, TopicRecord},
};

impl Store {
    /// Append a new topic-summary entry. Topic insertion is append-only —
    /// the same topic name can accumulate many records over a session.
    #[instrument(skip(self, content, keywords), fields(session_id, topic))]
    pub fn insert_topic_record(
        &self,
        session_id: &str,
        topic: &str,
        content: &str,
        keywords: &[String],
        now: &str,
    ) -> Result<String> {
        let id = uuid::Uuid::now_v7().to_string();
        let keywords_json = serde_json::to_string(keywords)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO topic_summary (id, session_id, topic, content, keywords, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![id, session_id, topic, content, keywords_json, now],
        )?;
        Ok(id)
    }

    /// Number of distinct topic names recorded for `session_id`.
    pub fn distinct_topic_count(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT topic) FROM topic_summary WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// The `excess` topic names whose *earliest* record is oldest, ascending
    /// — the eviction candidates when `topic_count` exceeds the cap.
    pub fn oldest_topics_by_earliest_record(
        &self,
        session_id: &str,
        excess: usize,
    ) -> Result<Vec<String>> {
        if excess == 0 {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT topic FROM topic_summary WHERE session_id = ?1
             GROUP BY topic ORDER BY MIN(created_at) ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![session_id, excess as i64], |row| row.get(0))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Delete every record belonging to the named topics (whole-topic
    /// eviction, matching the source system's `deleteOldestTopics`).
    pub fn delete_topics_by_name(&self, session_id: &str, topics: &[String]) -> Result<usize> {
        if topics.is_empty() {
            return Ok(0);
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = topics.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "DELETE FROM topic_summary WHERE session_id = ? AND topic IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut all_params: Vec<&dyn rusqlite::ToSql> = vec![&session_id];
        all_params.extend(topics.iter().map(|t| t as &dyn rusqlite::ToSql));
        let n = stmt.execute(all_params.as_slice())?;
        Ok(n)
    }

    /// Fetch every record whose topic is in `topics` (phase A of `Search`:
    /// a whole-topic fetch, unranked).
    pub fn fetch_records_by_topics(
        &self,
        session_id: &str,
        topics: &[String],
    ) -> Result<Vec<TopicRecord>> {
        if topics.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = topics.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT id, session_id, topic, content, keywords, created_at, updated_at
             FROM topic_summary WHERE session_id = ? AND topic IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut all_params: Vec<&dyn rusqlite::ToSql> = vec![&session_id];
        all_params.extend(topics.iter().map(|t| t as &dyn rusqlite::ToSql));
        let rows = stmt.query_map(all_params.as_slice(), row_to_topic)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Lexical FTS5 search scoped to `session_id` (phase B of `Search`).
    /// `match_expr` is the space-joined keyword query; results carry a
    /// populated `score` (higher = more relevant) and are NOT pre-filtered
    /// by threshold — callers apply the configurable cutoff themselves.
    pub fn fts_search_topics(&self, session_id: &str, match_expr: &str) -> Result<Vec<TopicRecord>> {
        if match_expr.trim().is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.session_id, t.topic, t.content, t.keywords, t.created_at, t.updated_at,
                    bm25(topic_summary_fts, 10.0, 8.0, 5.0) * -1.0 AS score
             FROM topic_summary_fts
             JOIN topic_summary t ON t.row_id = topic_summary_fts.rowid
             WHERE topic_summary_fts MATCH ?1 AND t.session_id = ?2
             ORDER BY score DESC",
        )?;
        let rows = stmt.query_map(params![match_expr, session_id], |row| {
            let mut rec = row_to_topic(row)?;
            rec.score = Some(row.get(7)?);
            Ok(rec)
        })?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn delete_topics(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "DELETE FROM topic_summary WHERE session_id = ?1",
            params![session_id],
        )?;
        conn.execute(
            "DELETE FROM topic_info WHERE session_id = ?1",
            params![session_id],
        )?;
        Ok(n)
    }

    // -- topic index (active-topic shortlist) --------------------------------

    pub fn get_topic_info(&self, session_id: &str) -> Result<TopicIndexDoc> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT topic_count, active_topics, updated_at FROM topic_info WHERE session_id = ?1",
                params![session_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((topic_count, active_json, updated_at)) => {
                let active_topics: Vec<ActiveTopicEntry> =
                    serde_json::from_str(&active_json).unwrap_or_default();
                Ok(TopicIndexDoc {
                    session_id: session_id.to_string(),
                    topic_count: topic_count as usize,
                    active_topics,
                    updated_at,
                })
            }
            None => Ok(TopicIndexDoc {
                session_id: session_id.to_string(),
                topic_count: 0,
                active_topics: Vec::new(),
                updated_at: String::new(),
            }),
        }
    }

    pub fn upsert_topic_info(
        &self,
        session_id: &str,
        topic_count: usize,
        active_topics: &[ActiveTopicEntry],
        now: &str,
    ) -> Result<()> {
        let active_json = serde_json::to_string(active_topics)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO topic_info (session_id, topic_count, active_topics, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id) DO UPDATE SET
                topic_count = excluded.topic_count,
                active_topics = excluded.active_topics,
                updated_at = excluded.updated_at",
            params![session_id, topic_count as i64, active_json, now],
        )?;
        Ok(())
    }
}

fn row_to_topic(row: &rusqlite::Row<'_>) -> rusqlite::Result<TopicRecord> {
    let keywords_json: String = row.get(4)?;
    let keywords: Vec<String> = serde_json::from_str(&keywords_json).unwrap_or_default();
    Ok(TopicRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        topic: row.get(2)?,
        content: row.get(3)?,
        keywords,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        score: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn append_only_insert_accumulates_per_topic() {
        let s = store();
        s.insert_topic_record("sess", "cafe", "went to a cafe", &["cafe".into()], "2026-01-01T00:00:00Z")
            .unwrap();
        s.insert_topic_record("sess", "cafe", "ordered a latte", &["latte".into()], "2026-01-02T00:00:00Z")
            .unwrap();
        assert_eq!(s.distinct_topic_count("sess").unwrap(), 1);
        let recs = s.fetch_records_by_topics("sess", &["cafe".to_string()]).unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn oldest_topics_ranked_by_earliest_record() {
        let s = store();
        s.insert_topic_record("sess", "old", "x", &[], "2026-01-01T00:00:00Z").unwrap();
        s.insert_topic_record("sess", "new", "y", &[], "2026-01-05T00:00:00Z").unwrap();
        let oldest = s.oldest_topics_by_earliest_record("sess", 1).unwrap();
        assert_eq!(oldest, vec!["old".to_string()]);
    }

    #[test]
    fn fts_search_finds_matching_keyword() {
        let s = store();
        s.insert_topic_record(
            "sess",
            "cafe",
            "visited the cafe downtown",
            &["cafe".into(), "downtown".into()],
            "2026-01-01T00:00:00Z",
        )
        .unwrap();
        let hits = s.fts_search_topics("sess", "downtown").unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score.is_some());
    }

    #[test]
    fn topic_info_roundtrips() {
        let s = store();
        let entries = vec![ActiveTopicEntry {
            topic: "cafe".into(),
            last_active: "2026-01-01T00:00:00Z".into(),
        }];
        s.upsert_topic_info("sess", 1, &entries, "2026-01-01T00:00:00Z").unwrap();
        let info = s.get_topic_info("sess").unwrap();
        assert_eq!(info.topic_count, 1);
        assert_eq!(info.active_topics, entries);
    }
}
