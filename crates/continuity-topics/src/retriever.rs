use std::collections::HashMap;

use continuity_core::keywords::extract_keywords;
use continuity_store::{Store, TopicRecord};
use tracing::instrument;

use crate::{error::Result, types::TopicSearchResult};

/// Two-phase topic retrieval (component D, read side).
#[derive(Clone)]
pub struct TopicRetriever {
    store: Store,
    score_threshold: f64,
}

impl TopicRetriever {
    pub fn new(store: Store, score_threshold: f64) -> Self {
        Self {
            store,
            score_threshold,
        }
    }

    /// Phase A: whole-topic fetch over the active-topic shortlist.
    /// Phase B: lexical FTS5 search scoped to the session, filtered to
    /// `score >= score_threshold`. Results are deduped by record id and
    /// sorted ascending by `updated_at`.
    #[instrument(skip(self, query), fields(session_id))]
    pub fn search(&self, session_id: &str, query: &str) -> Result<TopicSearchResult> {
        let info = self.store.get_topic_info(session_id)?;
        let active_topics: Vec<String> = info.active_topics.iter().map(|e| e.topic.clone()).collect();

        let mut by_id: HashMap<String, TopicRecord> = HashMap::new();
        for rec in self.store.fetch_records_by_topics(session_id, &active_topics)? {
            by_id.insert(rec.id.clone(), rec);
        }

        if !query.trim().is_empty() {
            let keywords = extract_keywords(query);
            let match_expr = keywords.join(" ");
            for rec in self.store.fts_search_topics(session_id, &match_expr)? {
                if rec.score.unwrap_or(0.0) >= self.score_threshold {
                    by_id.entry(rec.id.clone()).or_insert(rec);
                }
            }
        }

        let mut records: Vec<TopicRecord> = by_id.into_values().collect();
        records.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));

        Ok(TopicSearchResult {
            active_topics,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retriever(threshold: f64) -> TopicRetriever {
        let store = Store::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        TopicRetriever::new(store, threshold)
    }

    #[test]
    fn returns_active_topic_records_with_empty_query() {
        let r = retriever(3.0);
        r.store
            .insert_topic_record("sess", "cafe", "visited the cafe", &["cafe".into()], "2026-01-01T00:00:00Z")
            .unwrap();
        r.store
            .upsert_topic_info(
                "sess",
                1,
                &[continuity_store::ActiveTopicEntry {
                    topic: "cafe".into(),
                    last_active: "2026-01-01T00:00:00Z".into(),
                }],
                "2026-01-01T00:00:00Z",
            )
            .unwrap();

        let result = r.search("sess", "").unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.active_topics, vec!["cafe".to_string()]);
    }

    #[test]
    fn lexical_phase_merges_without_duplicating_active_hits() {
        let r = retriever(0.0);
        r.store
            .insert_topic_record(
                "sess",
                "hiking",
                "went hiking in the mountains",
                &["hiking".into(), "mountains".into()],
                "2026-01-01T00:00:00Z",
            )
            .unwrap();

        let result = r.search("sess", "mountains").unwrap();
        assert_eq!(result.records.len(), 1);
    }
}
