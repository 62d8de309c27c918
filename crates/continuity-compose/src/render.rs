use chrono::{DateTime, Utc};
use continuity_core::Node;
use continuity_store::SessionEvents;
use continuity_topics::TopicSearchResult;

const NO_ACTIVE_TOPICS_SENTINEL: &str =
    "No topics have been established for this session yet.";

/// `header "active topics: [...]"` followed by one numbered line per record:
/// `N. <content> （<topic>）`. Falls back to a fixed sentinel sentence when
/// there are no active topics at all.
pub fn render_topic_block(result: &TopicSearchResult) -> String {
    if result.active_topics.is_empty() {
        return NO_ACTIVE_TOPICS_SENTINEL.to_string();
    }

    let header = format!("active topics: [{}]", result.active_topics.join(", "));
    let lines: Vec<String> = result
        .records
        .iter()
        .enumerate()
        .map(|(i, rec)| format!("{}. {} （{}）", i + 1, rec.content, rec.topic))
        .collect();

    if lines.is_empty() {
        header
    } else {
        format!("{header}\n{}", lines.join("\n"))
    }
}

/// Recursive indented bullet rendering of the portrait mapping.
pub fn render_portrait_block(portrait: &Node) -> String {
    if portrait.is_empty_collection() {
        return "No profile information has been recorded yet.".to_string();
    }
    portrait.render_indented("")
}

/// Two optional bullet lines — `- todo: [...]` (future events) and
/// `- completed: [...]` (past events) — each omitted when empty.
pub fn render_events_block(events: &SessionEvents) -> String {
    let mut lines = Vec::new();
    if !events.future.is_empty() {
        let todo: Vec<&str> = events.future.iter().map(|e| e.event.as_str()).collect();
        lines.push(format!("- todo: [{}]", todo.join(", ")));
    }
    if !events.past.is_empty() {
        let completed: Vec<&str> = events.past.iter().map(|e| e.event.as_str()).collect();
        lines.push(format!("- completed: [{}]", completed.join(", ")));
    }
    if lines.is_empty() {
        "No key events recorded for this session yet.".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn render_current_time(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use continuity_store::{EventRecord, EventType, TopicRecord};

    #[test]
    fn topic_block_falls_back_to_sentinel_when_no_active_topics() {
        let result = TopicSearchResult::default();
        assert_eq!(render_topic_block(&result), NO_ACTIVE_TOPICS_SENTINEL);
    }

    #[test]
    fn topic_block_numbers_records_with_topic_suffix() {
        let result = TopicSearchResult {
            active_topics: vec!["cafe".to_string()],
            records: vec![TopicRecord {
                id: "1".into(),
                session_id: "s".into(),
                topic: "cafe".into(),
                content: "visited a cafe".into(),
                keywords: vec![],
                created_at: "now".into(),
                updated_at: "now".into(),
                score: None,
            }],
        };
        let rendered = render_topic_block(&result);
        assert!(rendered.starts_with("active topics: [cafe]"));
        assert!(rendered.contains("1. visited a cafe （cafe）"));
    }

    #[test]
    fn events_block_omits_empty_buckets() {
        let events = SessionEvents {
            past: vec![],
            future: vec![EventRecord {
                id: "1".into(),
                session_id: "s".into(),
                created_at: "now".into(),
                event: "dinner plans".into(),
                execution_time: "now".into(),
                event_type: EventType::Future,
            }],
        };
        let rendered = render_events_block(&events);
        assert!(rendered.contains("- todo: [dinner plans]"));
        assert!(!rendered.contains("completed"));
    }
}
