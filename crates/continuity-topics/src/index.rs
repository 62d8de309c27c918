use continuity_core::config::activate_cap;
use continuity_store::ActiveTopicEntry;

/// Fold freshly extracted topics into the active-topic shortlist: bump
/// `last_active` for topics already present, append new ones, sort
/// newest-first, then truncate to `activate_cap(topic_count)` keeping the
/// head of the descending-sorted list (the most recently active entries).
pub fn update_active_topics(
    mut current: Vec<ActiveTopicEntry>,
    extracted_topics: &[String],
    now: &str,
    topic_count: usize,
) -> Vec<ActiveTopicEntry> {
    for topic in extracted_topics {
        if let Some(entry) = current.iter_mut().find(|e| &e.topic == topic) {
            entry.last_active = now.to_string();
        } else {
            current.push(ActiveTopicEntry {
                topic: topic.clone(),
                last_active: now.to_string(),
            });
        }
    }

    current.sort_by(|a, b| b.last_active.cmp(&a.last_active));
    let cap = activate_cap(topic_count);
    current.truncate(cap);
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(topic: &str, last_active: &str) -> ActiveTopicEntry {
        ActiveTopicEntry {
            topic: topic.to_string(),
            last_active: last_active.to_string(),
        }
    }

    #[test]
    fn bumps_existing_topic_rather_than_duplicating() {
        let current = vec![entry("cafe", "2026-01-01T00:00:00Z")];
        let updated = update_active_topics(current, &["cafe".to_string()], "2026-01-05T00:00:00Z", 1);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].last_active, "2026-01-05T00:00:00Z");
    }

    #[test]
    fn appends_new_topics_and_sorts_newest_first() {
        let current = vec![entry("old", "2026-01-01T00:00:00Z")];
        let updated = update_active_topics(current, &["new".to_string()], "2026-01-05T00:00:00Z", 2);
        assert_eq!(updated[0].topic, "new");
        assert_eq!(updated[1].topic, "old");
    }

    #[test]
    fn truncates_to_activate_cap_keeping_newest() {
        // topic_count = 30 -> cap = 20 (matches spec scenario 5).
        let mut current = Vec::new();
        for i in 0..20 {
            current.push(entry(&format!("t{i}"), &format!("2026-01-{:02}T00:00:00Z", i + 1)));
        }
        let updated = update_active_topics(current, &["t21".to_string()], "2026-02-01T00:00:00Z", 30);
        assert_eq!(updated.len(), 20);
        assert_eq!(updated[0].topic, "t21");
        // the oldest entry (t0) is evicted by the truncation.
        assert!(!updated.iter().any(|e| e.topic == "t0"));
    }
}
