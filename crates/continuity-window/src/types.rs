use serde::{Deserialize, Serialize};

/// One line of the flat, role-tagged sequence an `Upload` call takes as
/// input. Only `"user"` and `"assistant"` are paired; any other role is
/// skipped rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub role: String,
    pub content: String,
}

impl InboundMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Rewrite a flat role-tagged sequence into paired `(user, assistant)`
/// turns: every `user` line is buffered, the next `assistant` line flushes
/// the pair, a trailing buffered `user` flushes with an empty assistant
/// side, and unrecognised roles are dropped.
pub fn pair_flush(messages: &[InboundMessage]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut pending_user: Option<String> = None;

    for msg in messages {
        match msg.role.as_str() {
            "user" => {
                if let Some(prev) = pending_user.take() {
                    pairs.push((prev, String::new()));
                }
                pending_user = Some(msg.content.clone());
            }
            "assistant" => {
                let user_content = pending_user.take().unwrap_or_default();
                pairs.push((user_content, msg.content.clone()));
            }
            _ => continue,
        }
    }

    if let Some(prev) = pending_user.take() {
        pairs.push((prev, String::new()));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_pair_flushes_on_assistant() {
        let msgs = vec![InboundMessage::user("hi"), InboundMessage::assistant("hello")];
        assert_eq!(pair_flush(&msgs), vec![("hi".to_string(), "hello".to_string())]);
    }

    #[test]
    fn trailing_user_flushes_with_empty_assistant() {
        let msgs = vec![
            InboundMessage::user("hi"),
            InboundMessage::assistant("hello"),
            InboundMessage::user("bye"),
        ];
        assert_eq!(
            pair_flush(&msgs),
            vec![
                ("hi".to_string(), "hello".to_string()),
                ("bye".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn consecutive_users_flush_the_first_with_empty_assistant() {
        let msgs = vec![InboundMessage::user("one"), InboundMessage::user("two")];
        assert_eq!(
            pair_flush(&msgs),
            vec![("one".to_string(), String::new())]
        );
        // "two" is still pending and never flushed without a following assistant
        // or a later call — callers that need it must append an assistant line.
    }

    #[test]
    fn unknown_roles_are_skipped() {
        let msgs = vec![
            InboundMessage {
                role: "system".to_string(),
                content: "ignored".to_string(),
            },
            InboundMessage::user("hi"),
            InboundMessage::assistant("hello"),
        ];
        assert_eq!(pair_flush(&msgs), vec![("hi".to_string(), "hello".to_string())]);
    }
}
