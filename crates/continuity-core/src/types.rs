use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable opaque identity a session's memory artifacts partition on.
///
/// Either supplied directly by the caller or synthesized from a
/// `group_id`/`user_id`/`role_id` triplet via [`generate_session_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier for one job passing through a derivation queue.
///
/// UUIDv7 — time-sortable, so task ids read chronologically in logs
/// without an extra timestamp field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Derive a `session_id` from the non-empty parts of a group/user/role
/// triplet, joined by `_`. Returns `None` if all three are empty — callers
/// should treat that as a validation error rather than synthesize an
/// empty id.
pub fn generate_session_id(group_id: &str, user_id: &str, role_id: &str) -> Option<String> {
    let parts: Vec<&str> = [group_id, user_id, role_id]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_session_id_joins_nonempty_parts() {
        assert_eq!(
            generate_session_id("g1", "u1", "r1"),
            Some("g1_u1_r1".to_string())
        );
        assert_eq!(generate_session_id("", "u1", "r1"), Some("u1_r1".to_string()));
        assert_eq!(generate_session_id("", "", "r1"), Some("r1".to_string()));
    }

    #[test]
    fn generate_session_id_rejects_all_empty() {
        assert_eq!(generate_session_id("", "", ""), None);
    }

    #[test]
    fn task_id_roundtrips_through_display() {
        let id = TaskId::new();
        let shown = id.to_string();
        assert_eq!(shown, id.as_str());
    }
}
