use continuity_core::Node;
use continuity_store::PORTRAIT_CATEGORIES;

/// Render the LLM prompt for one profile-merge job: the allow-listed
/// category/field shape, the current portrait, the new user-only text, and
/// the required output format. The model is told to emit only the
/// categories/fields it can support from the new text — the merge step
/// handles leaving everything else untouched.
pub fn build_prompt(portrait: &Node, user_texts: &[String], now_rfc3339: &str) -> String {
    let categories = PORTRAIT_CATEGORIES.join(", ");
    let portrait_json = serde_json::to_string_pretty(portrait).unwrap_or_else(|_| "{}".to_string());
    let conversation = user_texts.join("\n");

    format!(
        "You maintain a long-term user profile for a role-play chat session.\n\
         Allowed categories: {categories}.\n\
         Current profile (JSON):\n{portrait_json}\n\n\
         New user messages since the last update:\n{conversation}\n\n\
         Current time: {now_rfc3339}\n\n\
         Extract any new or updated facts about the user from the new messages only.\n\
         Respond with a single JSON object mapping category -> {{field: short descriptive sentence}}.\n\
         Only include categories and fields you have evidence for. Do not invent values.\n\
         Example: {{\"basic_information\": {{\"age\": \"appears to be in their late twenties\"}}}}\n\
         Respond in the same language as the user's messages."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn prompt_includes_categories_and_conversation() {
        let portrait = Node::Object(BTreeMap::new());
        let prompt = build_prompt(&portrait, &["I love hiking".to_string()], "2026-01-01T00:00:00Z");
        assert!(prompt.contains("basic_information"));
        assert!(prompt.contains("I love hiking"));
        assert!(prompt.contains("2026-01-01T00:00:00Z"));
    }
}
