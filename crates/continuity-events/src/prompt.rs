use crate::types::EventTurn;

/// Render the LLM prompt for one key-event extraction job, scoped to the
/// event taxonomy: appointments, gifts/rewards/punishments in either
/// direction, joint activities, and third-party involvement.
pub fn build_prompt(turns: &[EventTurn]) -> String {
    let conversation = turns
        .iter()
        .map(|t| {
            if t.assistant_content.is_empty() {
                format!("[{}] user: {}", t.timestamp, t.user_content)
            } else {
                format!(
                    "[{}] user: {}\nassistant: {}",
                    t.timestamp, t.user_content, t.assistant_content
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Extract key events from this conversation, limited to: scheduled appointments,\n\
         gifts/rewards/punishments given or received, joint activities, and events\n\
         involving a third party.\n\
         Conversation:\n{conversation}\n\n\
         Respond with a single JSON object mapping an ISO-like datetime string (or a\n\
         relative word like \"tomorrow\"/\"yesterday\", or a bare date/time) to a short\n\
         event description. Omit anything outside the taxonomy above."
    )
}
