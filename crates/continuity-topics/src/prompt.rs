use crate::types::TopicTurn;

/// Render the LLM prompt for one topic-extraction job: the conversation
/// window, rendered short/compound-word topic constraints, and the
/// required single-sentence summary shape.
pub fn build_prompt(turns: &[TopicTurn]) -> String {
    let conversation = turns
        .iter()
        .map(|t| {
            if t.assistant_content.is_empty() {
                format!("user: {}", t.user_content)
            } else {
                format!("user: {}\nassistant: {}", t.user_content, t.assistant_content)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Extract the distinct topics discussed in this conversation window.\n\
         Conversation:\n{conversation}\n\n\
         Respond with a single JSON object mapping topic -> one-sentence summary.\n\
         Each topic must be a short single or compound word (e.g. \"travel\", \"cooking\").\n\
         Each summary must be a short, evidentiary sentence; capture named entities in\n\
         parentheses where relevant, e.g. \"planned a trip (to Kyoto) for next spring\".\n\
         Omit topics you have no clear evidence for."
    )
}
